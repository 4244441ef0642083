use axum::{
    Form, Router,
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::cookie::SignedCookieJar;
use serde::Deserialize;
use tracing::{info, warn};

use crate::application::auth::verify_password;
use crate::infra::telemetry::METRIC_LOGIN_FAILURES;
use crate::presentation::views::{LoginTemplate, render_template_response};

use super::extract::{CurrentBlog, has_session, removal_cookie, session_cookie};
use super::state::HttpState;

const WRONG_PASSWORD: &str = "Wrong password.";

pub(super) fn routes() -> Router<HttpState> {
    Router::new().route("/login", get(login_form).post(login_submit))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoginQuery {
    next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoginForm {
    password: String,
    next: String,
}

/// Signed in: sign out and go home. Otherwise show the password prompt.
async fn login_form(
    CurrentBlog(blog): CurrentBlog,
    jar: SignedCookieJar,
    Query(query): Query<LoginQuery>,
) -> Response {
    if has_session(&jar) {
        info!(target = "pblog::http::auth", "admin signed out");
        return (jar.remove(removal_cookie()), Redirect::to("/")).into_response();
    }

    render_template_response(
        LoginTemplate {
            blog_title: blog.config.title,
            next: sanitize_next(query.next.as_deref()).to_string(),
            error: None,
        },
        StatusCode::OK,
    )
}

async fn login_submit(
    CurrentBlog(blog): CurrentBlog,
    jar: SignedCookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let next = sanitize_next(Some(&form.next)).to_string();

    if verify_password(&form.password, &blog.config.password_hash) {
        info!(target = "pblog::http::auth", blog_id = blog.id, "admin signed in");
        return (jar.add(session_cookie()), Redirect::to(&next)).into_response();
    }

    metrics::counter!(METRIC_LOGIN_FAILURES).increment(1);
    warn!(target = "pblog::http::auth", blog_id = blog.id, "rejected admin password");
    render_template_response(
        LoginTemplate {
            blog_title: blog.config.title,
            next,
            error: Some(WRONG_PASSWORD.to_string()),
        },
        StatusCode::OK,
    )
}

/// Only local absolute paths are honoured as a post-login target.
pub(crate) fn sanitize_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => "/",
    }
}

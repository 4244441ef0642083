//! Per-request extractors: the served blog and the admin session.

use std::{convert::Infallible, net::SocketAddr};

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};

use crate::application::error::AppError;
use crate::domain::entities::BlogRecord;
use crate::infra::error::InfraError;

use super::state::HttpState;

pub const SESSION_COOKIE: &str = "pblog_session";
pub const SESSION_IDENTITY: &str = "admin";

/// The configured blog, reloaded from the store on every request.
pub struct CurrentBlog(pub BlogRecord);

impl FromRequestParts<HttpState> for CurrentBlog {
    type Rejection = AppError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &HttpState,
    ) -> Result<Self, Self::Rejection> {
        match state.blogs.find_blog_by_name(&state.blog_name).await? {
            Some(blog) => Ok(Self(blog)),
            None => Err(InfraError::missing_blog(state.blog_name.as_ref()).into()),
        }
    }
}

/// Proof that the request carries a valid signed session cookie.
pub struct AdminSession;

impl FromRequestParts<HttpState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &HttpState,
    ) -> Result<Self, Self::Rejection> {
        let jar = SignedCookieJar::from_headers(&parts.headers, state.cookie_key.clone());
        if has_session(&jar) {
            return Ok(Self);
        }

        let next = parts
            .uri
            .path_and_query()
            .map(|value| value.as_str().to_string())
            .unwrap_or_else(|| "/admin/".to_string());
        Err(AppError::Unauthenticated { next })
    }
}

/// Client address: the socket peer, or the first `X-Forwarded-For` entry
/// when `server.trust_forwarded` is set.
pub struct ClientIp(pub Option<String>);

impl FromRequestParts<HttpState> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &HttpState,
    ) -> Result<Self, Self::Rejection> {
        let forwarded = state
            .trust_forwarded
            .then(|| forwarded_for(parts))
            .flatten();

        let peer = || {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        };

        Ok(Self(forwarded.or_else(peer)))
    }
}

fn forwarded_for(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

pub fn has_session(jar: &SignedCookieJar) -> bool {
    jar.get(SESSION_COOKIE)
        .is_some_and(|cookie| cookie.value() == SESSION_IDENTITY)
}

pub fn session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, SESSION_IDENTITY))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

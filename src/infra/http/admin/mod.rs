//! Password-protected administrative routes under `/admin/`.

mod comments;
mod dashboard;
mod pages;
mod placeholders;
mod posts;
mod settings;

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;

use crate::application::{admin::AdminContentError, error::HttpError, repos::RepoError};

use super::state::HttpState;

pub(super) fn routes() -> Router<HttpState> {
    Router::new()
        .route("/admin", get(|| async { Redirect::permanent("/admin/") }))
        .route("/admin/", get(dashboard::admin_dashboard))
        .route(
            "/admin/posts/",
            get(posts::admin_posts).post(posts::admin_posts_delete),
        )
        .route(
            "/admin/posts/edit/{id}",
            get(posts::admin_post_edit).post(posts::admin_post_save),
        )
        .route(
            "/admin/pages/",
            get(pages::admin_pages).post(pages::admin_pages_delete),
        )
        .route(
            "/admin/pages/edit/{id}",
            get(pages::admin_page_edit).post(pages::admin_page_save),
        )
        .route(
            "/admin/comments/",
            get(comments::admin_comments).post(comments::admin_comments_delete),
        )
        .route(
            "/admin/conf/",
            get(settings::admin_settings).post(settings::admin_settings_update),
        )
        .route("/admin/media/", get(placeholders::admin_media))
        .route("/admin/designs/", get(placeholders::admin_designs))
        .route("/admin/links/", get(placeholders::admin_links))
}

/// Checkbox selection submitted by the bulk-delete list forms.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct BulkDeleteForm {
    pub ids: Vec<i64>,
}

pub(super) fn repo_failure(source: &'static str, message: &'static str, err: RepoError) -> Response {
    HttpError::from_error(source, StatusCode::INTERNAL_SERVER_ERROR, message, &err).into_response()
}

pub(super) fn content_failure(
    source: &'static str,
    message: &'static str,
    err: AdminContentError,
) -> Response {
    match err {
        AdminContentError::NotFound => HttpError::new(
            source,
            StatusCode::NOT_FOUND,
            "Entry not found",
            "the entry being edited does not exist",
        )
        .into_response(),
        other => HttpError::from_error(source, StatusCode::INTERNAL_SERVER_ERROR, message, &other)
            .into_response(),
    }
}

pub(super) fn not_found(source: &'static str) -> Response {
    HttpError::new(
        source,
        StatusCode::NOT_FOUND,
        "Entry not found",
        "no entry with the requested id",
    )
    .into_response()
}

pub(super) fn deleted_notice(removed: u64, noun: &str) -> Option<String> {
    match removed {
        0 => None,
        1 => Some(format!("Deleted 1 {noun}.")),
        n => Some(format!("Deleted {n} {noun}s.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deleted_notice_pluralises() {
        assert_eq!(deleted_notice(0, "post"), None);
        assert_eq!(deleted_notice(1, "post").as_deref(), Some("Deleted 1 post."));
        assert_eq!(
            deleted_notice(3, "comment").as_deref(),
            Some("Deleted 3 comments.")
        );
    }
}

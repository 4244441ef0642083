//! Sections the admin sidebar links to that have no editor yet.

use axum::{http::StatusCode, response::Response};

use crate::presentation::{
    admin::views::{self as admin_views, AdminChrome, AdminPlaceholderView, AdminSection},
    views::render_template_response,
};

use crate::infra::http::extract::{AdminSession, CurrentBlog};

pub(super) async fn admin_media(
    _session: AdminSession,
    CurrentBlog(blog): CurrentBlog,
) -> Response {
    placeholder(
        &blog.config.title,
        AdminSection::Media,
        "Uploaded files are served from the configured media URL.",
    )
}

pub(super) async fn admin_designs(
    _session: AdminSession,
    CurrentBlog(blog): CurrentBlog,
) -> Response {
    placeholder(
        &blog.config.title,
        AdminSection::Designs,
        "The theme is chosen on the settings page.",
    )
}

pub(super) async fn admin_links(
    _session: AdminSession,
    CurrentBlog(blog): CurrentBlog,
) -> Response {
    placeholder(
        &blog.config.title,
        AdminSection::Links,
        "Sidebar and top links are edited on the settings page.",
    )
}

fn placeholder(blog_title: &str, section: AdminSection, message: &str) -> Response {
    let chrome = AdminChrome::new(blog_title, section);
    let content = AdminPlaceholderView {
        heading: section.label().to_string(),
        message: message.to_string(),
    };
    let view = admin_views::AdminLayout::new(chrome, content);
    render_template_response(admin_views::AdminPlaceholderTemplate { view }, StatusCode::OK)
}

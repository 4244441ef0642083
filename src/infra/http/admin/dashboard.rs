use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::presentation::{
    admin::views::{self as admin_views, AdminChrome, AdminSection},
    views::render_template_response,
};

use crate::infra::http::extract::{AdminSession, CurrentBlog};
use crate::infra::http::state::HttpState;

pub(super) async fn admin_dashboard(
    _session: AdminSession,
    State(state): State<HttpState>,
    CurrentBlog(blog): CurrentBlog,
) -> Response {
    let content = match state.admin.dashboard.overview(&blog).await {
        Ok(content) => content,
        Err(err) => return err.into_response(),
    };

    let chrome = AdminChrome::new(blog.config.title, AdminSection::Dashboard);
    let view = admin_views::AdminLayout::new(chrome, content);
    render_template_response(admin_views::AdminDashboardTemplate { view }, StatusCode::OK)
}

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form as SelectionForm;

use crate::application::{error::HttpError, markdown::RenderTarget};
use crate::domain::{archive::human_date, entities::BlogRecord};
use crate::presentation::{
    admin::views::{
        self as admin_views, AdminChrome, AdminCommentListView, AdminCommentRowView, AdminSection,
    },
    views::{PagerView, post_href, render_template_response},
};

use crate::infra::http::extract::{AdminSession, CurrentBlog};
use crate::infra::http::public::PageQuery;
use crate::infra::http::state::HttpState;

use super::{BulkDeleteForm, deleted_notice, repo_failure};

const SOURCE: &str = "infra::http::admin::comments";

pub(super) async fn admin_comments(
    _session: AdminSession,
    State(state): State<HttpState>,
    CurrentBlog(blog): CurrentBlog,
    Query(query): Query<PageQuery>,
) -> Response {
    render_list(&state, &blog, query.number(), None).await
}

pub(super) async fn admin_comments_delete(
    _session: AdminSession,
    State(state): State<HttpState>,
    CurrentBlog(blog): CurrentBlog,
    SelectionForm(form): SelectionForm<BulkDeleteForm>,
) -> Response {
    let removed = match state.admin.comments.delete(&blog, &form.ids).await {
        Ok(removed) => removed,
        Err(err) => return repo_failure(SOURCE, "Failed to delete comments", err),
    };
    render_list(&state, &blog, 1, deleted_notice(removed, "comment")).await
}

async fn render_list(
    state: &HttpState,
    blog: &BlogRecord,
    page_number: i64,
    notice: Option<String>,
) -> Response {
    let page = match state.admin.comments.list(blog, page_number).await {
        Ok(page) => page,
        Err(err) => return repo_failure(SOURCE, "Failed to list comments", err),
    };

    let pager = PagerView::for_page(&page, AdminSection::Comments.href());
    let mut rows = Vec::with_capacity(page.items.len());
    for entry in page.items {
        let body_html = match state
            .renderer
            .render(RenderTarget::Comment, &entry.comment.content)
        {
            Ok(html) => html,
            Err(err) => {
                return HttpError::from_error(
                    SOURCE,
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to render comment",
                    &err,
                )
                .into_response();
            }
        };
        let comment = entry.comment;
        rows.push(AdminCommentRowView {
            id: comment.id,
            author: comment.name,
            email: comment.email,
            ip: comment.ip,
            date: human_date(comment.created_at),
            body_html,
            post_title: entry.post_title,
            post_href: post_href(&entry.post_slug),
        });
    }

    let content = AdminCommentListView {
        heading: "Comments".to_string(),
        comments: rows,
        pager,
        notice,
    };

    let chrome = AdminChrome::new(blog.config.title.clone(), AdminSection::Comments);
    let view = admin_views::AdminLayout::new(chrome, content);
    render_template_response(admin_views::AdminCommentsTemplate { view }, StatusCode::OK)
}

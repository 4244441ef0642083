//! Post list, bulk delete and editor.

use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form as SelectionForm;

use crate::application::admin::{SaveOutcome, posts::NEW_POST_ID};
use crate::domain::{
    archive::human_date,
    entities::{BlogRecord, PostListing},
    forms::{FieldErrors, PostDraft},
    tags::join_tag_list,
};
use crate::presentation::{
    admin::views::{
        self as admin_views, AdminChrome, AdminPostEditView, AdminPostListView, AdminPostRowView,
        AdminSection,
    },
    views::{PagerView, post_href, render_template_response},
};

use crate::infra::http::extract::{AdminSession, CurrentBlog};
use crate::infra::http::public::PageQuery;
use crate::infra::http::state::HttpState;

use super::{BulkDeleteForm, content_failure, deleted_notice, not_found, repo_failure};

const SOURCE: &str = "infra::http::admin::posts";

pub(super) async fn admin_posts(
    _session: AdminSession,
    State(state): State<HttpState>,
    CurrentBlog(blog): CurrentBlog,
    Query(query): Query<PageQuery>,
) -> Response {
    render_list(&state, &blog, query.number(), None).await
}

pub(super) async fn admin_posts_delete(
    _session: AdminSession,
    State(state): State<HttpState>,
    CurrentBlog(blog): CurrentBlog,
    SelectionForm(form): SelectionForm<BulkDeleteForm>,
) -> Response {
    let removed = match state.admin.posts.delete(&blog, &form.ids).await {
        Ok(removed) => removed,
        Err(err) => return repo_failure(SOURCE, "Failed to delete posts", err),
    };
    render_list(&state, &blog, 1, deleted_notice(removed, "post")).await
}

pub(super) async fn admin_post_edit(
    _session: AdminSession,
    State(state): State<HttpState>,
    CurrentBlog(blog): CurrentBlog,
    Path(id): Path<i64>,
) -> Response {
    if id == NEW_POST_ID {
        let draft = PostDraft::blank();
        return render_editor(&blog, NEW_POST_ID, draft, None, FieldErrors::new(), None);
    }

    match state.admin.posts.find(&blog, id).await {
        Ok(Some(listing)) => render_editor(
            &blog,
            id,
            PostDraft::from_listing(&listing),
            Some(post_href(&listing.post.slug)),
            FieldErrors::new(),
            None,
        ),
        Ok(None) => not_found(SOURCE),
        Err(err) => repo_failure(SOURCE, "Failed to load post", err),
    }
}

pub(super) async fn admin_post_save(
    _session: AdminSession,
    State(state): State<HttpState>,
    CurrentBlog(blog): CurrentBlog,
    Path(id): Path<i64>,
    Form(draft): Form<PostDraft>,
) -> Response {
    match state.admin.posts.save(&blog, id, &draft).await {
        Ok(SaveOutcome::Invalid(errors)) => {
            let public_href = existing_href(&state, &blog, id).await;
            render_editor(&blog, id, draft, public_href, errors, None)
        }
        Ok(SaveOutcome::Created(post)) => Redirect::to(&edit_href(post.id)).into_response(),
        Ok(SaveOutcome::Updated(post)) => {
            let saved = PostDraft {
                slug: post.slug.clone(),
                ..draft
            };
            render_editor(
                &blog,
                post.id,
                saved,
                Some(post_href(&post.slug)),
                FieldErrors::new(),
                Some("Post saved.".to_string()),
            )
        }
        Err(err) => content_failure(SOURCE, "Failed to save post", err),
    }
}

/// Public link of a stored post, for redisplaying a rejected edit.
async fn existing_href(state: &HttpState, blog: &BlogRecord, id: i64) -> Option<String> {
    match state.admin.posts.find(blog, id).await {
        Ok(Some(listing)) => Some(post_href(&listing.post.slug)),
        _ => None,
    }
}

async fn render_list(
    state: &HttpState,
    blog: &BlogRecord,
    page_number: i64,
    notice: Option<String>,
) -> Response {
    let page = match state.admin.posts.list(blog, page_number).await {
        Ok(page) => page,
        Err(err) => return repo_failure(SOURCE, "Failed to list posts", err),
    };

    let pager = PagerView::for_page(&page, AdminSection::Posts.href());
    let content = AdminPostListView {
        heading: "Posts".to_string(),
        posts: page.items.iter().map(row_view).collect(),
        pager,
        new_post_href: edit_href(NEW_POST_ID),
        notice,
    };

    let chrome = AdminChrome::new(blog.config.title.clone(), AdminSection::Posts);
    let view = admin_views::AdminLayout::new(chrome, content);
    render_template_response(admin_views::AdminPostsTemplate { view }, StatusCode::OK)
}

fn render_editor(
    blog: &BlogRecord,
    id: i64,
    draft: PostDraft,
    public_href: Option<String>,
    errors: FieldErrors,
    notice: Option<String>,
) -> Response {
    let heading = if id == NEW_POST_ID {
        "New post".to_string()
    } else {
        "Edit post".to_string()
    };
    let content = AdminPostEditView {
        heading,
        id,
        form_action: edit_href(id),
        draft,
        errors,
        notice,
        public_href,
    };

    let chrome = AdminChrome::new(blog.config.title.clone(), AdminSection::Posts);
    let view = admin_views::AdminLayout::new(chrome, content);
    render_template_response(admin_views::AdminPostEditTemplate { view }, StatusCode::OK)
}

fn row_view(listing: &PostListing) -> AdminPostRowView {
    let post = &listing.post;
    AdminPostRowView {
        id: post.id,
        title: post.title.clone(),
        status_label: if post.published { "Published" } else { "Draft" },
        date: human_date(post.created_at),
        tags: join_tag_list(&listing.tags),
        comment_count: listing.comment_count,
        public_href: post_href(&post.slug),
        edit_href: edit_href(post.id),
    }
}

pub(crate) fn edit_href(id: i64) -> String {
    format!("/admin/posts/edit/{id}")
}

use askama::Template;

use crate::domain::forms::{FieldErrors, PostDraft};
use crate::presentation::views::PagerView;

use super::AdminLayout;

#[derive(Clone)]
pub struct AdminPostRowView {
    pub id: i64,
    pub title: String,
    pub status_label: &'static str,
    pub date: String,
    pub tags: String,
    pub comment_count: i64,
    pub public_href: String,
    pub edit_href: String,
}

#[derive(Clone)]
pub struct AdminPostListView {
    pub heading: String,
    pub posts: Vec<AdminPostRowView>,
    pub pager: PagerView,
    pub new_post_href: String,
    pub notice: Option<String>,
}

#[derive(Template)]
#[template(path = "admin/posts.html")]
pub struct AdminPostsTemplate {
    pub view: AdminLayout<AdminPostListView>,
}

/// Post editor state. `id == 0` is an unsaved post.
#[derive(Clone)]
pub struct AdminPostEditView {
    pub heading: String,
    pub id: i64,
    pub form_action: String,
    pub draft: PostDraft,
    pub errors: FieldErrors,
    pub notice: Option<String>,
    pub public_href: Option<String>,
}

#[derive(Template)]
#[template(path = "admin/edit.html")]
pub struct AdminPostEditTemplate {
    pub view: AdminLayout<AdminPostEditView>,
}

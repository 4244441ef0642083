use askama::Template;

use crate::presentation::views::PagerView;

use super::AdminLayout;

#[derive(Clone)]
pub struct AdminCommentRowView {
    pub id: i64,
    pub author: String,
    pub email: Option<String>,
    pub ip: Option<String>,
    pub date: String,
    pub body_html: String,
    pub post_title: String,
    pub post_href: String,
}

#[derive(Clone)]
pub struct AdminCommentListView {
    pub heading: String,
    pub comments: Vec<AdminCommentRowView>,
    pub pager: PagerView,
    pub notice: Option<String>,
}

#[derive(Template)]
#[template(path = "admin/comments.html")]
pub struct AdminCommentsTemplate {
    pub view: AdminLayout<AdminCommentListView>,
}

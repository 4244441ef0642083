use askama::Template;

use super::AdminLayout;

#[derive(Clone)]
pub struct AdminMetricView {
    pub label: String,
    pub value: u64,
    pub href: String,
}

#[derive(Clone)]
pub struct AdminRecentCommentView {
    pub author: String,
    pub date: String,
    pub excerpt: String,
    pub post_title: String,
    pub post_href: String,
}

#[derive(Clone)]
pub struct AdminDashboardView {
    pub heading: String,
    pub metrics: Vec<AdminMetricView>,
    pub recent_comments: Vec<AdminRecentCommentView>,
    pub empty_message: String,
}

impl AdminDashboardView {
    pub fn has_recent_comments(&self) -> bool {
        !self.recent_comments.is_empty()
    }
}

#[derive(Template)]
#[template(path = "admin/index.html")]
pub struct AdminDashboardTemplate {
    pub view: AdminLayout<AdminDashboardView>,
}

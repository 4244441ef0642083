use askama::Template;

use crate::domain::forms::{FieldErrors, PageDraft};
use crate::presentation::views::PagerView;

use super::AdminLayout;

#[derive(Clone)]
pub struct AdminPageRowView {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub status_label: &'static str,
    pub date: String,
    pub public_href: String,
    pub edit_href: String,
}

#[derive(Clone)]
pub struct AdminPageListView {
    pub heading: String,
    pub pages: Vec<AdminPageRowView>,
    pub pager: PagerView,
    pub new_page_href: String,
    pub notice: Option<String>,
}

#[derive(Template)]
#[template(path = "admin/pages.html")]
pub struct AdminPagesTemplate {
    pub view: AdminLayout<AdminPageListView>,
}

#[derive(Clone)]
pub struct AdminPageEditView {
    pub heading: String,
    pub id: i64,
    pub form_action: String,
    pub draft: PageDraft,
    pub errors: FieldErrors,
    pub notice: Option<String>,
    pub public_href: Option<String>,
}

#[derive(Template)]
#[template(path = "admin/edit_page.html")]
pub struct AdminPageEditTemplate {
    pub view: AdminLayout<AdminPageEditView>,
}

mod comments;
mod dashboard;
mod pages;
mod posts;
mod settings;

pub use comments::*;
pub use dashboard::*;
pub use pages::*;
pub use posts::*;
pub use settings::*;

use askama::Template;

/// One entry of the admin sidebar.
#[derive(Clone)]
pub struct AdminNavigationItemView {
    pub label: &'static str,
    pub href: &'static str,
    pub is_active: bool,
}

/// Sections of the admin area, in sidebar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminSection {
    Dashboard,
    Posts,
    Pages,
    Comments,
    Media,
    Designs,
    Links,
    Settings,
}

impl AdminSection {
    pub const ALL: [AdminSection; 8] = [
        Self::Dashboard,
        Self::Posts,
        Self::Pages,
        Self::Comments,
        Self::Media,
        Self::Designs,
        Self::Links,
        Self::Settings,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Posts => "Posts",
            Self::Pages => "Pages",
            Self::Comments => "Comments",
            Self::Media => "Media",
            Self::Designs => "Designs",
            Self::Links => "Links",
            Self::Settings => "Settings",
        }
    }

    pub fn href(self) -> &'static str {
        match self {
            Self::Dashboard => "/admin/",
            Self::Posts => "/admin/posts/",
            Self::Pages => "/admin/pages/",
            Self::Comments => "/admin/comments/",
            Self::Media => "/admin/media/",
            Self::Designs => "/admin/designs/",
            Self::Links => "/admin/links/",
            Self::Settings => "/admin/conf/",
        }
    }
}

#[derive(Clone)]
pub struct AdminChrome {
    pub blog_title: String,
    pub page_title: String,
    pub navigation: Vec<AdminNavigationItemView>,
}

impl AdminChrome {
    pub fn new(blog_title: impl Into<String>, active: AdminSection) -> Self {
        let navigation = AdminSection::ALL
            .into_iter()
            .map(|section| AdminNavigationItemView {
                label: section.label(),
                href: section.href(),
                is_active: section == active,
            })
            .collect();
        Self {
            blog_title: blog_title.into(),
            page_title: active.label().to_string(),
            navigation,
        }
    }
}

#[derive(Clone)]
pub struct AdminLayout<T> {
    pub chrome: AdminChrome,
    pub asset_version: String,
    pub content: T,
}

impl<T> AdminLayout<T> {
    pub fn new(chrome: AdminChrome, content: T) -> Self {
        Self {
            chrome,
            asset_version: asset_version(),
            content,
        }
    }
}

fn asset_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// `<option>` entry of a select input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminSelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Clone)]
pub struct AdminPlaceholderView {
    pub heading: String,
    pub message: String,
}

#[derive(Template)]
#[template(path = "admin/placeholder.html")]
pub struct AdminPlaceholderTemplate {
    pub view: AdminLayout<AdminPlaceholderView>,
}

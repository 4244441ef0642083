use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use thiserror::Error;

use crate::application::error::{ErrorReport, HttpError};
use crate::application::pagination::Page;
use crate::domain::forms::FieldErrors;

/// Characters left unescaped in a single URL path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Bare error page used when no blog chrome is available.
pub fn render_error_page(status: StatusCode, message: &str) -> Response {
    let template = BareErrorTemplate {
        status: status.as_u16(),
        message: message.to_string(),
    };
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(_) => (status, message.to_string()).into_response(),
    }
}

pub fn render_not_found_response(chrome: LayoutChrome) -> Response {
    let view = LayoutContext::new(chrome, "Not found", ErrorPageView::not_found());
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        "Resource not found",
    )
    .attach(&mut response);
    response
}

/// Percent-encode a value for use as one path segment.
pub fn encode_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

pub fn post_href(slug: &str) -> String {
    format!("/post/{}", encode_segment(slug))
}

pub fn page_href(slug: &str) -> String {
    format!("/page/{}", encode_segment(slug))
}

pub fn tag_href(name: &str) -> String {
    format!("/tag/{}", encode_segment(name))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkView {
    pub label: String,
    pub href: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CountedLinkView {
    pub label: String,
    pub href: String,
    pub count: u64,
}

/// Sidebar and header shared by every public page.
#[derive(Clone, Debug)]
pub struct LayoutChrome {
    pub blog_title: String,
    pub theme_url: String,
    pub html_lang: String,
    pub top_links: Vec<LinkView>,
    pub links: Vec<LinkView>,
    pub tags: Vec<CountedLinkView>,
    pub archives: Vec<CountedLinkView>,
    pub pages: Vec<LinkView>,
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub chrome: LayoutChrome,
    pub title: String,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: LayoutChrome, title: impl Into<String>, content: T) -> Self {
        Self {
            chrome,
            title: title.into(),
            content,
        }
    }

    /// Full `<title>`: the page title followed by the blog title.
    pub fn document_title(&self) -> String {
        if self.title.is_empty() {
            self.chrome.blog_title.clone()
        } else {
            format!("{} · {}", self.title, self.chrome.blog_title)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagBadge {
    pub label: String,
    pub href: String,
}

#[derive(Clone, Debug)]
pub struct PostCard {
    pub title: String,
    pub href: String,
    pub date: String,
    pub iso_date: String,
    pub body_html: String,
    pub badges: Vec<TagBadge>,
    pub comment_count: i64,
    pub comments_allowed: bool,
}

/// Previous/next links for a paginated list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PagerView {
    pub number: i64,
    pub total_pages: u64,
    pub previous_href: Option<String>,
    pub next_href: Option<String>,
}

impl PagerView {
    pub fn for_page<T>(page: &Page<T>, base_path: &str) -> Self {
        let href = |number: i64| {
            if number == 1 {
                base_path.to_string()
            } else {
                format!("{base_path}?p={number}")
            }
        };
        Self {
            number: page.number,
            total_pages: page.total_pages,
            previous_href: page.has_previous().then(|| href(page.previous_number())),
            next_href: page.has_next().then(|| href(page.next_number())),
        }
    }

    pub fn is_needed(&self) -> bool {
        self.previous_href.is_some() || self.next_href.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct FeedLinks {
    pub rss_href: String,
    pub atom_href: String,
}

pub struct ListContext {
    pub heading: Option<String>,
    pub posts: Vec<PostCard>,
    pub pager: PagerView,
    pub feeds: Option<FeedLinks>,
}

#[derive(Template)]
#[template(path = "list.html")]
pub struct ListTemplate {
    pub view: LayoutContext<ListContext>,
}

#[derive(Clone, Debug)]
pub struct CommentView {
    pub author: String,
    pub date: String,
    pub body_html: String,
}

/// Comment form state: the reader's draft and any field errors.
#[derive(Clone, Debug, Default)]
pub struct CommentFormView {
    pub name: String,
    pub email: String,
    pub content: String,
    pub errors: FieldErrors,
    pub show_email: bool,
    pub email_required: bool,
    pub notice: Option<String>,
}

pub struct PostDetailContext {
    pub post: PostCard,
    pub comments: Vec<CommentView>,
    pub form: Option<CommentFormView>,
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub view: LayoutContext<PostDetailContext>,
}

pub struct PageView {
    pub title: String,
    pub date: String,
    pub body_html: String,
}

#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate {
    pub view: LayoutContext<PageView>,
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Page Not Found".to_string(),
            message: "The page you requested does not exist.".to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}

#[derive(Template)]
#[template(path = "bare_error.html")]
pub struct BareErrorTemplate {
    pub status: u16,
    pub message: String,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub blog_title: String,
    pub next: String,
    pub error: Option<String>,
}

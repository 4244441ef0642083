use std::sync::Arc;

use axum::http::StatusCode;

use crate::application::error::HttpError;
use crate::application::feed::render_failure;
use crate::application::markdown::{MarkdownRenderer, RenderTarget};
use crate::application::repos::{PagesRepo, RepoError, Visibility};
use crate::domain::archive::human_date;
use crate::domain::entities::BlogRecord;
use crate::presentation::views::PageView;

const SOURCE: &str = "application::page::PageService";

#[derive(Clone)]
pub struct PageService {
    pages: Arc<dyn PagesRepo>,
    renderer: Arc<MarkdownRenderer>,
}

impl PageService {
    pub fn new(pages: Arc<dyn PagesRepo>, renderer: Arc<MarkdownRenderer>) -> Self {
        Self { pages, renderer }
    }

    pub async fn page_view(
        &self,
        blog: &BlogRecord,
        slug: &str,
    ) -> Result<Option<PageView>, HttpError> {
        let record = self
            .pages
            .find_page_by_slug(blog.id, slug, Visibility::Published)
            .await
            .map_err(|err| repo_failure("find_page_by_slug", err))?;

        let Some(record) = record else {
            return Ok(None);
        };

        let body_html = self
            .renderer
            .render(RenderTarget::Page, &record.content)
            .map_err(render_failure)?;

        Ok(Some(PageView {
            title: record.title,
            date: human_date(record.created_at),
            body_html,
        }))
    }
}

fn repo_failure(operation: &'static str, err: RepoError) -> HttpError {
    HttpError::new(
        SOURCE,
        StatusCode::INTERNAL_SERVER_ERROR,
        "Failed to load page content",
        format!("{operation} failed: {err}"),
    )
}

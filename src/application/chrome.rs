use std::sync::Arc;

use axum::http::StatusCode;

use crate::application::error::HttpError;
use crate::application::repos::{PagesRepo, PostsRepo, RepoError, TagsRepo, Visibility};
use crate::domain::archive::compute_month_counts;
use crate::domain::blog_config::Link;
use crate::domain::entities::BlogRecord;
use crate::presentation::views::{CountedLinkView, LayoutChrome, LinkView, page_href, tag_href};

const SOURCE: &str = "application::chrome::ChromeService";

/// Builds the header and sidebar shared by every public page.
#[derive(Clone)]
pub struct ChromeService {
    posts: Arc<dyn PostsRepo>,
    tags: Arc<dyn TagsRepo>,
    pages: Arc<dyn PagesRepo>,
}

impl ChromeService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        tags: Arc<dyn TagsRepo>,
        pages: Arc<dyn PagesRepo>,
    ) -> Self {
        Self { posts, tags, pages }
    }

    pub async fn load(&self, blog: &BlogRecord) -> Result<LayoutChrome, HttpError> {
        let tags = self
            .tags
            .list_tags_with_counts(blog.id, Visibility::Published)
            .await
            .map_err(|err| repo_failure("list_tags_with_counts", err))?;

        let dates = self
            .posts
            .post_dates(blog.id, Visibility::Published)
            .await
            .map_err(|err| repo_failure("post_dates", err))?;

        let pages = self
            .pages
            .list_page_links(blog.id, Visibility::Published)
            .await
            .map_err(|err| repo_failure("list_page_links", err))?;

        let config = &blog.config;
        Ok(LayoutChrome {
            blog_title: config.title.clone(),
            theme_url: config.theme_url(),
            html_lang: config.lang.html_lang().to_string(),
            top_links: link_views(&config.top_links),
            links: link_views(&config.links),
            tags: tags
                .into_iter()
                .map(|tag| CountedLinkView {
                    href: tag_href(&tag.name),
                    label: tag.name,
                    count: u64::try_from(tag.post_count).unwrap_or_default(),
                })
                .collect(),
            archives: compute_month_counts(dates)
                .into_iter()
                .map(|month| CountedLinkView {
                    href: month.href(),
                    label: month.label,
                    count: month.count as u64,
                })
                .collect(),
            pages: pages
                .into_iter()
                .map(|page| LinkView {
                    href: page_href(&page.slug),
                    label: page.title,
                })
                .collect(),
        })
    }
}

fn link_views(links: &[Link]) -> Vec<LinkView> {
    links
        .iter()
        .map(|link| LinkView {
            label: link.label.clone(),
            href: link.url.clone(),
        })
        .collect()
}

fn repo_failure(operation: &'static str, err: RepoError) -> HttpError {
    HttpError::new(
        SOURCE,
        StatusCode::INTERNAL_SERVER_ERROR,
        "Failed to load site chrome",
        format!("{operation} failed: {err}"),
    )
}

use std::sync::Arc;

use axum::http::StatusCode;
use time::format_description::well_known::Rfc3339;

use crate::application::error::HttpError;
use crate::application::markdown::{MarkdownRenderer, RenderError, RenderTarget};
use crate::application::pagination::PageRequest;
use crate::application::repos::{PostFilter, PostsRepo, RepoError, TagsRepo, Visibility};
use crate::domain::archive::{human_date, month_label, month_range};
use crate::domain::entities::{BlogRecord, PostListing};
use crate::presentation::views::{
    FeedLinks, ListContext, PagerView, PostCard, TagBadge, encode_segment, post_href, tag_href,
};

const SOURCE: &str = "application::feed::FeedService";

/// Paginated public post lists: front page, tag and archive month.
#[derive(Clone)]
pub struct FeedService {
    posts: Arc<dyn PostsRepo>,
    tags: Arc<dyn TagsRepo>,
    renderer: Arc<MarkdownRenderer>,
}

impl FeedService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        tags: Arc<dyn TagsRepo>,
        renderer: Arc<MarkdownRenderer>,
    ) -> Self {
        Self {
            posts,
            tags,
            renderer,
        }
    }

    pub async fn front_page(
        &self,
        blog: &BlogRecord,
        page_number: i64,
    ) -> Result<ListContext, HttpError> {
        self.list(blog, PostFilter::Everything, page_number, "/", None, None)
            .await
    }

    /// `None` when no tag of that name exists.
    pub async fn tag_page(
        &self,
        blog: &BlogRecord,
        name: &str,
        page_number: i64,
    ) -> Result<Option<ListContext>, HttpError> {
        let exists = self
            .tags
            .tag_exists(blog.id, name, Visibility::Published)
            .await
            .map_err(|err| repo_failure("tag_exists", err))?;
        if !exists {
            return Ok(None);
        }

        let segment = encode_segment(name);
        let feeds = FeedLinks {
            rss_href: format!("/feed/tag/{segment}/rss2"),
            atom_href: format!("/feed/tag/{segment}/atom"),
        };
        self.list(
            blog,
            PostFilter::Tag(name.to_string()),
            page_number,
            &tag_href(name),
            Some(format!("Posts tagged “{name}”")),
            Some(feeds),
        )
        .await
        .map(Some)
    }

    /// `None` for a month outside `1..=12`.
    pub async fn archive_page(
        &self,
        blog: &BlogRecord,
        year: i32,
        month: u8,
        page_number: i64,
    ) -> Result<Option<ListContext>, HttpError> {
        let Some((start, end)) = month_range(year, month) else {
            return Ok(None);
        };

        self.list(
            blog,
            PostFilter::CreatedBetween { start, end },
            page_number,
            &format!("/archives/{year}/{month:02}"),
            Some(format!("Archives: {}", month_label(year, month))),
            None,
        )
        .await
        .map(Some)
    }

    async fn list(
        &self,
        blog: &BlogRecord,
        filter: PostFilter,
        page_number: i64,
        base_path: &str,
        heading: Option<String>,
        feeds: Option<FeedLinks>,
    ) -> Result<ListContext, HttpError> {
        let request = PageRequest::new(page_number, blog.config.max_post);
        let page = self
            .posts
            .list_posts(blog.id, Visibility::Published, &filter, request)
            .await
            .map_err(|err| repo_failure("list_posts", err))?;

        let pager = PagerView::for_page(&page, base_path);
        let mut posts = Vec::with_capacity(page.items.len());
        for listing in &page.items {
            posts.push(listing_to_card(&self.renderer, listing)?);
        }

        Ok(ListContext {
            heading,
            posts,
            pager,
            feeds,
        })
    }
}

pub(crate) fn listing_to_card(
    renderer: &MarkdownRenderer,
    listing: &PostListing,
) -> Result<PostCard, HttpError> {
    let post = &listing.post;
    let body_html = renderer
        .render(RenderTarget::Post, &post.content)
        .map_err(render_failure)?;

    Ok(PostCard {
        title: post.title.clone(),
        href: post_href(&post.slug),
        date: human_date(post.created_at),
        iso_date: post.created_at.format(&Rfc3339).unwrap_or_default(),
        body_html,
        badges: listing
            .tags
            .iter()
            .map(|tag| TagBadge {
                label: tag.name.clone(),
                href: tag_href(&tag.name),
            })
            .collect(),
        comment_count: listing.comment_count,
        comments_allowed: post.comments_allowed,
    })
}

pub(crate) fn render_failure(err: RenderError) -> HttpError {
    HttpError::from_error(
        "application::markdown::MarkdownRenderer",
        StatusCode::INTERNAL_SERVER_ERROR,
        "Failed to render content",
        &err,
    )
}

fn repo_failure(operation: &'static str, err: RepoError) -> HttpError {
    HttpError::new(
        SOURCE,
        StatusCode::INTERNAL_SERVER_ERROR,
        "Failed to load posts",
        format!("{operation} failed: {err}"),
    )
}

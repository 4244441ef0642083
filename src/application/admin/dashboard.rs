use std::sync::Arc;

use axum::http::StatusCode;

use crate::application::{
    error::HttpError,
    pagination::PageRequest,
    repos::{CommentsRepo, PagesRepo, PostsRepo, RepoError, TagsRepo, Visibility},
};
use crate::domain::archive::human_date;
use crate::domain::entities::BlogRecord;
use crate::presentation::admin::views::{
    AdminDashboardView, AdminMetricView, AdminRecentCommentView, AdminSection,
};
use crate::presentation::views::post_href;

const SOURCE: &str = "application::admin::dashboard::AdminDashboardService";
const POSTS_FAILURE_MESSAGE: &str = "Failed to compute post dashboard metrics";
const PAGES_FAILURE_MESSAGE: &str = "Failed to compute page dashboard metrics";
const COMMENTS_FAILURE_MESSAGE: &str = "Failed to compute comment dashboard metrics";
const TAGS_FAILURE_MESSAGE: &str = "Failed to enumerate tags for dashboard metrics";
const RECENT_COMMENTS: u32 = 5;
const EXCERPT_CHARS: usize = 80;

#[derive(Clone)]
pub struct AdminDashboardService {
    posts: Arc<dyn PostsRepo>,
    pages: Arc<dyn PagesRepo>,
    comments: Arc<dyn CommentsRepo>,
    tags: Arc<dyn TagsRepo>,
}

impl AdminDashboardService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        pages: Arc<dyn PagesRepo>,
        comments: Arc<dyn CommentsRepo>,
        tags: Arc<dyn TagsRepo>,
    ) -> Self {
        Self {
            posts,
            pages,
            comments,
            tags,
        }
    }

    pub async fn overview(&self, blog: &BlogRecord) -> Result<AdminDashboardView, HttpError> {
        let blog_id = blog.id;
        let (posts, pages, comments, tags, recent) = tokio::try_join!(
            async {
                self.posts
                    .count_posts(blog_id)
                    .await
                    .map_err(|err| repo_failure(POSTS_FAILURE_MESSAGE, err))
            },
            async {
                self.pages
                    .count_pages(blog_id)
                    .await
                    .map_err(|err| repo_failure(PAGES_FAILURE_MESSAGE, err))
            },
            async {
                self.comments
                    .count_comments(blog_id)
                    .await
                    .map_err(|err| repo_failure(COMMENTS_FAILURE_MESSAGE, err))
            },
            async {
                self.tags
                    .list_tags_with_counts(blog_id, Visibility::All)
                    .await
                    .map_err(|err| repo_failure(TAGS_FAILURE_MESSAGE, err))
            },
            async {
                self.comments
                    .list_recent_comments(blog_id, PageRequest::first(RECENT_COMMENTS))
                    .await
                    .map_err(|err| repo_failure(COMMENTS_FAILURE_MESSAGE, err))
            },
        )?;

        let metrics = vec![
            metric("Posts", posts, AdminSection::Posts),
            metric("Pages", pages, AdminSection::Pages),
            metric("Comments", comments, AdminSection::Comments),
            metric("Tags", tags.len() as u64, AdminSection::Posts),
        ];

        let recent_comments = recent
            .items
            .into_iter()
            .map(|entry| AdminRecentCommentView {
                author: entry.comment.name,
                date: human_date(entry.comment.created_at),
                excerpt: excerpt(&entry.comment.content),
                post_href: post_href(&entry.post_slug),
                post_title: entry.post_title,
            })
            .collect();

        Ok(AdminDashboardView {
            heading: "Dashboard".to_string(),
            metrics,
            recent_comments,
            empty_message: "No comments yet.".to_string(),
        })
    }
}

fn metric(label: &str, value: u64, section: AdminSection) -> AdminMetricView {
    AdminMetricView {
        label: label.to_string(),
        value,
        href: section.href().to_string(),
    }
}

fn excerpt(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}

fn repo_failure(message: &'static str, err: RepoError) -> HttpError {
    HttpError::new(
        SOURCE,
        StatusCode::INTERNAL_SERVER_ERROR,
        message,
        err.to_string(),
    )
}

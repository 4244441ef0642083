use std::sync::Arc;

use tracing::info;

use crate::application::pagination::{Page, PageRequest};
use crate::application::repos::{CommentsRepo, RepoError};
use crate::domain::entities::{BlogRecord, CommentWithPost};

#[derive(Clone)]
pub struct AdminCommentService {
    comments: Arc<dyn CommentsRepo>,
}

impl AdminCommentService {
    pub fn new(comments: Arc<dyn CommentsRepo>) -> Self {
        Self { comments }
    }

    /// Newest first across all posts, `max_comment` per page.
    pub async fn list(
        &self,
        blog: &BlogRecord,
        page_number: i64,
    ) -> Result<Page<CommentWithPost>, RepoError> {
        self.comments
            .list_recent_comments(
                blog.id,
                PageRequest::new(page_number, blog.config.max_comment),
            )
            .await
    }

    pub async fn delete(&self, blog: &BlogRecord, ids: &[i64]) -> Result<u64, RepoError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let removed = self.comments.delete_comments(blog.id, ids).await?;
        info!(
            target = "pblog::application::admin::comments",
            requested = ids.len(),
            removed,
            "comments deleted"
        );
        Ok(removed)
    }
}

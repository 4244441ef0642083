//! Domain entities mirrored from persistent storage.

use serde::Serialize;
use time::OffsetDateTime;

use crate::domain::blog_config::BlogConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct BlogRecord {
    pub id: i64,
    pub name: String,
    pub config: BlogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRecord {
    pub id: i64,
    pub blog_id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub published: bool,
    pub comments_allowed: bool,
    pub created_at: OffsetDateTime,
}

/// A post together with its tags and derived comment count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostListing {
    pub post: PostRecord,
    pub tags: Vec<TagRecord>,
    pub comment_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TagRecord {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagWithCount {
    pub id: i64,
    pub name: String,
    pub post_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageRecord {
    pub id: i64,
    pub blog_id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub published: bool,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentRecord {
    pub id: i64,
    pub blog_id: i64,
    pub post_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub content: String,
    pub ip: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Comment joined with the title and slug of the post it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentWithPost {
    pub comment: CommentRecord,
    pub post_title: String,
    pub post_slug: String,
}

//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::application::pagination::{Page, PageRequest};
use crate::domain::blog_config::BlogConfig;
use crate::domain::entities::{
    BlogRecord, CommentRecord, CommentWithPost, PageRecord, PostListing, PostRecord,
    TagWithCount,
};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    /// True for a unique violation on a `(blog_id, slug)` constraint.
    pub fn is_slug_conflict(&self) -> bool {
        matches!(self, Self::Duplicate { constraint } if constraint.contains("slug"))
    }
}

/// Which posts or pages a query may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Public views: published entries only.
    Published,
    /// Admin views: everything.
    All,
}

impl Visibility {
    pub fn admits(self, published: bool) -> bool {
        match self {
            Visibility::Published => published,
            Visibility::All => true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PostFilter {
    #[default]
    Everything,
    Tag(String),
    /// Half-open `[start, end)` on the creation timestamp.
    CreatedBetween {
        start: OffsetDateTime,
        end: OffsetDateTime,
    },
}

/// Post fields written by the admin editor. `tags` is the full desired set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostWrite {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub published: bool,
    pub comments_allowed: bool,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWrite {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub published: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub post_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub content: String,
    pub ip: Option<String>,
}

#[async_trait]
pub trait BlogsRepo: Send + Sync {
    async fn find_blog_by_name(&self, name: &str) -> Result<Option<BlogRecord>, RepoError>;

    async fn create_blog(&self, name: &str, config: &BlogConfig)
    -> Result<BlogRecord, RepoError>;

    async fn update_blog_config(&self, blog_id: i64, config: &BlogConfig)
    -> Result<(), RepoError>;
}

#[async_trait]
pub trait PostsRepo: Send + Sync {
    /// Newest first.
    async fn list_posts(
        &self,
        blog_id: i64,
        visibility: Visibility,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<PostListing>, RepoError>;

    async fn find_post_by_slug(
        &self,
        blog_id: i64,
        slug: &str,
        visibility: Visibility,
    ) -> Result<Option<PostListing>, RepoError>;

    async fn find_post_by_id(
        &self,
        blog_id: i64,
        id: i64,
    ) -> Result<Option<PostListing>, RepoError>;

    /// Creation timestamps of every visible post, for archive aggregation.
    async fn post_dates(
        &self,
        blog_id: i64,
        visibility: Visibility,
    ) -> Result<Vec<OffsetDateTime>, RepoError>;

    /// Whether another post (other than `exclude`) already uses `slug`.
    async fn post_slug_exists(
        &self,
        blog_id: i64,
        slug: &str,
        exclude: Option<i64>,
    ) -> Result<bool, RepoError>;

    async fn count_posts(&self, blog_id: i64) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait PostsWriteRepo: Send + Sync {
    /// Insert a post and attach its tags in one transaction.
    async fn create_post(&self, blog_id: i64, write: PostWrite) -> Result<PostRecord, RepoError>;

    /// Update a post and reconcile its tags in one transaction, pruning tags
    /// that are left without posts.
    async fn update_post(
        &self,
        blog_id: i64,
        id: i64,
        write: PostWrite,
    ) -> Result<PostRecord, RepoError>;

    /// Delete posts (and, by cascade, their comments), then prune orphaned
    /// tags. Unknown ids are ignored. Returns the number of posts removed.
    async fn delete_posts(&self, blog_id: i64, ids: &[i64]) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait TagsRepo: Send + Sync {
    /// Tags ordered by name with the number of visible posts carrying them.
    /// Tags with no visible post are omitted.
    async fn list_tags_with_counts(
        &self,
        blog_id: i64,
        visibility: Visibility,
    ) -> Result<Vec<TagWithCount>, RepoError>;

    /// Under [`Visibility::Published`] a tag only exists while a published post carries it.
    async fn tag_exists(
        &self,
        blog_id: i64,
        name: &str,
        visibility: Visibility,
    ) -> Result<bool, RepoError>;
}

#[async_trait]
pub trait PagesRepo: Send + Sync {
    /// Newest first.
    async fn list_pages(
        &self,
        blog_id: i64,
        visibility: Visibility,
        page: PageRequest,
    ) -> Result<Page<PageRecord>, RepoError>;

    /// All visible pages ordered by title.
    async fn list_page_links(
        &self,
        blog_id: i64,
        visibility: Visibility,
    ) -> Result<Vec<PageRecord>, RepoError>;

    async fn find_page_by_slug(
        &self,
        blog_id: i64,
        slug: &str,
        visibility: Visibility,
    ) -> Result<Option<PageRecord>, RepoError>;

    async fn find_page_by_id(&self, blog_id: i64, id: i64)
    -> Result<Option<PageRecord>, RepoError>;

    async fn page_slug_exists(
        &self,
        blog_id: i64,
        slug: &str,
        exclude: Option<i64>,
    ) -> Result<bool, RepoError>;

    async fn count_pages(&self, blog_id: i64) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait PagesWriteRepo: Send + Sync {
    async fn create_page(&self, blog_id: i64, write: PageWrite) -> Result<PageRecord, RepoError>;

    async fn update_page(
        &self,
        blog_id: i64,
        id: i64,
        write: PageWrite,
    ) -> Result<PageRecord, RepoError>;

    async fn delete_pages(&self, blog_id: i64, ids: &[i64]) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait CommentsRepo: Send + Sync {
    /// Oldest first.
    async fn list_comments_for_post(&self, post_id: i64)
    -> Result<Vec<CommentRecord>, RepoError>;

    /// Newest first, across every post of the blog.
    async fn list_recent_comments(
        &self,
        blog_id: i64,
        page: PageRequest,
    ) -> Result<Page<CommentWithPost>, RepoError>;

    async fn create_comment(
        &self,
        blog_id: i64,
        comment: NewComment,
    ) -> Result<CommentRecord, RepoError>;

    async fn delete_comments(&self, blog_id: i64, ids: &[i64]) -> Result<u64, RepoError>;

    async fn count_comments(&self, blog_id: i64) -> Result<u64, RepoError>;
}

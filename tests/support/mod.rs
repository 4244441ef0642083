//! In-memory repositories shared by the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use pblog::application::pagination::{Page, PageRequest, paginate};
use pblog::application::repos::{
    BlogsRepo, CommentsRepo, NewComment, PageWrite, PagesRepo, PagesWriteRepo, PostFilter,
    PostWrite, PostsRepo, PostsWriteRepo, RepoError, TagsRepo, Visibility,
};
use pblog::domain::blog_config::BlogConfig;
use pblog::domain::entities::{
    BlogRecord, CommentRecord, CommentWithPost, PageRecord, PostListing, PostRecord, TagRecord,
    TagWithCount,
};
use pblog::domain::tags::plan_tag_sync;
use pblog::infra::http::HttpRepositories;
use time::{Duration, OffsetDateTime, macros::datetime};

#[derive(Default)]
struct State {
    next_id: i64,
    ticks: i64,
    blogs: Vec<BlogRecord>,
    posts: Vec<PostRecord>,
    pages: Vec<PageRecord>,
    comments: Vec<CommentRecord>,
    tags: Vec<(i64, TagRecord)>,
    post_tags: Vec<(i64, i64)>,
}

impl State {
    fn id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Monotonic clock starting at 2024-03-01 12:00 UTC, one minute per write.
    fn now(&mut self) -> OffsetDateTime {
        self.ticks += 1;
        datetime!(2024-03-01 12:00 UTC) + Duration::minutes(self.ticks)
    }

    fn tags_of(&self, post_id: i64) -> Vec<TagRecord> {
        let mut tags: Vec<TagRecord> = self
            .post_tags
            .iter()
            .filter(|(post, _)| *post == post_id)
            .filter_map(|(_, tag_id)| {
                self.tags
                    .iter()
                    .find(|(_, tag)| tag.id == *tag_id)
                    .map(|(_, tag)| tag.clone())
            })
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        tags
    }

    fn listing(&self, post: &PostRecord) -> PostListing {
        PostListing {
            post: post.clone(),
            tags: self.tags_of(post.id),
            comment_count: self
                .comments
                .iter()
                .filter(|comment| comment.post_id == post.id)
                .count() as i64,
        }
    }

    fn matches(&self, post: &PostRecord, filter: &PostFilter) -> bool {
        match filter {
            PostFilter::Everything => true,
            PostFilter::Tag(name) => self.tags_of(post.id).iter().any(|tag| &tag.name == name),
            PostFilter::CreatedBetween { start, end } => {
                post.created_at >= *start && post.created_at < *end
            }
        }
    }

    fn sync_tags(&mut self, blog_id: i64, post_id: i64, requested: &[String]) {
        let current = self.tags_of(post_id);
        let plan = plan_tag_sync(&current, requested);

        for name in plan.attach {
            let existing = self
                .tags
                .iter()
                .find(|(blog, tag)| *blog == blog_id && tag.name == name)
                .map(|(_, tag)| tag.id);
            let tag_id = match existing {
                Some(id) => id,
                None => {
                    let id = self.id();
                    self.tags.push((blog_id, TagRecord { id, name }));
                    id
                }
            };
            if !self.post_tags.contains(&(post_id, tag_id)) {
                self.post_tags.push((post_id, tag_id));
            }
        }

        for tag in plan.detach {
            self.post_tags
                .retain(|(post, tag_id)| !(*post == post_id && *tag_id == tag.id));
        }

        self.prune_tags();
    }

    fn prune_tags(&mut self) {
        let used: Vec<i64> = self.post_tags.iter().map(|(_, tag)| *tag).collect();
        self.tags.retain(|(_, tag)| used.contains(&tag.id));
    }

    fn slug_taken(&self, blog_id: i64, slug: &str, exclude: Option<i64>) -> bool {
        self.posts
            .iter()
            .any(|p| p.blog_id == blog_id && p.slug == slug && Some(p.id) != exclude)
    }

    fn page_slug_taken(&self, blog_id: i64, slug: &str, exclude: Option<i64>) -> bool {
        self.pages
            .iter()
            .any(|p| p.blog_id == blog_id && p.slug == slug && Some(p.id) != exclude)
    }
}

fn slug_conflict(constraint: &str) -> RepoError {
    RepoError::Duplicate {
        constraint: constraint.to_string(),
    }
}

/// Implements every repository trait over one shared store.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("store lock")
    }

    pub fn repositories(self: &Arc<Self>) -> HttpRepositories {
        HttpRepositories {
            blogs: self.clone(),
            posts: self.clone(),
            posts_write: self.clone(),
            pages: self.clone(),
            pages_write: self.clone(),
            comments: self.clone(),
            tags: self.clone(),
        }
    }

    pub fn tag_names(&self, blog_id: i64) -> Vec<String> {
        let state = self.lock();
        let mut names: Vec<String> = state
            .tags
            .iter()
            .filter(|(blog, _)| *blog == blog_id)
            .map(|(_, tag)| tag.name.clone())
            .collect();
        names.sort();
        names
    }

    pub fn comment_count(&self) -> usize {
        self.lock().comments.len()
    }

    pub fn comment_ips(&self) -> Vec<Option<String>> {
        self.lock().comments.iter().map(|c| c.ip.clone()).collect()
    }

    pub fn set_post_created_at(&self, post_id: i64, at: OffsetDateTime) {
        let mut state = self.lock();
        if let Some(post) = state.posts.iter_mut().find(|post| post.id == post_id) {
            post.created_at = at;
        }
    }
}

#[async_trait]
impl BlogsRepo for MemoryStore {
    async fn find_blog_by_name(&self, name: &str) -> Result<Option<BlogRecord>, RepoError> {
        Ok(self.lock().blogs.iter().find(|b| b.name == name).cloned())
    }

    async fn create_blog(&self, name: &str, config: &BlogConfig) -> Result<BlogRecord, RepoError> {
        let mut state = self.lock();
        if state.blogs.iter().any(|b| b.name == name) {
            return Err(slug_conflict("blogs_name_key"));
        }
        let blog = BlogRecord {
            id: state.id(),
            name: name.to_string(),
            config: config.clone(),
        };
        state.blogs.push(blog.clone());
        Ok(blog)
    }

    async fn update_blog_config(&self, blog_id: i64, config: &BlogConfig) -> Result<(), RepoError> {
        let mut state = self.lock();
        let blog = state
            .blogs
            .iter_mut()
            .find(|b| b.id == blog_id)
            .ok_or(RepoError::NotFound)?;
        blog.config = config.clone();
        Ok(())
    }
}

#[async_trait]
impl PostsRepo for MemoryStore {
    async fn list_posts(
        &self,
        blog_id: i64,
        visibility: Visibility,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<PostListing>, RepoError> {
        let state = self.lock();
        let mut posts: Vec<&PostRecord> = state
            .posts
            .iter()
            .filter(|p| p.blog_id == blog_id && visibility.admits(p.published))
            .filter(|p| state.matches(p, filter))
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let listings = posts.into_iter().map(|p| state.listing(p)).collect();
        Ok(paginate(listings, page))
    }

    async fn find_post_by_slug(
        &self,
        blog_id: i64,
        slug: &str,
        visibility: Visibility,
    ) -> Result<Option<PostListing>, RepoError> {
        let state = self.lock();
        Ok(state
            .posts
            .iter()
            .find(|p| p.blog_id == blog_id && p.slug == slug && visibility.admits(p.published))
            .map(|p| state.listing(p)))
    }

    async fn find_post_by_id(
        &self,
        blog_id: i64,
        id: i64,
    ) -> Result<Option<PostListing>, RepoError> {
        let state = self.lock();
        Ok(state
            .posts
            .iter()
            .find(|p| p.blog_id == blog_id && p.id == id)
            .map(|p| state.listing(p)))
    }

    async fn post_dates(
        &self,
        blog_id: i64,
        visibility: Visibility,
    ) -> Result<Vec<OffsetDateTime>, RepoError> {
        let state = self.lock();
        let mut dates: Vec<OffsetDateTime> = state
            .posts
            .iter()
            .filter(|p| p.blog_id == blog_id && visibility.admits(p.published))
            .map(|p| p.created_at)
            .collect();
        dates.sort_by(|a, b| b.cmp(a));
        Ok(dates)
    }

    async fn post_slug_exists(
        &self,
        blog_id: i64,
        slug: &str,
        exclude: Option<i64>,
    ) -> Result<bool, RepoError> {
        Ok(self.lock().slug_taken(blog_id, slug, exclude))
    }

    async fn count_posts(&self, blog_id: i64) -> Result<u64, RepoError> {
        Ok(self.lock().posts.iter().filter(|p| p.blog_id == blog_id).count() as u64)
    }
}

#[async_trait]
impl PostsWriteRepo for MemoryStore {
    async fn create_post(&self, blog_id: i64, write: PostWrite) -> Result<PostRecord, RepoError> {
        let mut state = self.lock();
        if state.slug_taken(blog_id, &write.slug, None) {
            return Err(slug_conflict("posts_blog_slug_key"));
        }
        let post = PostRecord {
            id: state.id(),
            blog_id,
            title: write.title,
            slug: write.slug,
            content: write.content,
            published: write.published,
            comments_allowed: write.comments_allowed,
            created_at: state.now(),
        };
        state.posts.push(post.clone());
        state.sync_tags(blog_id, post.id, &write.tags);
        Ok(post)
    }

    async fn update_post(
        &self,
        blog_id: i64,
        id: i64,
        write: PostWrite,
    ) -> Result<PostRecord, RepoError> {
        let mut state = self.lock();
        if state.slug_taken(blog_id, &write.slug, Some(id)) {
            return Err(slug_conflict("posts_blog_slug_key"));
        }
        let post = state
            .posts
            .iter_mut()
            .find(|p| p.blog_id == blog_id && p.id == id)
            .ok_or(RepoError::NotFound)?;
        post.title = write.title;
        post.slug = write.slug;
        post.content = write.content;
        post.published = write.published;
        post.comments_allowed = write.comments_allowed;
        let updated = post.clone();
        state.sync_tags(blog_id, id, &write.tags);
        Ok(updated)
    }

    async fn delete_posts(&self, blog_id: i64, ids: &[i64]) -> Result<u64, RepoError> {
        let mut state = self.lock();
        let before = state.posts.len();
        state
            .posts
            .retain(|p| !(p.blog_id == blog_id && ids.contains(&p.id)));
        let removed = (before - state.posts.len()) as u64;

        let live: Vec<i64> = state.posts.iter().map(|p| p.id).collect();
        state.comments.retain(|c| live.contains(&c.post_id));
        state.post_tags.retain(|(post, _)| live.contains(post));
        state.prune_tags();
        Ok(removed)
    }
}

#[async_trait]
impl TagsRepo for MemoryStore {
    async fn list_tags_with_counts(
        &self,
        blog_id: i64,
        visibility: Visibility,
    ) -> Result<Vec<TagWithCount>, RepoError> {
        let state = self.lock();
        let mut counts: Vec<TagWithCount> = state
            .tags
            .iter()
            .filter(|(blog, _)| *blog == blog_id)
            .map(|(_, tag)| TagWithCount {
                id: tag.id,
                name: tag.name.clone(),
                post_count: state
                    .post_tags
                    .iter()
                    .filter(|(_, tag_id)| *tag_id == tag.id)
                    .filter(|(post_id, _)| {
                        state
                            .posts
                            .iter()
                            .any(|p| p.id == *post_id && visibility.admits(p.published))
                    })
                    .count() as i64,
            })
            .filter(|tag| tag.post_count > 0)
            .collect();
        counts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(counts)
    }

    async fn tag_exists(
        &self,
        blog_id: i64,
        name: &str,
        visibility: Visibility,
    ) -> Result<bool, RepoError> {
        let state = self.lock();
        let Some(tag_id) = state
            .tags
            .iter()
            .find(|(blog, tag)| *blog == blog_id && tag.name == name)
            .map(|(_, tag)| tag.id)
        else {
            return Ok(false);
        };
        if visibility == Visibility::All {
            return Ok(true);
        }
        Ok(state
            .post_tags
            .iter()
            .filter(|(_, tag)| *tag == tag_id)
            .any(|(post_id, _)| {
                state
                    .posts
                    .iter()
                    .any(|p| p.id == *post_id && visibility.admits(p.published))
            }))
    }
}

#[async_trait]
impl PagesRepo for MemoryStore {
    async fn list_pages(
        &self,
        blog_id: i64,
        visibility: Visibility,
        page: PageRequest,
    ) -> Result<Page<PageRecord>, RepoError> {
        let state = self.lock();
        let mut pages: Vec<PageRecord> = state
            .pages
            .iter()
            .filter(|p| p.blog_id == blog_id && visibility.admits(p.published))
            .cloned()
            .collect();
        pages.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(paginate(pages, page))
    }

    async fn list_page_links(
        &self,
        blog_id: i64,
        visibility: Visibility,
    ) -> Result<Vec<PageRecord>, RepoError> {
        let state = self.lock();
        let mut pages: Vec<PageRecord> = state
            .pages
            .iter()
            .filter(|p| p.blog_id == blog_id && visibility.admits(p.published))
            .cloned()
            .collect();
        pages.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(pages)
    }

    async fn find_page_by_slug(
        &self,
        blog_id: i64,
        slug: &str,
        visibility: Visibility,
    ) -> Result<Option<PageRecord>, RepoError> {
        Ok(self
            .lock()
            .pages
            .iter()
            .find(|p| p.blog_id == blog_id && p.slug == slug && visibility.admits(p.published))
            .cloned())
    }

    async fn find_page_by_id(
        &self,
        blog_id: i64,
        id: i64,
    ) -> Result<Option<PageRecord>, RepoError> {
        Ok(self
            .lock()
            .pages
            .iter()
            .find(|p| p.blog_id == blog_id && p.id == id)
            .cloned())
    }

    async fn page_slug_exists(
        &self,
        blog_id: i64,
        slug: &str,
        exclude: Option<i64>,
    ) -> Result<bool, RepoError> {
        Ok(self.lock().page_slug_taken(blog_id, slug, exclude))
    }

    async fn count_pages(&self, blog_id: i64) -> Result<u64, RepoError> {
        Ok(self.lock().pages.iter().filter(|p| p.blog_id == blog_id).count() as u64)
    }
}

#[async_trait]
impl PagesWriteRepo for MemoryStore {
    async fn create_page(&self, blog_id: i64, write: PageWrite) -> Result<PageRecord, RepoError> {
        let mut state = self.lock();
        if state.page_slug_taken(blog_id, &write.slug, None) {
            return Err(slug_conflict("pages_blog_slug_key"));
        }
        let page = PageRecord {
            id: state.id(),
            blog_id,
            title: write.title,
            slug: write.slug,
            content: write.content,
            published: write.published,
            created_at: state.now(),
        };
        state.pages.push(page.clone());
        Ok(page)
    }

    async fn update_page(
        &self,
        blog_id: i64,
        id: i64,
        write: PageWrite,
    ) -> Result<PageRecord, RepoError> {
        let mut state = self.lock();
        if state.page_slug_taken(blog_id, &write.slug, Some(id)) {
            return Err(slug_conflict("pages_blog_slug_key"));
        }
        let page = state
            .pages
            .iter_mut()
            .find(|p| p.blog_id == blog_id && p.id == id)
            .ok_or(RepoError::NotFound)?;
        page.title = write.title;
        page.slug = write.slug;
        page.content = write.content;
        page.published = write.published;
        Ok(page.clone())
    }

    async fn delete_pages(&self, blog_id: i64, ids: &[i64]) -> Result<u64, RepoError> {
        let mut state = self.lock();
        let before = state.pages.len();
        state
            .pages
            .retain(|p| !(p.blog_id == blog_id && ids.contains(&p.id)));
        Ok((before - state.pages.len()) as u64)
    }
}

#[async_trait]
impl CommentsRepo for MemoryStore {
    async fn list_comments_for_post(
        &self,
        post_id: i64,
    ) -> Result<Vec<CommentRecord>, RepoError> {
        let state = self.lock();
        let mut comments: Vec<CommentRecord> = state
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(comments)
    }

    async fn list_recent_comments(
        &self,
        blog_id: i64,
        page: PageRequest,
    ) -> Result<Page<CommentWithPost>, RepoError> {
        let state = self.lock();
        let mut comments: Vec<CommentWithPost> = state
            .comments
            .iter()
            .filter(|c| c.blog_id == blog_id)
            .filter_map(|c| {
                state
                    .posts
                    .iter()
                    .find(|p| p.id == c.post_id)
                    .map(|post| CommentWithPost {
                        comment: c.clone(),
                        post_title: post.title.clone(),
                        post_slug: post.slug.clone(),
                    })
            })
            .collect();
        comments.sort_by(|a, b| {
            b.comment
                .created_at
                .cmp(&a.comment.created_at)
                .then(b.comment.id.cmp(&a.comment.id))
        });
        Ok(paginate(comments, page))
    }

    async fn create_comment(
        &self,
        blog_id: i64,
        comment: NewComment,
    ) -> Result<CommentRecord, RepoError> {
        let mut state = self.lock();
        if !state
            .posts
            .iter()
            .any(|p| p.id == comment.post_id && p.blog_id == blog_id)
        {
            return Err(RepoError::InvalidInput {
                message: "comment references an unknown post".to_string(),
            });
        }
        let record = CommentRecord {
            id: state.id(),
            blog_id,
            post_id: comment.post_id,
            name: comment.name,
            email: comment.email,
            content: comment.content,
            ip: comment.ip,
            created_at: state.now(),
        };
        state.comments.push(record.clone());
        Ok(record)
    }

    async fn delete_comments(&self, blog_id: i64, ids: &[i64]) -> Result<u64, RepoError> {
        let mut state = self.lock();
        let before = state.comments.len();
        state
            .comments
            .retain(|c| !(c.blog_id == blog_id && ids.contains(&c.id)));
        Ok((before - state.comments.len()) as u64)
    }

    async fn count_comments(&self, blog_id: i64) -> Result<u64, RepoError> {
        Ok(self
            .lock()
            .comments
            .iter()
            .filter(|c| c.blog_id == blog_id)
            .count() as u64)
    }
}

pub const BLOG_NAME: &str = "Charlie blog";

pub async fn seed_blog(store: &Arc<MemoryStore>, password_hash: String) -> BlogRecord {
    let config = BlogConfig::for_new_blog(BLOG_NAME, password_hash);
    store
        .create_blog(BLOG_NAME, &config)
        .await
        .expect("create blog")
}

pub fn post_draft(title: &str, content: &str, tags: &str) -> pblog::domain::forms::PostDraft {
    pblog::domain::forms::PostDraft {
        title: title.to_string(),
        content: content.to_string(),
        tags: tags.to_string(),
        ..pblog::domain::forms::PostDraft::blank()
    }
}

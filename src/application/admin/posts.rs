use std::sync::Arc;

use tracing::info;

use crate::application::admin::{AdminContentError, SaveOutcome, resolve_slug, slug_field_error};
use crate::application::pagination::{Page, PageRequest};
use crate::application::repos::{
    PostFilter, PostWrite, PostsRepo, PostsWriteRepo, RepoError, Visibility,
};
use crate::domain::entities::{BlogRecord, PostListing, PostRecord};
use crate::domain::forms::{MSG_SLUG_TAKEN, PostDraft};
use crate::domain::tags::parse_tag_list;

/// Id used in editor URLs for a post that does not exist yet.
pub const NEW_POST_ID: i64 = 0;

#[derive(Clone)]
pub struct AdminPostService {
    reader: Arc<dyn PostsRepo>,
    writer: Arc<dyn PostsWriteRepo>,
}

impl AdminPostService {
    pub fn new(reader: Arc<dyn PostsRepo>, writer: Arc<dyn PostsWriteRepo>) -> Self {
        Self { reader, writer }
    }

    /// Every post, published or not, newest first.
    pub async fn list(
        &self,
        blog: &BlogRecord,
        page_number: i64,
    ) -> Result<Page<PostListing>, RepoError> {
        self.reader
            .list_posts(
                blog.id,
                Visibility::All,
                &PostFilter::Everything,
                PageRequest::new(page_number, blog.config.max_post),
            )
            .await
    }

    pub async fn find(
        &self,
        blog: &BlogRecord,
        id: i64,
    ) -> Result<Option<PostListing>, RepoError> {
        if id == NEW_POST_ID {
            return Ok(None);
        }
        self.reader.find_post_by_id(blog.id, id).await
    }

    /// Validate and write the draft. `id == NEW_POST_ID` creates a post.
    pub async fn save(
        &self,
        blog: &BlogRecord,
        id: i64,
        draft: &PostDraft,
    ) -> Result<SaveOutcome<PostRecord>, AdminContentError> {
        let is_new = id == NEW_POST_ID;
        if !is_new && self.reader.find_post_by_id(blog.id, id).await?.is_none() {
            return Err(AdminContentError::NotFound);
        }

        let errors = draft.validate();
        if !errors.is_empty() {
            return Ok(SaveOutcome::Invalid(errors));
        }

        let blog_id = blog.id;
        let exclude = (!is_new).then_some(id);
        let reader = Arc::clone(&self.reader);
        let slug = resolve_slug(&draft.title, &draft.slug, move |candidate| {
            let reader = Arc::clone(&reader);
            async move { reader.post_slug_exists(blog_id, &candidate, exclude).await }
        })
        .await?;
        let slug = match slug {
            Ok(slug) => slug,
            Err(errors) => return Ok(SaveOutcome::Invalid(errors)),
        };

        let write = PostWrite {
            title: draft.title.trim().to_string(),
            slug,
            content: draft.content.clone(),
            published: draft.published,
            comments_allowed: draft.comments_allowed,
            tags: parse_tag_list(&draft.tags),
        };

        let result = if is_new {
            self.writer.create_post(blog_id, write).await
        } else {
            self.writer.update_post(blog_id, id, write).await
        };

        match result {
            Ok(post) => {
                info!(
                    target = "pblog::application::admin::posts",
                    post_id = post.id,
                    slug = %post.slug,
                    created = is_new,
                    "post saved"
                );
                Ok(if is_new {
                    SaveOutcome::Created(post)
                } else {
                    SaveOutcome::Updated(post)
                })
            }
            Err(err) if err.is_slug_conflict() => {
                Ok(SaveOutcome::Invalid(slug_field_error(MSG_SLUG_TAKEN)))
            }
            Err(RepoError::NotFound) => Err(AdminContentError::NotFound),
            Err(err) => Err(err.into()),
        }
    }

    /// Delete the given posts with their comments; returns how many were removed.
    pub async fn delete(&self, blog: &BlogRecord, ids: &[i64]) -> Result<u64, RepoError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let removed = self.writer.delete_posts(blog.id, ids).await?;
        info!(
            target = "pblog::application::admin::posts",
            requested = ids.len(),
            removed,
            "posts deleted"
        );
        Ok(removed)
    }
}

use std::sync::Arc;

use tracing::info;

use crate::application::admin::{AdminContentError, SaveOutcome, resolve_slug, slug_field_error};
use crate::application::pagination::{Page, PageRequest};
use crate::application::repos::{PageWrite, PagesRepo, PagesWriteRepo, RepoError, Visibility};
use crate::domain::entities::{BlogRecord, PageRecord};
use crate::domain::forms::{MSG_SLUG_TAKEN, PageDraft};

pub const NEW_PAGE_ID: i64 = 0;

#[derive(Clone)]
pub struct AdminPageService {
    reader: Arc<dyn PagesRepo>,
    writer: Arc<dyn PagesWriteRepo>,
}

impl AdminPageService {
    pub fn new(reader: Arc<dyn PagesRepo>, writer: Arc<dyn PagesWriteRepo>) -> Self {
        Self { reader, writer }
    }

    pub async fn list(
        &self,
        blog: &BlogRecord,
        page_number: i64,
    ) -> Result<Page<PageRecord>, RepoError> {
        self.reader
            .list_pages(
                blog.id,
                Visibility::All,
                PageRequest::new(page_number, blog.config.max_post),
            )
            .await
    }

    pub async fn find(&self, blog: &BlogRecord, id: i64) -> Result<Option<PageRecord>, RepoError> {
        if id == NEW_PAGE_ID {
            return Ok(None);
        }
        self.reader.find_page_by_id(blog.id, id).await
    }

    pub async fn save(
        &self,
        blog: &BlogRecord,
        id: i64,
        draft: &PageDraft,
    ) -> Result<SaveOutcome<PageRecord>, AdminContentError> {
        let is_new = id == NEW_PAGE_ID;
        if !is_new && self.reader.find_page_by_id(blog.id, id).await?.is_none() {
            return Err(AdminContentError::NotFound);
        }

        let errors = draft.validate();
        if !errors.is_empty() {
            return Ok(SaveOutcome::Invalid(errors));
        }

        let blog_id = blog.id;
        let exclude = (!is_new).then_some(id);
        let reader = Arc::clone(&self.reader);
        let slug = match resolve_slug(&draft.title, &draft.slug, move |candidate| {
            let reader = Arc::clone(&reader);
            async move { reader.page_slug_exists(blog_id, &candidate, exclude).await }
        })
        .await?
        {
            Ok(slug) => slug,
            Err(errors) => return Ok(SaveOutcome::Invalid(errors)),
        };

        let write = PageWrite {
            title: draft.title.trim().to_string(),
            slug,
            content: draft.content.clone(),
            published: draft.published,
        };

        let result = if is_new {
            self.writer.create_page(blog_id, write).await
        } else {
            self.writer.update_page(blog_id, id, write).await
        };

        match result {
            Ok(page) => {
                info!(
                    target = "pblog::application::admin::pages",
                    page_id = page.id,
                    slug = %page.slug,
                    created = is_new,
                    "page saved"
                );
                Ok(if is_new {
                    SaveOutcome::Created(page)
                } else {
                    SaveOutcome::Updated(page)
                })
            }
            Err(err) if err.is_slug_conflict() => {
                Ok(SaveOutcome::Invalid(slug_field_error(MSG_SLUG_TAKEN)))
            }
            Err(RepoError::NotFound) => Err(AdminContentError::NotFound),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn delete(&self, blog: &BlogRecord, ids: &[i64]) -> Result<u64, RepoError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let removed = self.writer.delete_pages(blog.id, ids).await?;
        info!(
            target = "pblog::application::admin::pages",
            requested = ids.len(),
            removed,
            "pages deleted"
        );
        Ok(removed)
    }
}

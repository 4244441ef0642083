//! Application services for the administrative surface.

pub mod comments;
pub mod dashboard;
pub mod pages;
pub mod posts;
pub mod settings;

use thiserror::Error;

use crate::application::repos::RepoError;
use crate::domain::forms::{FieldErrors, MSG_SLUG_TAKEN, MSG_SLUG_UNUSABLE};
use crate::domain::slug::{SlugAsyncError, SlugError, derive_slug, generate_unique_slug_async};

#[derive(Debug, Error)]
pub enum AdminContentError {
    #[error("content not found")]
    NotFound,
    #[error(transparent)]
    Slug(#[from] SlugError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Result of saving an editor form.
#[derive(Debug)]
pub enum SaveOutcome<T> {
    /// Nothing was written; redisplay the form with these errors.
    Invalid(FieldErrors),
    Created(T),
    Updated(T),
}

/// Settle the slug for a post or page being saved.
///
/// An explicit slug is normalised and must be free; an empty one is generated
/// from the title with random-digit collision suffixes. `is_taken` reports
/// whether another entry of the same kind already uses a candidate.
pub(crate) async fn resolve_slug<F, Fut>(
    title: &str,
    explicit: &str,
    mut is_taken: F,
) -> Result<Result<String, FieldErrors>, AdminContentError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<bool, RepoError>>,
{
    if !explicit.trim().is_empty() {
        let Ok(slug) = derive_slug(explicit) else {
            return Ok(Err(slug_field_error(MSG_SLUG_UNUSABLE)));
        };
        if is_taken(slug.clone()).await? {
            return Ok(Err(slug_field_error(MSG_SLUG_TAKEN)));
        }
        return Ok(Ok(slug));
    }

    let generated = generate_unique_slug_async(title, |candidate| {
        let taken = is_taken(candidate);
        async move { taken.await.map(|taken| !taken) }
    })
    .await;

    match generated {
        Ok(slug) => Ok(Ok(slug)),
        Err(SlugAsyncError::Slug(SlugError::EmptyInput | SlugError::Unrepresentable { .. })) => {
            Ok(Err(slug_field_error(MSG_SLUG_UNUSABLE)))
        }
        Err(SlugAsyncError::Slug(err)) => Err(AdminContentError::Slug(err)),
        Err(SlugAsyncError::Predicate(err)) => Err(AdminContentError::Repo(err)),
    }
}

pub(crate) fn slug_field_error(message: &'static str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.insert("slug", message);
    errors
}

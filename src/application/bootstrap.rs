use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::application::auth::{AuthError, hash_password};
use crate::application::repos::{BlogsRepo, RepoError};
use crate::domain::blog_config::BlogConfig;
use crate::domain::entities::BlogRecord;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

#[derive(Debug)]
pub enum BootstrapOutcome {
    Created(BlogRecord),
    AlreadyExists(BlogRecord),
}

/// Create the named blog with a default configuration unless it already exists.
pub async fn create_blog(
    blogs: Arc<dyn BlogsRepo>,
    name: &str,
    password: &str,
) -> Result<BootstrapOutcome, BootstrapError> {
    if let Some(existing) = blogs.find_blog_by_name(name).await? {
        info!(
            target = "pblog::application::bootstrap",
            blog_id = existing.id,
            name,
            "blog already exists; leaving it untouched"
        );
        return Ok(BootstrapOutcome::AlreadyExists(existing));
    }

    let config = BlogConfig::for_new_blog(name, hash_password(password)?);
    let blog = blogs.create_blog(name, &config).await?;
    info!(
        target = "pblog::application::bootstrap",
        blog_id = blog.id,
        name,
        "blog created"
    );
    Ok(BootstrapOutcome::Created(blog))
}

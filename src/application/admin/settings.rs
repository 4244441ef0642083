use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::application::auth::{AuthError, hash_password};
use crate::application::repos::{BlogsRepo, RepoError};
use crate::domain::blog_config::{BlogConfig, SettingsForm, bind_settings_form};
use crate::domain::entities::BlogRecord;
use crate::domain::forms::FieldErrors;

#[derive(Debug, Error)]
pub enum AdminSettingsError {
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

#[derive(Debug)]
pub enum SettingsOutcome {
    Invalid(FieldErrors),
    Saved(BlogConfig),
}

#[derive(Clone)]
pub struct AdminSettingsService {
    blogs: Arc<dyn BlogsRepo>,
}

impl AdminSettingsService {
    pub fn new(blogs: Arc<dyn BlogsRepo>) -> Self {
        Self { blogs }
    }

    /// Bind the form against the stored settings and persist the result.
    ///
    /// A non-empty password field replaces the stored hash; otherwise the
    /// previous hash is kept.
    pub async fn update(
        &self,
        blog: &BlogRecord,
        form: &SettingsForm,
    ) -> Result<SettingsOutcome, AdminSettingsError> {
        let update = match bind_settings_form(&blog.config, form) {
            Ok(update) => update,
            Err(errors) => return Ok(SettingsOutcome::Invalid(errors)),
        };

        let mut config = update.config;
        let password_changed = update.new_password.is_some();
        if let Some(password) = update.new_password {
            config.password_hash = hash_password(&password)?;
        }

        self.blogs.update_blog_config(blog.id, &config).await?;

        info!(
            target = "pblog::application::admin::settings",
            blog_id = blog.id,
            password_changed,
            "settings updated"
        );

        Ok(SettingsOutcome::Saved(config))
    }
}

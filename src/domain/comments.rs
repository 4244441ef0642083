//! Reader comment validation.

use serde::Deserialize;

use crate::domain::blog_config::EmailPolicy;
use crate::domain::forms::{FieldErrors, MSG_INVALID_EMAIL, MSG_REQUIRED};

/// Comment form as typed by a reader; never persisted directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CommentDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub content: String,
}

/// A comment that passed validation and is ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidComment {
    pub name: String,
    pub email: Option<String>,
    pub content: String,
}

impl CommentDraft {
    /// Check the draft against the blog's email policy.
    ///
    /// Under [`EmailPolicy::Disabled`] any submitted address is discarded.
    pub fn validate(&self, policy: EmailPolicy) -> Result<ValidComment, FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require("name", &self.name);
        errors.require("content", &self.content);

        let email = self.email.trim();
        match policy {
            EmailPolicy::Disabled => {}
            EmailPolicy::Required if email.is_empty() => errors.insert("email", MSG_REQUIRED),
            EmailPolicy::Required | EmailPolicy::Optional => {
                if !email.is_empty() && !is_plausible_email(email) {
                    errors.insert("email", MSG_INVALID_EMAIL);
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let email = (policy != EmailPolicy::Disabled && !email.is_empty())
            .then(|| email.to_string());

        Ok(ValidComment {
            name: self.name.trim().to_string(),
            email,
            content: self.content.trim().to_string(),
        })
    }
}

/// Loose `local@domain` check: some text, an `@`, some more text.
pub fn is_plausible_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty(),
        None => false,
    }
}

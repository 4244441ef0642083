//! Form drafts for admin-edited content and the field error map they produce.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::domain::entities::{PageRecord, PostListing};
use crate::domain::tags::join_tag_list;

pub const MSG_REQUIRED: &str = "Cannot be empty";
pub const MSG_INVALID_EMAIL: &str = "Not a valid email address";
pub const MSG_SLUG_TAKEN: &str = "Slug already in use";
pub const MSG_SLUG_UNUSABLE: &str = "Cannot build a URL from this value";

/// Field name → message map returned with a form that failed validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    pub fn require(&mut self, field: &'static str, value: &str) {
        if value.trim().is_empty() {
            self.insert(field, MSG_REQUIRED);
        }
    }
}

fn checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(matches!(
        value.as_deref().map(str::trim),
        Some("on" | "true" | "1" | "yes")
    ))
}

/// Post editor form as submitted by the admin area.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PostDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default, deserialize_with = "checkbox")]
    pub published: bool,
    #[serde(default, deserialize_with = "checkbox")]
    pub comments_allowed: bool,
}

impl PostDraft {
    /// Draft for a post that has not been written yet.
    pub fn blank() -> Self {
        Self {
            published: true,
            comments_allowed: true,
            ..Self::default()
        }
    }

    pub fn from_listing(listing: &PostListing) -> Self {
        Self {
            title: listing.post.title.clone(),
            slug: listing.post.slug.clone(),
            content: listing.post.content.clone(),
            tags: join_tag_list(&listing.tags),
            published: listing.post.published,
            comments_allowed: listing.post.comments_allowed,
        }
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.require("title", &self.title);
        errors.require("content", &self.content);
        errors
    }
}

/// Page editor form as submitted by the admin area.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PageDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, deserialize_with = "checkbox")]
    pub published: bool,
}

impl PageDraft {
    pub fn blank() -> Self {
        Self {
            published: true,
            ..Self::default()
        }
    }

    pub fn from_record(page: &PageRecord) -> Self {
        Self {
            title: page.title.clone(),
            slug: page.slug.clone(),
            content: page.content.clone(),
            published: page.published,
        }
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.require("title", &self.title);
        errors.require("content", &self.content);
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_draft_requires_title_and_content() {
        let errors = PostDraft::blank().validate();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("title"), Some(MSG_REQUIRED));
        assert_eq!(errors.get("content"), Some(MSG_REQUIRED));
    }

    #[test]
    fn whitespace_only_counts_as_empty() {
        let draft = PageDraft {
            title: "   ".into(),
            content: "body".into(),
            ..PageDraft::blank()
        };
        let errors = draft.validate();
        assert!(errors.contains("title"));
        assert!(!errors.contains("content"));
    }

    #[test]
    fn complete_draft_has_no_errors() {
        let draft = PostDraft {
            title: "Hello".into(),
            content: "World".into(),
            ..PostDraft::blank()
        };
        assert!(draft.validate().is_empty());
    }
}

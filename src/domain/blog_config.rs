//! Per-blog settings document and binding of the admin settings form.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::forms::{FieldErrors, MSG_REQUIRED};

pub const DEFAULT_THEME: &str = "ouverta";
pub const DEFAULT_MEDIA_URL: &str = "/static/";
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Whether readers are asked for an email address when commenting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailPolicy {
    Disabled,
    #[default]
    Optional,
    Required,
}

impl EmailPolicy {
    pub const ALL: [EmailPolicy; 3] = [Self::Disabled, Self::Optional, Self::Required];

    /// Numeric form code used by the settings form.
    pub fn code(self) -> &'static str {
        match self {
            Self::Disabled => "0",
            Self::Optional => "1",
            Self::Required => "2",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|policy| policy.code() == code)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Disabled => "Disabled",
            Self::Optional => "Optional",
            Self::Required => "Required",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "")]
    Unset,
    #[serde(rename = "en_US")]
    EnUs,
    #[serde(rename = "fr_FR")]
    FrFr,
    #[serde(rename = "ja_JP")]
    JaJp,
}

impl Locale {
    pub const ALL: [Locale; 4] = [Self::Unset, Self::EnUs, Self::FrFr, Self::JaJp];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unset => "",
            Self::EnUs => "en_US",
            Self::FrFr => "fr_FR",
            Self::JaJp => "ja_JP",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|locale| locale.as_str() == value)
    }

    /// BCP 47 language tag for the `lang` attribute of rendered pages.
    pub fn html_lang(self) -> &'static str {
        match self {
            Self::Unset | Self::EnUs => "en",
            Self::FrFr => "fr",
            Self::JaJp => "ja",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub label: String,
    pub url: String,
}

/// Settings stored as a JSON document on the blog row.
///
/// Missing keys deserialize to their defaults so older documents keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogConfig {
    pub title: String,
    pub theme: String,
    pub password_hash: String,
    pub media_url: String,
    pub lang: Locale,
    pub max_post: u32,
    pub max_feed: u32,
    pub max_comment: u32,
    pub email: EmailPolicy,
    pub links: Vec<Link>,
    pub top_links: Vec<Link>,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            theme: DEFAULT_THEME.to_string(),
            password_hash: String::new(),
            media_url: DEFAULT_MEDIA_URL.to_string(),
            lang: Locale::Unset,
            max_post: DEFAULT_PAGE_SIZE,
            max_feed: DEFAULT_PAGE_SIZE,
            max_comment: DEFAULT_PAGE_SIZE,
            email: EmailPolicy::Optional,
            links: Vec::new(),
            top_links: Vec::new(),
        }
    }
}

impl BlogConfig {
    /// Initial configuration written when a blog is bootstrapped.
    pub fn for_new_blog(name: &str, password_hash: String) -> Self {
        Self {
            title: name.to_string(),
            password_hash,
            ..Self::default()
        }
    }

    /// Base URL of the active theme's assets.
    pub fn theme_url(&self) -> String {
        format!("{}{}", self.media_url, self.theme)
    }
}

/// Raw settings form, one string per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SettingsForm {
    pub title: String,
    pub theme: String,
    pub media_url: String,
    pub lang: String,
    pub max_post: String,
    pub max_feed: String,
    pub max_comment: String,
    pub email: String,
    pub password: String,
    pub links: String,
    pub top_links: String,
}

impl SettingsForm {
    /// Prefill the form from stored settings. The password is never echoed.
    pub fn from_config(config: &BlogConfig) -> Self {
        Self {
            title: config.title.clone(),
            theme: config.theme.clone(),
            media_url: config.media_url.clone(),
            lang: config.lang.as_str().to_string(),
            max_post: config.max_post.to_string(),
            max_feed: config.max_feed.to_string(),
            max_comment: config.max_comment.to_string(),
            email: config.email.code().to_string(),
            password: String::new(),
            links: format_links(&config.links),
            top_links: format_links(&config.top_links),
        }
    }
}

/// Result of a successful settings form binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsUpdate {
    /// New settings; `password_hash` still holds the previous hash.
    pub config: BlogConfig,
    /// Plain-text replacement password, when one was entered.
    pub new_password: Option<String>,
}

/// Bind every settings field explicitly, collecting per-field errors.
pub fn bind_settings_form(
    current: &BlogConfig,
    form: &SettingsForm,
) -> Result<SettingsUpdate, FieldErrors> {
    let mut errors = FieldErrors::new();

    let title = bind_required(&mut errors, "title", &form.title);
    let theme = bind_required(&mut errors, "theme", &form.theme);
    let media_url = bind_required(&mut errors, "media_url", &form.media_url);
    let lang = bind_locale(&mut errors, &form.lang);
    let max_post = bind_count(&mut errors, "max_post", &form.max_post);
    let max_feed = bind_count(&mut errors, "max_feed", &form.max_feed);
    let max_comment = bind_count(&mut errors, "max_comment", &form.max_comment);
    let email = bind_email_policy(&mut errors, &form.email);
    let links = bind_links(&mut errors, "links", &form.links);
    let top_links = bind_links(&mut errors, "top_links", &form.top_links);

    if !errors.is_empty() {
        return Err(errors);
    }

    let new_password = (!form.password.is_empty()).then(|| form.password.clone());

    Ok(SettingsUpdate {
        config: BlogConfig {
            title,
            theme,
            password_hash: current.password_hash.clone(),
            media_url,
            lang,
            max_post,
            max_feed,
            max_comment,
            email,
            links,
            top_links,
        },
        new_password,
    })
}

fn bind_required(errors: &mut FieldErrors, field: &'static str, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.insert(field, MSG_REQUIRED);
    }
    trimmed.to_string()
}

fn bind_locale(errors: &mut FieldErrors, value: &str) -> Locale {
    Locale::parse(value.trim()).unwrap_or_else(|| {
        errors.insert("lang", "Unknown language");
        Locale::Unset
    })
}

fn bind_count(errors: &mut FieldErrors, field: &'static str, value: &str) -> u32 {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        errors.insert(field, "Must be a whole number");
        return DEFAULT_PAGE_SIZE;
    }
    match trimmed.parse::<u32>() {
        Ok(0) => {
            errors.insert(field, "Must be at least 1");
            DEFAULT_PAGE_SIZE
        }
        Ok(count) => count,
        Err(_) => {
            errors.insert(field, "Number is too large");
            DEFAULT_PAGE_SIZE
        }
    }
}

fn bind_email_policy(errors: &mut FieldErrors, value: &str) -> EmailPolicy {
    EmailPolicy::from_code(value.trim()).unwrap_or_else(|| {
        errors.insert("email", "Unknown email policy");
        EmailPolicy::default()
    })
}

/// Parse `label | url` lines. Blank lines are skipped.
fn bind_links(errors: &mut FieldErrors, field: &'static str, value: &str) -> Vec<Link> {
    let mut links = Vec::new();

    for (index, line) in value.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some((label, url)) = line.split_once('|') else {
            errors.insert(field, format!("Line {}: expected `label | url`", index + 1));
            continue;
        };
        let (label, url) = (label.trim(), url.trim());

        if label.is_empty() || !is_acceptable_link(url) {
            errors.insert(field, format!("Line {}: invalid link", index + 1));
            continue;
        }

        links.push(Link {
            label: label.to_string(),
            url: url.to_string(),
        });
    }

    links
}

fn is_acceptable_link(url: &str) -> bool {
    if url.starts_with('/') && !url.starts_with("//") {
        return true;
    }
    Url::parse(url)
        .map(|parsed| matches!(parsed.scheme(), "http" | "https" | "mailto"))
        .unwrap_or(false)
}

fn format_links(links: &[Link]) -> String {
    links
        .iter()
        .map(|link| format!("{} | {}", link.label, link.url))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> SettingsForm {
        SettingsForm::from_config(&BlogConfig::for_new_blog("Charlie blog", "hash".into()))
    }

    #[test]
    fn defaults_match_a_fresh_blog() {
        let config = BlogConfig::for_new_blog("Charlie blog", "hash".into());
        assert_eq!(config.title, "Charlie blog");
        assert_eq!(config.theme, "ouverta");
        assert_eq!(config.media_url, "/static/");
        assert_eq!(config.max_post, 10);
        assert_eq!(config.email, EmailPolicy::Optional);
        assert_eq!(config.theme_url(), "/static/ouverta");
    }

    #[test]
    fn stored_document_with_missing_keys_uses_defaults() {
        let config: BlogConfig =
            serde_json::from_str(r#"{"title":"Old","email":"required"}"#).expect("parse");
        assert_eq!(config.title, "Old");
        assert_eq!(config.email, EmailPolicy::Required);
        assert_eq!(config.max_feed, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn binding_unchanged_form_keeps_config_and_hash() {
        let current = BlogConfig::for_new_blog("Charlie blog", "hash".into());
        let update = bind_settings_form(&current, &filled_form()).expect("valid");
        assert_eq!(update.config, current);
        assert_eq!(update.new_password, None);
    }

    #[test]
    fn binding_reports_each_bad_field() {
        let current = BlogConfig::default();
        let form = SettingsForm {
            title: " ".into(),
            max_post: "ten".into(),
            max_feed: "0".into(),
            email: "7".into(),
            lang: "de_DE".into(),
            ..filled_form()
        };

        let errors = bind_settings_form(&current, &form).expect_err("invalid");
        for field in ["title", "max_post", "max_feed", "email", "lang"] {
            assert!(errors.contains(field), "missing error for {field}");
        }
        assert!(!errors.contains("max_comment"));
    }

    #[test]
    fn binding_parses_links_and_password() {
        let current = BlogConfig::default();
        let form = SettingsForm {
            password: "s3cret".into(),
            links: "Rust | https://www.rust-lang.org\n\nAbout | /page/about".into(),
            email: "2".into(),
            lang: "fr_FR".into(),
            ..filled_form()
        };

        let update = bind_settings_form(&current, &form).expect("valid");
        assert_eq!(update.new_password.as_deref(), Some("s3cret"));
        assert_eq!(update.config.email, EmailPolicy::Required);
        assert_eq!(update.config.lang, Locale::FrFr);
        assert_eq!(
            update.config.links,
            vec![
                Link {
                    label: "Rust".into(),
                    url: "https://www.rust-lang.org".into()
                },
                Link {
                    label: "About".into(),
                    url: "/page/about".into()
                },
            ]
        );
    }

    #[test]
    fn binding_rejects_unsafe_links() {
        let form = SettingsForm {
            top_links: "Bad | javascript:alert(1)".into(),
            ..filled_form()
        };
        let errors = bind_settings_form(&BlogConfig::default(), &form).expect_err("invalid");
        assert!(errors.contains("top_links"));
    }
}

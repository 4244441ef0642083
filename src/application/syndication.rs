//! RSS 2.0 and Atom feeds of the newest published posts.

use std::sync::Arc;

use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::{Rfc2822, Rfc3339};

use crate::application::markdown::{MarkdownRenderer, RenderError, RenderTarget};
use crate::application::pagination::PageRequest;
use crate::application::repos::{PostFilter, PostsRepo, RepoError, TagsRepo, Visibility};
use crate::domain::entities::{BlogRecord, PostListing};
use crate::presentation::views::{encode_segment, post_href};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Atom,
    Rss2,
}

impl FeedKind {
    /// Path segment form: `atom` or `rss2`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "atom" => Some(Self::Atom),
            "rss2" => Some(Self::Rss2),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Atom => "atom",
            Self::Rss2 => "rss2",
        }
    }
}

#[derive(Debug, Error)]
pub enum SyndicationError {
    #[error("failed to list posts: {0}")]
    Posts(#[from] RepoError),
    #[error("failed to render feed entry: {0}")]
    Render(#[from] RenderError),
}

#[derive(Clone)]
pub struct SyndicationService {
    posts: Arc<dyn PostsRepo>,
    tags: Arc<dyn TagsRepo>,
    renderer: Arc<MarkdownRenderer>,
}

struct FeedEntry {
    title: String,
    link: String,
    published: OffsetDateTime,
    content_html: String,
}

impl SyndicationService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        tags: Arc<dyn TagsRepo>,
        renderer: Arc<MarkdownRenderer>,
    ) -> Self {
        Self {
            posts,
            tags,
            renderer,
        }
    }

    /// Feed XML for the whole blog, or for one tag. `None` when the tag is unknown.
    ///
    /// `base_url` is the absolute site root used to build entry links.
    pub async fn feed(
        &self,
        blog: &BlogRecord,
        kind: FeedKind,
        tag: Option<&str>,
        base_url: &str,
    ) -> Result<Option<String>, SyndicationError> {
        let filter = match tag {
            Some(name) => {
                if !self
                    .tags
                    .tag_exists(blog.id, name, Visibility::Published)
                    .await?
                {
                    return Ok(None);
                }
                PostFilter::Tag(name.to_string())
            }
            None => PostFilter::Everything,
        };

        let page = self
            .posts
            .list_posts(
                blog.id,
                Visibility::Published,
                &filter,
                PageRequest::first(blog.config.max_feed),
            )
            .await?;

        let base = normalize_base_url(base_url);
        let mut entries = Vec::with_capacity(page.items.len());
        for listing in &page.items {
            entries.push(self.entry(&base, listing)?);
        }

        let title = match tag {
            Some(name) => format!("{} · {name}", blog.config.title),
            None => blog.config.title.clone(),
        };
        let self_path = match tag {
            Some(name) => format!("feed/tag/{}/{}", encode_segment(name), kind.as_str()),
            None => format!("feed/{}", kind.as_str()),
        };

        let xml = match kind {
            FeedKind::Rss2 => rss_document(&title, &base, &entries),
            FeedKind::Atom => atom_document(&title, &base, &self_path, &entries),
        };
        Ok(Some(xml))
    }

    fn entry(&self, base: &str, listing: &PostListing) -> Result<FeedEntry, SyndicationError> {
        let post = &listing.post;
        let content_html = self.renderer.render(RenderTarget::Post, &post.content)?;
        Ok(FeedEntry {
            title: post.title.clone(),
            link: format!("{base}{}", post_href(&post.slug).trim_start_matches('/')),
            published: post.created_at,
            content_html,
        })
    }
}

fn rss_document(title: &str, base: &str, entries: &[FeedEntry]) -> String {
    let mut items = String::new();
    for entry in entries {
        let pub_date = entry
            .published
            .format(&Rfc2822)
            .unwrap_or_else(|_| entry.published.to_string());
        items.push_str(&format!(
            "    <item>\n      <title>{}</title>\n      <link>{}</link>\n      <guid>{}</guid>\n      <pubDate>{}</pubDate>\n      <description>{}</description>\n    </item>\n",
            xml_escape(&entry.title),
            xml_escape(&entry.link),
            xml_escape(&entry.link),
            pub_date,
            cdata(&entry.content_html),
        ));
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rss version=\"2.0\">\n  <channel>\n    <title>{}</title>\n    <link>{}</link>\n    <description>{}</description>\n{}  </channel>\n</rss>\n",
        xml_escape(title),
        xml_escape(base),
        xml_escape(title),
        items
    )
}

fn atom_document(title: &str, base: &str, self_path: &str, entries: &[FeedEntry]) -> String {
    let updated = entries
        .iter()
        .map(|entry| entry.published)
        .max()
        .unwrap_or_else(OffsetDateTime::now_utc);

    let mut items = String::new();
    for entry in entries {
        items.push_str(&format!(
            "  <entry>\n    <title>{}</title>\n    <link href=\"{}\"/>\n    <id>{}</id>\n    <updated>{}</updated>\n    <content type=\"html\">{}</content>\n  </entry>\n",
            xml_escape(&entry.title),
            xml_escape(&entry.link),
            xml_escape(&entry.link),
            rfc3339(entry.published),
            cdata(&entry.content_html),
        ));
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<feed xmlns=\"http://www.w3.org/2005/Atom\">\n  <title>{}</title>\n  <id>{}</id>\n  <updated>{}</updated>\n  <link href=\"{}\"/>\n  <link href=\"{}{}\" rel=\"self\"/>\n{}</feed>\n",
        xml_escape(title),
        xml_escape(base),
        rfc3339(updated),
        xml_escape(base),
        xml_escape(base),
        xml_escape(self_path),
        items
    )
}

fn rfc3339(value: OffsetDateTime) -> String {
    value.format(&Rfc3339).unwrap_or_else(|_| value.to_string())
}

fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    format!("{trimmed}/")
}

/// Wrap `input` in CDATA, splitting any `]]>` it contains.
fn cdata(input: &str) -> String {
    format!("<![CDATA[{}]]>", input.replace("]]>", "]]]]><![CDATA[>"))
}

fn xml_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

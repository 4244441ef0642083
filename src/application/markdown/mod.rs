//! Markdown to sanitised HTML.
//!
//! Comrak parses the document, fenced code blocks are swapped for Syntect
//! highlighted markup, the tree is formatted and the result is cleaned with
//! Ammonia. Comments go through a stricter pipeline: raw HTML is escaped and
//! the sanitizer allows fewer tags.

mod highlight;
mod sanitize;

use std::sync::Arc;

use comrak::{
    Arena, format_html,
    nodes::{AstNode, NodeHtmlBlock, NodeValue},
    options::Options,
    parse_document,
};
use once_cell::sync::Lazy;
use syntect::{html::ClassStyle, parsing::SyntaxSet};
use thiserror::Error;
use tracing::warn;

use sanitize::{build_comment_sanitizer, build_content_sanitizer};

/// Kind of text being rendered; selects the parser options and sanitizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    Post,
    Page,
    Comment,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to format markdown: {message}")]
    Markdown { message: String },
    #[error("failed to highlight `{language}` code: {message}")]
    Highlighting { language: String, message: String },
}

pub struct MarkdownRenderer {
    content_options: Options<'static>,
    comment_options: Options<'static>,
    syntax_set: SyntaxSet,
    class_style: ClassStyle,
    content_sanitizer: ammonia::Builder<'static>,
    comment_sanitizer: ammonia::Builder<'static>,
}

impl MarkdownRenderer {
    fn new() -> Self {
        Self {
            content_options: content_options(),
            comment_options: comment_options(),
            syntax_set: SyntaxSet::load_defaults_newlines(),
            class_style: ClassStyle::SpacedPrefixed { prefix: "hl-" },
            content_sanitizer: build_content_sanitizer(),
            comment_sanitizer: build_comment_sanitizer(),
        }
    }

    pub fn render(&self, target: RenderTarget, markdown: &str) -> Result<String, RenderError> {
        let (options, sanitizer) = match target {
            RenderTarget::Post | RenderTarget::Page => {
                (&self.content_options, &self.content_sanitizer)
            }
            RenderTarget::Comment => (&self.comment_options, &self.comment_sanitizer),
        };

        let arena = Arena::new();
        let root = parse_document(&arena, markdown, options);

        self.highlight_code_blocks(root);

        let mut html = String::new();
        format_html(root, options, &mut html).map_err(|err| RenderError::Markdown {
            message: err.to_string(),
        })?;

        Ok(sanitizer.clean(&html).to_string())
    }

    fn highlight_code_blocks<'a>(&self, root: &'a AstNode<'a>) {
        for node in root.descendants() {
            let Some((info, literal)) = extract_code_block(node) else {
                continue;
            };
            let language = info.split_whitespace().next();

            let html = highlight::highlight_code(
                language,
                &literal,
                &self.syntax_set,
                self.class_style,
            )
            .unwrap_or_else(|err| {
                warn!(
                    target = "pblog::application::markdown",
                    error = %err,
                    "falling back to plain code block"
                );
                highlight::plain_code_block(language, &literal)
            });

            node.data.borrow_mut().value = NodeValue::HtmlBlock(NodeHtmlBlock {
                block_type: 0,
                literal: html,
            });
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

static RENDERER: Lazy<Arc<MarkdownRenderer>> = Lazy::new(|| Arc::new(MarkdownRenderer::new()));

/// Shared renderer instance; syntax definitions are loaded on first use.
pub fn markdown_renderer() -> Arc<MarkdownRenderer> {
    Arc::clone(&RENDERER)
}

fn extract_code_block(node: &AstNode<'_>) -> Option<(String, String)> {
    let data = node.data.borrow();
    if let NodeValue::CodeBlock(block) = &data.value {
        Some((block.info.trim().to_string(), block.literal.clone()))
    } else {
        None
    }
}

fn content_options() -> Options<'static> {
    let mut options = Options::default();
    let ext = &mut options.extension;
    ext.strikethrough = true;
    ext.table = true;
    ext.autolink = true;
    ext.tasklist = true;
    ext.superscript = true;
    ext.footnotes = true;
    options.render.r#unsafe = true;
    options
}

fn comment_options() -> Options<'static> {
    let mut options = Options::default();
    let ext = &mut options.extension;
    ext.strikethrough = true;
    ext.autolink = true;
    options.render.escape = true;
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_tables_and_highlighted_code() {
        let renderer = MarkdownRenderer::default();
        let html = renderer
            .render(
                RenderTarget::Post,
                "| a | b |\n|---|---|\n| 1 | 2 |\n\n```rust\nlet x = 1;\n```\n",
            )
            .expect("rendered");

        assert!(html.contains("<table>"));
        assert!(html.contains("<pre class=\"highlight\"><code class=\"language-rust\">"));
        assert!(html.contains("hl-"));
    }

    #[test]
    fn post_bodies_lose_scripts_but_keep_inline_html() {
        let renderer = MarkdownRenderer::default();
        let html = renderer
            .render(
                RenderTarget::Page,
                "<em>kept</em> <script>alert(1)</script>",
            )
            .expect("rendered");

        assert!(html.contains("<em>kept</em>"));
        assert!(!html.contains("<script"));
    }

    #[test]
    fn comments_escape_raw_html() {
        let renderer = MarkdownRenderer::default();
        let html = renderer
            .render(RenderTarget::Comment, "**bold** <b>raw</b>")
            .expect("rendered");

        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("&lt;b&gt;raw&lt;/b&gt;"));
    }
}

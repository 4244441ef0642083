use std::collections::HashSet;

use ammonia::Builder as AmmoniaBuilder;

/// Sanitizer for author-written post and page bodies.
pub(crate) fn build_content_sanitizer() -> AmmoniaBuilder<'static> {
    let mut builder = base_builder();
    builder.add_tags(&["img", "figure", "figcaption", "input"]);
    builder.add_tag_attributes("img", &["title", "width", "height", "alt", "loading"]);
    builder.add_tag_attributes("input", &["type", "checked", "disabled"]);
    builder
}

/// Stricter sanitizer for reader comments: no images, no heading levels
/// above `h4`.
pub(crate) fn build_comment_sanitizer() -> AmmoniaBuilder<'static> {
    let mut builder = base_builder();
    builder.rm_tags(&["h1", "h2", "h3"]);
    builder.link_rel(Some("nofollow noopener noreferrer"));
    builder
}

fn base_builder() -> AmmoniaBuilder<'static> {
    let mut builder = AmmoniaBuilder::default();

    let tags: HashSet<&'static str> = HashSet::from([
        "a",
        "abbr",
        "blockquote",
        "br",
        "code",
        "del",
        "div",
        "em",
        "h1",
        "h2",
        "h3",
        "h4",
        "h5",
        "h6",
        "hr",
        "i",
        "kbd",
        "li",
        "ol",
        "p",
        "pre",
        "s",
        "span",
        "strong",
        "sub",
        "sup",
        "table",
        "tbody",
        "td",
        "th",
        "thead",
        "tr",
        "ul",
    ]);
    builder.tags(tags);

    let generic: HashSet<&'static str> = HashSet::from(["class", "id", "title", "lang"]);
    builder.generic_attributes(generic);

    builder.add_tag_attributes("th", &["align", "colspan", "rowspan"]);
    builder.add_tag_attributes("td", &["align", "colspan", "rowspan"]);
    builder.add_url_schemes(["http", "https", "mailto"].iter().copied());

    builder
}

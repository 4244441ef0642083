use syntect::{
    html::{ClassStyle, ClassedHTMLGenerator},
    parsing::{SyntaxReference, SyntaxSet},
    util::LinesWithEndings,
};

use super::RenderError;

/// Highlight a fenced code block into `<pre><code>` markup with CSS classes.
pub(crate) fn highlight_code(
    language: Option<&str>,
    code: &str,
    syntax_set: &SyntaxSet,
    class_style: ClassStyle,
) -> Result<String, RenderError> {
    let token = language.unwrap_or("text").to_ascii_lowercase();
    let syntax =
        find_syntax(syntax_set, &token).unwrap_or_else(|| syntax_set.find_syntax_plain_text());

    let mut source = code.to_string();
    if !source.ends_with('\n') {
        source.push('\n');
    }

    let mut generator = ClassedHTMLGenerator::new_with_class_style(syntax, syntax_set, class_style);
    for line in LinesWithEndings::from(source.as_str()) {
        generator
            .parse_html_for_line_which_includes_newline(line)
            .map_err(|err| RenderError::Highlighting {
                language: token.clone(),
                message: err.to_string(),
            })?;
    }

    let language_class = escape_class(&token);
    Ok(format!(
        "<pre class=\"highlight\"><code class=\"language-{language_class}\">{}</code></pre>",
        generator.finalize()
    ))
}

/// Escaped, unhighlighted fallback used when highlighting fails.
pub(crate) fn plain_code_block(language: Option<&str>, code: &str) -> String {
    let language_class = escape_class(&language.unwrap_or("text").to_ascii_lowercase());
    format!(
        "<pre class=\"highlight\"><code class=\"language-{language_class}\">{}</code></pre>",
        ammonia::clean_text(code)
    )
}

fn find_syntax<'a>(syntax_set: &'a SyntaxSet, token: &str) -> Option<&'a SyntaxReference> {
    syntax_set
        .find_syntax_by_token(token)
        .or_else(|| syntax_set.find_syntax_by_name(token))
        .or_else(|| syntax_set.find_syntax_by_extension(token))
}

fn escape_class(token: &str) -> String {
    token
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '+'))
        .collect()
}

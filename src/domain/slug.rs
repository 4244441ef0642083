//! Slug derivation for posts and pages.
//!
//! Titles are transliterated to ASCII (`pinyin` for Han characters, the
//! `slug` crate's own transliteration for everything else), stripped of
//! anything that is not a word character, whitespace or hyphen, and collapsed
//! into lowercase hyphen-separated words. Underscores are word characters and
//! are kept as they are. Uniqueness is delegated to a caller
//! supplied predicate so the derivation itself stays pure.

use std::future::Future;

use pinyin::{Pinyin, ToPinyin};
use rand::Rng;
use slug::slugify;
use thiserror::Error;

/// Upper bound on random-digit retries before giving up on a base slug.
pub const MAX_SUFFIX_ATTEMPTS: usize = 20;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug source text is empty")]
    EmptyInput,
    #[error("failed to derive slug from `{input}`")]
    Unrepresentable { input: String },
    #[error("no unique slug found for `{base}` after {attempts} attempts")]
    Conflict { base: String, attempts: usize },
}

/// Errors produced while resolving a slug against an async uniqueness check.
#[derive(Debug, Error)]
pub enum SlugAsyncError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    #[error(transparent)]
    Slug(#[from] SlugError),
    #[error(transparent)]
    Predicate(E),
}

/// Derive a base slug from the provided human-readable text.
///
/// The result only contains `[a-z0-9_-]`, never starts or ends with a hyphen,
/// and is a fixed point: `derive_slug(derive_slug(x)) == derive_slug(x)`.
pub fn derive_slug(input: &str) -> Result<String, SlugError> {
    if input.trim().is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let stripped = strip_punctuation(input);
    let transliterated = transliterate_to_ascii(&stripped);
    let candidate = join_words(&transliterated);

    if candidate.is_empty() {
        return Err(SlugError::Unrepresentable {
            input: input.to_string(),
        });
    }

    Ok(candidate)
}

/// Produce a slug that does not collide according to the supplied predicate.
///
/// `is_unique` returns `true` when the candidate is free. On collision a
/// random decimal digit is appended (`hello-world-7`, then `hello-world-73`,
/// and so on) until a free candidate is found or the attempts run out.
pub fn generate_unique_slug<F>(input: &str, mut is_unique: F) -> Result<String, SlugError>
where
    F: FnMut(&str) -> bool,
{
    let base = derive_slug(input)?;

    if is_unique(&base) {
        return Ok(base);
    }

    let mut rng = rand::rng();
    let mut candidate = format!("{base}-");
    for _ in 0..MAX_SUFFIX_ATTEMPTS {
        candidate.push(random_digit(&mut rng));
        if is_unique(&candidate) {
            return Ok(candidate);
        }
    }

    Err(SlugError::Conflict {
        base,
        attempts: MAX_SUFFIX_ATTEMPTS,
    })
}

/// Async variant of [`generate_unique_slug`] that awaits the uniqueness predicate.
pub async fn generate_unique_slug_async<F, Fut, E>(
    input: &str,
    mut is_unique: F,
) -> Result<String, SlugAsyncError<E>>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    let base = derive_slug(input)?;

    if is_unique(base.clone())
        .await
        .map_err(SlugAsyncError::Predicate)?
    {
        return Ok(base);
    }

    let mut candidate = format!("{base}-");
    for _ in 0..MAX_SUFFIX_ATTEMPTS {
        // ThreadRng is not Send; draw the digit before awaiting.
        let digit = random_digit(&mut rand::rng());
        candidate.push(digit);
        if is_unique(candidate.clone())
            .await
            .map_err(SlugAsyncError::Predicate)?
        {
            return Ok(candidate);
        }
    }

    Err(SlugAsyncError::Slug(SlugError::Conflict {
        base,
        attempts: MAX_SUFFIX_ATTEMPTS,
    }))
}

fn random_digit<R: Rng + ?Sized>(rng: &mut R) -> char {
    let digit: u32 = rng.random_range(0..10);
    char::from_digit(digit, 10).unwrap_or('0')
}

/// Slugify each word, join words with single hyphens and keep underscores.
fn join_words(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut word = String::new();
    let mut separated = false;

    for ch in input.chars() {
        match ch {
            '_' => {
                flush_word(&mut output, &mut word, &mut separated);
                if separated && !output.is_empty() {
                    output.push('-');
                }
                separated = false;
                output.push('_');
            }
            ch if ch == '-' || ch.is_whitespace() => {
                flush_word(&mut output, &mut word, &mut separated);
                separated = true;
            }
            ch => word.push(ch),
        }
    }
    flush_word(&mut output, &mut word, &mut separated);

    output
}

fn flush_word(output: &mut String, word: &mut String, separated: &mut bool) {
    let slugged = slugify(word.as_str());
    word.clear();
    if slugged.is_empty() {
        return;
    }
    if *separated && !output.is_empty() {
        output.push('-');
    }
    *separated = false;
    output.push_str(&slugged);
}

fn strip_punctuation(input: &str) -> String {
    input
        .chars()
        .filter(|ch| ch.is_alphanumeric() || ch.is_whitespace() || *ch == '-' || *ch == '_')
        .collect()
}

fn transliterate_to_ascii(input: &str) -> String {
    let mut output = String::with_capacity(input.len());

    for ch in input.chars() {
        if ch.is_ascii() {
            output.push(ch);
            continue;
        }

        match ch.to_pinyin() {
            Some(py) => append_pinyin(&mut output, py),
            None if ch.is_whitespace() => output.push(' '),
            None => output.push(ch),
        }
    }

    output
}

fn append_pinyin(buffer: &mut String, pinyin: Pinyin) {
    if !buffer.is_empty() && !buffer.ends_with(' ') {
        buffer.push(' ');
    }
    buffer.push_str(pinyin.plain());
    buffer.push(' ');
}

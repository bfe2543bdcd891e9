//! Anchor slug generation for documentation headings.
//!
//! `slugify` turns free-form heading text into an identifier that can be used
//! as an in-page anchor. The transformation lowercases the text, turns
//! whitespace runs into single hyphens, drops anything that is not a word
//! character or hyphen, collapses repeated hyphens, and trims hyphens from
//! both ends. It is total: text without any word characters yields an empty
//! slug.
//!
//! Uniqueness within a document is handled separately by [`SlugRegistry`].

mod registry;

use std::fmt;
use std::str::FromStr;

pub use registry::SlugRegistry;

/// Which characters survive slugification besides `-`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum WordChars {
    /// `[a-z0-9_]` after lowercasing. Accented and non-Latin letters are dropped.
    #[default]
    Ascii,
    /// Any Unicode alphanumeric character plus `_`, except letters that are
    /// still uppercase after lowercasing (e.g. `𝐀`, which has no lowercase
    /// form).
    Unicode,
}

impl WordChars {
    pub fn as_str(self) -> &'static str {
        match self {
            WordChars::Ascii => "ascii",
            WordChars::Unicode => "unicode",
        }
    }

    fn is_word(self, ch: char) -> bool {
        match self {
            WordChars::Ascii => ch.is_ascii_alphanumeric() || ch == '_',
            WordChars::Unicode => (ch.is_alphanumeric() && !ch.is_uppercase()) || ch == '_',
        }
    }
}

impl fmt::Display for WordChars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WordChars {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ascii" => Ok(WordChars::Ascii),
            "unicode" => Ok(WordChars::Unicode),
            _ => Err(()),
        }
    }
}

/// Separator class of the regular-expression `\s`: Unicode white space plus
/// U+FEFF, but not U+0085.
fn is_separator(ch: char) -> bool {
    ch == '\u{feff}' || (ch.is_whitespace() && ch != '\u{85}')
}

/// Slugify `text` using ASCII word characters.
pub fn slugify(text: &str) -> String {
    slugify_with(text, WordChars::Ascii)
}

/// Slugify `text` with an explicit word-character policy.
pub fn slugify_with(text: &str, policy: WordChars) -> String {
    let mut slug = String::with_capacity(text.len());
    // A separator is only written once the next word character arrives, so
    // leading, trailing, and repeated separators never reach the output.
    let mut pending_hyphen = false;

    for ch in text.to_lowercase().chars() {
        if policy.is_word(ch) {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else if ch == '-' || is_separator(ch) {
            pending_hyphen = true;
        }
    }

    slug
}

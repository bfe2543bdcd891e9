use docsite_slug::{slugify, slugify_with, WordChars};
use proptest::prelude::*;
use regex::Regex;

/// Literal six-step pipeline: lowercase, whitespace runs to `-`, strip
/// non-word characters, collapse hyphens, trim both ends.
fn staged_slugify(text: &str) -> String {
    let whitespace = Regex::new(
        r"[\t\n\x0B\x0C\r \x{A0}\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}]+",
    )
    .unwrap();
    let non_word = Regex::new(r"[^0-9A-Za-z_\-]+").unwrap();
    let hyphens = Regex::new(r"-{2,}").unwrap();
    let leading = Regex::new(r"^-+").unwrap();
    let trailing = Regex::new(r"-+$").unwrap();

    let lowered = text.to_lowercase();
    let spaced = whitespace.replace_all(&lowered, "-");
    let stripped = non_word.replace_all(&spaced, "");
    let collapsed = hyphens.replace_all(&stripped, "-");
    let trimmed = leading.replace(&collapsed, "");
    trailing.replace(&trimmed, "").into_owned()
}

fn assert_slug_shape(slug: &str) {
    assert!(
        !slug.chars().any(char::is_uppercase),
        "uppercase character in {slug:?}"
    );
    assert!(!slug.contains("--"), "double hyphen in {slug:?}");
    assert!(!slug.starts_with('-'), "leading hyphen in {slug:?}");
    assert!(!slug.ends_with('-'), "trailing hyphen in {slug:?}");
}

#[test]
fn matches_staged_pipeline_on_sample_headings() {
    let samples = [
        "Introduction",
        "OpenWebUI Configuration",
        "Railway Deployment Guide",
        "  Multiple   Spaces  ",
        "C++ & Rust!",
        "---already---hyphenated---",
        "A--B",
        "a - b - c",
        "What's new in v2.0?",
        "Step 1: Install `docker`",
        "tabs\tand\nnewlines",
        "émigré café",
        "100% (done)",
        "",
        "!!!",
        "a\u{feff}b",
        "a\u{85}b",
        "\u{1D400}BC Title",
    ];

    for sample in samples {
        assert_eq!(slugify(sample), staged_slugify(sample), "input {sample:?}");
    }
}

proptest! {
    #[test]
    fn ascii_slugs_follow_staged_pipeline(text in "\\PC{0,48}") {
        prop_assert_eq!(slugify(&text), staged_slugify(&text));
    }

    #[test]
    fn ascii_slugs_are_idempotent_and_well_formed(text in "\\PC{0,48}") {
        let slug = slugify(&text);
        assert_slug_shape(&slug);
        prop_assert!(slug.is_ascii());
        prop_assert_eq!(slugify(&slug), slug);
    }

    #[test]
    fn unicode_slugs_are_idempotent_and_well_formed(
        text in "[a-zA-Z0-9_ \\t\\-!?.,&éÉàÀßøØΣσΔ日本語ガイド𝐀𝐁𝔄ℋ]{0,48}"
    ) {
        let slug = slugify_with(&text, WordChars::Unicode);
        assert_slug_shape(&slug);
        prop_assert_eq!(slugify_with(&slug, WordChars::Unicode), slug);
    }

    #[test]
    fn unicode_slugs_of_arbitrary_text_are_well_formed(text in "\\PC{0,48}") {
        let slug = slugify_with(&text, WordChars::Unicode);
        assert_slug_shape(&slug);
        prop_assert_eq!(slugify_with(&slug, WordChars::Unicode), slug);
    }
}

//! Heading slug conventions.
//!
//! Two renderers disagree on how a heading becomes an anchor id. Links written
//! against one convention (GitHub, VS Code) have to be translated to the other
//! (Outline) before upload, see [`crate::links`].

use regex::Regex;
use std::sync::OnceLock;

/// Characters Outline drops from heading text before building its slug.
const OUTLINE_EXCLUDED: &str = r##"[!"#$%&'.()*+,\/:;<=>?@[]\^_`{|}~]"##;

fn letter_or_digit_regex() -> &'static Regex {
    static LETTER_OR_DIGIT: OnceLock<Regex> = OnceLock::new();
    LETTER_OR_DIGIT
        .get_or_init(|| Regex::new(r"^[\p{L}\p{Nd}]$").expect("Invalid letter/digit regex"))
}

fn punctuation_regex() -> &'static Regex {
    static PUNCTUATION: OnceLock<Regex> = OnceLock::new();
    PUNCTUATION.get_or_init(|| Regex::new(r"^\p{P}$").expect("Invalid punctuation regex"))
}

/// Simple case mapping: one char in, one char out (`İ` becomes `i`).
fn lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn char_matches(regex: &Regex, c: char) -> bool {
    let mut buf = [0u8; 4];
    regex.is_match(c.encode_utf8(&mut buf))
}

/// Slug the way GitHub and VS Code build heading ids.
///
/// Letters and decimal digits are lowercased, every other character becomes a
/// `-`. Runs of hyphens are kept as they are and nothing is trimmed.
pub fn regular_slug(text: &str) -> String {
    let letter_or_digit = letter_or_digit_regex();
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if char_matches(letter_or_digit, c) {
            slug.push(lower(c));
        } else {
            slug.push('-');
        }
    }
    slug
}

/// Slug the way Outline builds heading ids: always prefixed with `h-`.
///
/// Excluded punctuation is dropped. Whitespace and any other punctuation become
/// a single `-` per run. Trailing hyphens are stripped, leading ones are not.
pub fn outline_slug(text: &str) -> String {
    let punctuation = punctuation_regex();
    let mut body = String::with_capacity(text.len());
    // Excluded characters are dropped without touching this flag, so a run
    // like " & " still yields a single hyphen.
    let mut prev_dash = false;
    for c in text.chars() {
        if OUTLINE_EXCLUDED.contains(c) {
            continue;
        }
        if c.is_whitespace() || char_matches(punctuation, c) {
            if !prev_dash {
                prev_dash = true;
                body.push('-');
            }
            continue;
        }
        prev_dash = false;
        body.push(lower(c));
    }
    format!("h-{}", body.trim_end_matches('-'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Intro", "intro")]
    #[case("Getting Started!", "getting-started-")]
    #[case("Hello, World", "hello--world")]
    #[case("C++ & Rust", "c-----rust")]
    #[case("Step 1: Install", "step-1--install")]
    #[case("what_is_this", "what-is-this")]
    #[case("API — Overview", "api---overview")]
    #[case("Ünïcödé Straße", "ünïcödé-straße")]
    #[case("x²", "x-")]
    #[case("  padded  ", "--padded--")]
    #[case("İstanbul", "istanbul")]
    #[case("", "")]
    fn test_regular_slug(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(regular_slug(text), expected);
    }

    #[rstest]
    #[case("Intro", "h-intro")]
    #[case("Getting Started!", "h-getting-started")]
    #[case("Hello, World", "h-hello-world")]
    #[case("C++ & Rust", "h-c-rust")]
    #[case("Step 1: Install", "h-step-1-install")]
    #[case("what_is_this", "h-whatisthis")]
    #[case("API — Overview", "h-api-overview")]
    #[case("Ünïcödé Straße", "h-ünïcödé-straße")]
    #[case("x²", "h-x²")]
    #[case("Trailing --", "h-trailing")]
    #[case("a.b", "h-ab")]
    #[case("one-two", "h-one-two")]
    #[case("İstanbul", "h-istanbul")]
    #[case(r##"a!"#$%&'.()*+,\/:;<=>?@[]\^_`{|}~b"##, "h-ab")]
    #[case("", "h-")]
    fn test_outline_slug(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(outline_slug(text), expected);
    }

    #[test]
    fn test_outline_slug_keeps_leading_separator() {
        assert_eq!(outline_slug(" Intro"), "h--intro");
        assert_eq!(outline_slug("— Intro"), "h--intro");
    }

    #[test]
    fn test_outline_slug_shape() {
        let headings = [
            "Getting Started!",
            "FAQ: what -- why?",
            "Tabs\tand\nnewlines",
            "Ends with punctuation...",
            "Mixed — dashes – and - hyphens",
            "引用「テスト」と句読点、です。",
            "Émigré ¿Qué? ¡Sí!",
        ];
        for heading in headings {
            let slug = outline_slug(heading);
            assert!(slug.starts_with("h-"), "{slug}");
            assert!(!slug.contains("--"), "{slug}");
            assert!(!slug[2..].ends_with('-'), "{slug}");
        }
    }

    #[test]
    fn test_slugs_are_deterministic() {
        let text = "Configuration & Setup (v2)";
        assert_eq!(regular_slug(text), regular_slug(text));
        assert_eq!(outline_slug(text), outline_slug(text));
    }
}

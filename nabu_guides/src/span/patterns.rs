//! Compiled inline patterns
//!
//! The inline literal and phrase hyperlinks need lookaround and are scanned
//! by hand in the tokenizer.

use regex::Regex;
use std::sync::LazyLock;

/// `:role:` or `:domain:role:` followed by a backtick body
pub static INTERPRETED_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is):(?:([a-z0-9]+):)?([a-z0-9]+):`(.+?)`").expect("interpreted text pattern")
});

/// Backtick body without role; whitespace may not touch the backticks
pub static BARE_INTERPRETED_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`\s](?:[^`]*[^`\s])?)`").expect("bare interpreted pattern"));

/// `display text <url>` inside a reference body
pub static REFERENCE_TEXT_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^(.+?)<(.+)>$").expect("reference text pattern"));

/// `url#anchor` inside a reference body
pub static REFERENCE_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^(.+?)#(.+)$").expect("reference anchor pattern"));

/// `text <url>` inside a phrase hyperlink; `<` without `>` stays text
pub static PHRASE_EMBEDDED_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^(.*?)<([^<>]+)>\s*$").expect("embedded url pattern"));

/// `word_` and `word__`
pub static NAMED_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([a-z0-9][a-z0-9.+-]*?)(__?)\b").expect("named reference pattern")
});

/// `` _`text` ``
pub static INTERNAL_TARGET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_`([^`]+)`").expect("internal target pattern"));

/// RFC 5322 style local part and a dotted host
pub static EMAIL_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)(?:[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*)",
        r"@(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?",
    ))
    .expect("email pattern")
});

/// Gruber's liberal URL pattern
pub static STANDALONE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)\b((?:[a-z][\w\-+.]+:(?:/{1,3}|[a-z0-9%]))",
        r"(?:[^\s()<>]+|\(([^\s()<>]+|(\([^\s()<>]+\)))*\))+",
        r"(?:\(([^\s()<>]+|(\([^\s()<>]+\)))*\)",
        r#"|[^\s`!()\[\]{};:'".,<>?«»“”‘’]))"#,
    ))
    .expect("url pattern")
});

/// Whitespace runs collapsed in link names
pub static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpreted_text_captures() {
        let caps = INTERPRETED_TEXT.captures("see :php:class:`Foo` here").unwrap();
        assert_eq!(caps.get(1).map(|m| m.as_str()), Some("php"));
        assert_eq!(&caps[2], "class");
        assert_eq!(&caps[3], "Foo");

        let caps = INTERPRETED_TEXT.captures(":doc:`a` and :doc:`b`").unwrap();
        assert!(caps.get(1).is_none());
        assert_eq!(&caps[3], "a");
    }

    #[test]
    fn test_url_excludes_trailing_punctuation() {
        let m = STANDALONE_URL.find("Go to https://example.com/path.").unwrap();
        assert_eq!(m.as_str(), "https://example.com/path");
        assert!(STANDALONE_URL.find("applications: here").is_none());
    }

    #[test]
    fn test_named_reference_needs_word_end() {
        assert!(NAMED_REFERENCE.is_match("see link_."));
        assert!(!NAMED_REFERENCE.is_match("snake_case"));
        assert_eq!(&NAMED_REFERENCE.captures("an link__").unwrap()[2], "__");
    }

    #[test]
    fn test_embedded_url_requires_closing_bracket() {
        assert!(PHRASE_EMBEDDED_URL.is_match("text <http://a.b>"));
        assert!(!PHRASE_EMBEDDED_URL.is_match("Phrase < Reference"));
    }
}

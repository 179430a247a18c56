//! Inline span tokenizer
//!
//! Replaces every inline construct of a paragraph with a 40 hex character
//! placeholder and records what it stood for. Passes run in a fixed order and
//! each pass only sees the text left by the previous ones:
//!
//! 1. inline literals
//! 2. interpreted text, with a role and then bare
//! 3. phrase hyperlink references
//! 4. named and anonymous `word_` references
//! 5. inline internal targets
//! 6. standalone email addresses
//! 7. standalone urls

use super::patterns::{
    BARE_INTERPRETED_TEXT, EMAIL_ADDRESS, INTERNAL_TARGET, INTERPRETED_TEXT, NAMED_REFERENCE,
    PHRASE_EMBEDDED_URL, REFERENCE_ANCHOR, REFERENCE_TEXT_URL, STANDALONE_URL, WHITESPACE_RUN,
};
use super::token::{ReferenceData, SpanPayload, SpanResult, SpanToken};
use crate::environment::Environment;
use crate::references::ReferenceResolver;
use nabu_reflection::config::compile_time::guides::MAX_SPAN_TOKENS_PER_PARAGRAPH;
use regex::{Captures, Regex};
use sha2::{Digest, Sha256};
use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};

const ID_LENGTH: usize = 40;

/// What a pass decided about one regex match
enum Step {
    /// Replace the match with this placeholder
    Replace(String),
    /// Not a construct; leave the whole match as text
    Skip,
}

pub struct SpanTokenizer<'r> {
    resolver: &'r mut ReferenceResolver,
    default_role: String,
    prefix: String,
    counter: u64,
    tokens: Vec<SpanToken>,
    source: String,
    limit_reported: bool,
}

impl<'r> SpanTokenizer<'r> {
    pub fn new(resolver: &'r mut ReferenceResolver) -> Self {
        Self {
            resolver,
            default_role: "ref".to_string(),
            prefix: random_prefix(),
            counter: 0,
            tokens: Vec::new(),
            source: String::new(),
            limit_reported: false,
        }
    }

    /// Role given to interpreted text written without one
    pub fn with_default_role(mut self, role: &str) -> Self {
        self.default_role = role.to_string();
        self
    }

    /// Tokenize one paragraph
    ///
    /// Dependencies implied by cross-references are registered with the
    /// resolver as they are found; named links with an embedded url are
    /// recorded in `env`.
    pub fn tokenize(&mut self, env: &mut Environment, text: &str) -> SpanResult {
        self.tokens = Vec::new();
        self.source = text.to_string();
        self.limit_reported = false;

        let span = self.replace_literals(text);
        let span = self.replace_interpreted_text(env, &span);
        let span = self.replace_bare_interpreted_text(env, &span);
        let span = self.replace_phrase_references(env, &span);
        let span = self.replace_named_references(env, &span);
        let span = self.replace_internal_targets(&span);
        let span = self.replace_email_addresses(&span);
        let value = self.replace_urls(&span);

        SpanResult {
            value,
            tokens: std::mem::take(&mut self.tokens),
        }
    }

    /// ``` ``text`` ```, where the closing backticks are not followed by a third
    fn replace_literals(&mut self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(open) = rest.find("``") {
            let body_start = open + 2;
            let Some(first) = rest[body_start..].chars().next() else {
                break;
            };
            let Some(close) = find_literal_end(rest, body_start + first.len_utf8()) else {
                break;
            };

            let payload = SpanPayload::Literal {
                text: rest[body_start..close].to_string(),
            };
            let Some(id) = self.push(payload) else {
                break;
            };

            out.push_str(&rest[..open]);
            out.push_str(&id);
            rest = &rest[close + 2..];
        }

        out.push_str(rest);
        out
    }

    fn replace_interpreted_text(&mut self, env: &mut Environment, text: &str) -> String {
        self.replace_matches(text, &INTERPRETED_TEXT, |this, caps, _| {
            let domain = caps.get(1).map(|m| m.as_str().to_string());
            let role = caps.get(2).map_or("", |m| m.as_str());
            let body = caps.get(3).map_or("", |m| m.as_str());
            this.reference(env, domain, role, body)
        })
    }

    /// `` `text` `` without a role, unless it is part of a phrase link or target
    fn replace_bare_interpreted_text(&mut self, env: &mut Environment, text: &str) -> String {
        let role = self.default_role.clone();
        self.replace_matches(text, &BARE_INTERPRETED_TEXT, |this, caps, text| {
            let Some(whole) = caps.get(0) else {
                return Step::Skip;
            };
            if text[..whole.start()].ends_with('_') || text[whole.end()..].starts_with('_') {
                return Step::Skip;
            }
            let body = caps.get(1).map_or("", |m| m.as_str());
            this.reference(env, None, &role, body)
        })
    }

    fn reference(
        &mut self,
        env: &mut Environment,
        domain: Option<String>,
        role: &str,
        body: &str,
    ) -> Step {
        let (text, target) = match REFERENCE_TEXT_URL.captures(body) {
            Some(caps) => (
                caps.get(1).map(|m| m.as_str().trim().to_string()),
                caps.get(2).map_or(body, |m| m.as_str()),
            ),
            None => (None, body),
        };
        let (url, anchor) = match REFERENCE_ANCHOR.captures(target) {
            Some(caps) => (
                caps.get(1).map_or(target, |m| m.as_str()),
                caps.get(2).map(|m| m.as_str().trim().to_string()),
            ),
            None => (target, None),
        };

        let data = ReferenceData {
            domain,
            role: role.to_string(),
            url: url.trim().to_string(),
            text,
            anchor,
        };
        let joined_role = data.joined_role();
        let url = data.url.clone();

        match self.push(SpanPayload::Reference(data)) {
            Some(id) => {
                self.resolver.found(env, &joined_role, &url);
                Step::Replace(id)
            }
            None => Step::Skip,
        }
    }

    /// `` `text`_ ``, `` `text <url>`_ `` and the anonymous `` `text`__ ``
    fn replace_phrase_references(&mut self, env: &mut Environment, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        let mut at = 0;

        while let Some(offset) = text[at..].find('`') {
            let open = at + offset;
            let Some(length) = text[open + 1..].find('`') else {
                break;
            };
            let close = open + 1 + length;

            if text[..open].ends_with('_') {
                at = close + 1;
                continue;
            }

            let after = &text[close + 1..];
            let (anonymous, end) = if after.starts_with("__") {
                (true, close + 3)
            } else if after.starts_with('_') {
                (false, close + 2)
            } else {
                at = close;
                continue;
            };

            let body = &text[open + 1..close];
            let (link, url) = match PHRASE_EMBEDDED_URL.captures(body) {
                Some(caps) => {
                    let url = caps.get(2).map_or("", |m| m.as_str()).trim().to_string();
                    let link = caps.get(1).map_or("", |m| m.as_str());
                    let link = if link.trim().is_empty() { url.as_str() } else { link };
                    (normalize_link_text(link), Some(url))
                }
                None => (normalize_link_text(body), None),
            };

            let Some(id) = self.link(env, &link, url.as_deref(), anonymous) else {
                break;
            };

            out.push_str(&text[last..open]);
            out.push_str(&id);
            last = end;
            at = end;
        }

        out.push_str(&text[last..]);
        out
    }

    /// `word_` and the anonymous `word__`
    fn replace_named_references(&mut self, env: &mut Environment, text: &str) -> String {
        self.replace_matches(text, &NAMED_REFERENCE, |this, caps, _| {
            let name = caps.get(1).map_or("", |m| m.as_str());
            if this.tokens.iter().any(|token| token.id == name) {
                return Step::Skip;
            }
            let anonymous = caps.get(2).is_some_and(|m| m.as_str() == "__");
            match this.link(env, name, None, anonymous) {
                Some(id) => Step::Replace(id),
                None => Step::Skip,
            }
        })
    }

    fn replace_internal_targets(&mut self, text: &str) -> String {
        self.replace_matches(text, &INTERNAL_TARGET, |this, caps, _| {
            let link = normalize_link_text(caps.get(1).map_or("", |m| m.as_str()));
            match this.push(SpanPayload::Anchor { link }) {
                Some(id) => Step::Replace(id),
                None => Step::Skip,
            }
        })
    }

    fn replace_email_addresses(&mut self, text: &str) -> String {
        self.replace_matches(text, &EMAIL_ADDRESS, |this, caps, text| {
            let Some(whole) = caps.get(0) else {
                return Step::Skip;
            };
            if text[..whole.start()].ends_with(['/', ':']) {
                return Step::Skip;
            }
            let address = whole.as_str().to_string();
            let payload = SpanPayload::Link {
                url: format!("mailto:{}", address),
                link: address,
            };
            match this.push(payload) {
                Some(id) => Step::Replace(id),
                None => Step::Skip,
            }
        })
    }

    fn replace_urls(&mut self, text: &str) -> String {
        self.replace_matches(text, &STANDALONE_URL, |this, caps, _| {
            let url = caps.get(1).map_or("", |m| m.as_str()).to_string();
            let payload = SpanPayload::Link {
                link: url.clone(),
                url,
            };
            match this.push(payload) {
                Some(id) => Step::Replace(id),
                None => Step::Skip,
            }
        })
    }

    fn link(
        &mut self,
        env: &mut Environment,
        link: &str,
        url: Option<&str>,
        anonymous: bool,
    ) -> Option<String> {
        if anonymous {
            env.reset_anonymous_stack();
        }

        let id = self.push(SpanPayload::Link {
            link: link.to_string(),
            url: url.unwrap_or_default().to_string(),
        })?;

        if let Some(url) = url {
            env.set_link(link, url);
        }
        if anonymous {
            env.push_anonymous(link);
        }
        Some(id)
    }

    /// Run `step` on every match of `regex`, splicing in the placeholders
    fn replace_matches<F>(&mut self, text: &str, regex: &Regex, mut step: F) -> String
    where
        F: FnMut(&mut Self, &Captures<'_>, &str) -> Step,
    {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        let mut at = 0;

        while at <= text.len() {
            let Some(caps) = regex.captures_at(text, at) else {
                break;
            };
            let Some(whole) = caps.get(0) else {
                break;
            };
            let next_char = text[whole.start()..]
                .chars()
                .next()
                .map_or(1, char::len_utf8);

            match step(self, &caps, text) {
                Step::Replace(id) => {
                    out.push_str(&text[last..whole.start()]);
                    out.push_str(&id);
                    last = whole.end();
                    at = whole.end().max(whole.start() + next_char);
                }
                Step::Skip => at = whole.end().max(whole.start() + next_char),
            }
        }

        out.push_str(&text[last..]);
        out
    }

    /// Store a token, `None` once the paragraph holds too many
    fn push(&mut self, payload: SpanPayload) -> Option<String> {
        if self.tokens.len() >= MAX_SPAN_TOKENS_PER_PARAGRAPH {
            if !self.limit_reported {
                nabu_reflection::log_warning!("Span token limit reached, leaving remaining constructs as text",
                    "file" => self.resolver.document(),
                    "limit" => MAX_SPAN_TOKENS_PER_PARAGRAPH
                );
                self.limit_reported = true;
            }
            return None;
        }

        let id = self.generate_id();
        self.tokens.push(SpanToken::new(id.clone(), payload));
        Some(id)
    }

    fn generate_id(&mut self) -> String {
        loop {
            self.counter += 1;
            let digest = Sha256::digest(format!("{}|{}", self.prefix, self.counter));
            let mut id = format!("{:x}", digest);
            id.truncate(ID_LENGTH);

            if !self.source.contains(&id) {
                return id;
            }
            self.prefix = random_prefix();
        }
    }
}

fn random_prefix() -> String {
    let mut hasher = RandomState::new().build_hasher();
    hasher.write_i64(chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default());
    format!("{:016x}|{}", hasher.finish(), chrono::Utc::now().timestamp())
}

/// First ``` `` ``` at or after `from` that is not followed by a third backtick
fn find_literal_end(text: &str, from: usize) -> Option<usize> {
    let mut at = from;
    while let Some(offset) = text[at..].find("``") {
        let candidate = at + offset;
        if !text[candidate + 2..].starts_with('`') {
            return Some(candidate);
        }
        at = candidate + 1;
    }
    None
}

/// Collapse whitespace, trim and drop backslash escapes
fn normalize_link_text(text: &str) -> String {
    let collapsed = WHITESPACE_RUN.replace_all(text, " ");
    let mut out = String::with_capacity(collapsed.len());
    let mut chars = collapsed.trim().chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => out.extend(chars.next()),
            ch => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::SpanTokenKind;

    fn tokenize(text: &str) -> (SpanResult, Environment) {
        let mut env = Environment::default();
        env.set_current_file("index");
        let mut resolver = ReferenceResolver::new();
        resolver.scope("index");
        let result = SpanTokenizer::new(&mut resolver).tokenize(&mut env, text);
        (result, env)
    }

    fn single_link(result: &SpanResult) -> (String, String) {
        assert_eq!(result.tokens.len(), 1, "tokens: {:?}", result.tokens);
        match &result.tokens[0].payload {
            SpanPayload::Link { link, url } => (link.clone(), url.clone()),
            other => panic!("expected a link, got {:?}", other),
        }
    }

    fn reference(result: &SpanResult) -> ReferenceData {
        match &result.tokens[0].payload {
            SpanPayload::Reference(data) => data.clone(),
            other => panic!("expected a reference, got {:?}", other),
        }
    }

    fn placeholder(result: &SpanResult, index: usize) -> &str {
        &result.tokens[index].id
    }

    #[test]
    fn test_plain_text_is_untouched() {
        let (result, _) = tokenize("Raw token");
        assert_eq!(result.value, "Raw token");
        assert!(result.is_plain());
    }

    #[test]
    fn test_malformed_constructs_are_untouched() {
        for input in [
            "This text is an example of `` mis-used.",
            "This text is an example of `  ` mis-used.",
            "This text is an example of :role:`foo mis-used.",
            "This text is an example of role: mis-used.",
            "to create new Symfony applications:",
            "This text is an example of <a>",
            "Line ending with a colon:",
        ] {
            let (result, _) = tokenize(input);
            assert_eq!(result.value, input);
            assert!(result.is_plain(), "unexpected tokens for {:?}", input);
        }
    }

    #[test]
    fn test_role_without_colon_prefix_becomes_a_link() {
        let (result, _) = tokenize("This text is an example of role:`mis-used`.");
        assert_eq!(result.tokens.len(), 2);
        let link = placeholder(&result, 1);
        assert_eq!(result.value, format!("This text is an example of {}.", link));
        assert_eq!(result.tokens[1].kind(), SpanTokenKind::Link);
    }

    #[test]
    fn test_literal_takes_precedence() {
        let (result, _) = tokenize("Use ``:doc:`not a reference` `` here and ``foo``.");
        assert_eq!(result.tokens.len(), 2);
        assert_eq!(
            result.tokens[0].payload,
            SpanPayload::Literal {
                text: ":doc:`not a reference` ".to_string()
            }
        );
        assert_eq!(
            result.value,
            format!("Use {} here and {}.", placeholder(&result, 0), placeholder(&result, 1))
        );
    }

    #[test]
    fn test_literal_closing_before_third_backtick() {
        let (result, _) = tokenize("``a```");
        assert_eq!(
            result.tokens[0].payload,
            SpanPayload::Literal { text: "a`".to_string() }
        );
    }

    #[test]
    fn test_interpreted_text_references() {
        let (result, _) = tokenize("Some `title ref` in text.");
        let data = reference(&result);
        assert_eq!(data.role, "ref");
        assert_eq!(data.url, "title ref");
        assert_eq!(data.display_text(), "title ref");
        assert!(!result.value.contains("`title ref`"));

        let (result, _) = tokenize("Some :doc:`foo/subdoc#anchor` in text.");
        let data = reference(&result);
        assert_eq!(data.role, "doc");
        assert_eq!(data.url, "foo/subdoc");
        assert_eq!(data.anchor.as_deref(), Some("anchor"));

        let (result, _) = tokenize("Some :doc:`link <foo/subdoc#anchor>` in text.");
        let data = reference(&result);
        assert_eq!(data.url, "foo/subdoc");
        assert_eq!(data.anchor.as_deref(), Some("anchor"));
        assert_eq!(data.text.as_deref(), Some("link"));

        let (result, _) = tokenize("Some :php:class:`title ref` in text.");
        let data = reference(&result);
        assert_eq!(data.domain.as_deref(), Some("php"));
        assert_eq!(data.role, "class");
        assert_eq!(data.joined_role(), "php:class");
    }

    #[test]
    fn test_references_register_dependencies() {
        let mut env = Environment::default();
        env.set_current_file("guide/index");
        let mut resolver = ReferenceResolver::new();
        resolver.scope("guide/index");

        SpanTokenizer::new(&mut resolver)
            .tokenize(&mut env, "See :doc:`install` and `Getting started`.");

        assert_eq!(
            resolver.dependencies(),
            &["guide/install".to_string(), "UNRESOLVED__Getting started".to_string()]
        );
    }

    #[test]
    fn test_custom_default_role() {
        let mut env = Environment::default();
        let mut resolver = ReferenceResolver::new();
        let result = SpanTokenizer::new(&mut resolver)
            .with_default_role("php:class")
            .tokenize(&mut env, "The `Foo` class.");
        let data = reference(&result);
        assert_eq!(data.role, "php:class");
    }

    #[test]
    fn test_named_references() {
        let (result, _) = tokenize("This text is an example of link_.");
        assert_eq!(single_link(&result), ("link".to_string(), String::new()));
        assert_eq!(result.value, format!("This text is an example of {}.", placeholder(&result, 0)));

        let (result, _) = tokenize("snake_case stays text");
        assert!(result.is_plain());
    }

    #[test]
    fn test_phrase_references() {
        let (result, _) = tokenize("This text is an example of `Phrase Reference`_.");
        assert_eq!(single_link(&result).0, "Phrase Reference");

        let (result, _) = tokenize("This text is an example of `Phrase < Reference`_");
        assert_eq!(single_link(&result), ("Phrase < Reference".to_string(), String::new()));

        let (result, _) = tokenize("This text is an example of `Phrase\n                 Reference`_.");
        assert_eq!(single_link(&result).0, "Phrase Reference");
    }

    #[test]
    fn test_embedded_urls_record_links() {
        let (result, env) = tokenize("This is an example of `embedded urls <http://google.com>`_ in a text");
        assert_eq!(
            single_link(&result),
            ("embedded urls".to_string(), "http://google.com".to_string())
        );
        assert_eq!(
            result.value,
            format!("This is an example of {} in a text", placeholder(&result, 0))
        );
        assert_eq!(env.get_link("embedded urls"), "http://google.com");

        let (result, _) = tokenize("This is an example of `embedded urls alias <alias_>`_ in a text");
        assert_eq!(
            single_link(&result),
            ("embedded urls alias".to_string(), "alias_".to_string())
        );
    }

    #[test]
    fn test_escaped_link_text() {
        let (result, env) = tokenize(
            "A more complex example `\\__call() <https://www.php.net/language.oop5.overloading#object.call>`_.",
        );
        let (link, url) = single_link(&result);
        assert_eq!(link, "__call()");
        assert_eq!(url, "https://www.php.net/language.oop5.overloading#object.call");
        assert_eq!(env.get_link("__call()"), url);
    }

    #[test]
    fn test_anonymous_references_push_the_stack() {
        let (result, mut env) = tokenize("This is an example of an link__");
        assert_eq!(single_link(&result).0, "link");

        env.set_link("_", "https://example.com");
        assert_eq!(env.get_link("link"), "https://example.com");

        let (result, mut env) = tokenize("An `anonymous phrase`__ here");
        assert_eq!(single_link(&result).0, "anonymous phrase");
        env.set_link("_", "https://example.org");
        assert_eq!(env.get_link("anonymous phrase"), "https://example.org");
    }

    #[test]
    fn test_internal_target() {
        let (result, _) = tokenize("Some _`internal ref` in text.");
        assert!(!result.value.contains("_`internal ref`"));
        assert_eq!(
            result.tokens[0].payload,
            SpanPayload::Anchor {
                link: "internal ref".to_string()
            }
        );
        assert_eq!(result.tokens.len(), 1);
    }

    #[test]
    fn test_email_addresses() {
        let (result, _) = tokenize("Mail jane.doe@example.com today");
        assert_eq!(
            single_link(&result),
            (
                "jane.doe@example.com".to_string(),
                "mailto:jane.doe@example.com".to_string()
            )
        );
    }

    #[test]
    fn test_urls() {
        let (result, _) = tokenize("https://www.example.org/path?query=1");
        assert_eq!(
            single_link(&result),
            (
                "https://www.example.org/path?query=1".to_string(),
                "https://www.example.org/path?query=1".to_string()
            )
        );
        assert_eq!(result.value, placeholder(&result, 0));
    }

    #[test]
    fn test_email_inside_url_belongs_to_the_url() {
        let (result, _) = tokenize("ftp://user@files.example.com/pub");
        let (link, _) = single_link(&result);
        assert_eq!(link, "ftp://user@files.example.com/pub");
    }

    #[test]
    fn test_placeholders_are_unique_hex() {
        let (result, _) = tokenize("``a`` and ``b``");
        let first = placeholder(&result, 0);
        let second = placeholder(&result, 1);
        assert_ne!(first, second);
        for id in [first, second] {
            assert_eq!(id.len(), ID_LENGTH);
            assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn test_normalize_link_text() {
        assert_eq!(normalize_link_text("  a \n  b  "), "a b");
        assert_eq!(normalize_link_text("\\_\\_call"), "__call");
    }
}

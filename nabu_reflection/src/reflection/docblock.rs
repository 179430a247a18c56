//! Doc-comment extraction and minimal parsing
//!
//! A raw `/** ... */` comment is split into a summary, a long description
//! and `@name content` tags. Nothing beyond that structure is interpreted.

use crate::tokens::{TokenCursor, TokenKind};
use serde::{Deserialize, Serialize};

/// Tags whose content starts with a type (and, for some, a variable)
const TYPED_TAGS: &[&str] = &["param", "return", "var", "throws", "property"];
const VARIABLE_TAGS: &[&str] = &["param", "var", "property"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocTag {
    pub name: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
}

impl DocTag {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        let name = name.into();
        let content = content.into();
        let variable = if VARIABLE_TAGS.contains(&name.as_str()) {
            content
                .split_whitespace()
                .take(2)
                .find(|word| word.starts_with('$') || word.starts_with("&$"))
                .map(|word| word.trim_start_matches('&').to_string())
        } else {
            None
        };
        Self {
            name,
            content,
            variable,
        }
    }

    /// The `|`-separated type list of typed tags such as `@param` or `@return`
    pub fn types(&self) -> Vec<String> {
        if !TYPED_TAGS.contains(&self.name.as_str()) {
            return Vec::new();
        }
        match self.content.split_whitespace().next() {
            Some(first) if !first.starts_with('$') => first
                .split('|')
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Content with the leading type and variable removed
    pub fn description(&self) -> String {
        let mut words: Vec<&str> = self.content.split_whitespace().collect();
        if !self.types().is_empty() && !words.is_empty() {
            words.remove(0);
        }
        if let Some(variable) = &self.variable {
            if words
                .first()
                .is_some_and(|w| w.trim_start_matches('&') == variable)
            {
                words.remove(0);
            }
        }
        words.join(" ")
    }

    pub fn variable_name(&self) -> &str {
        self.variable.as_deref().unwrap_or("")
    }

    pub fn set_variable_name(&mut self, name: &str) {
        self.variable = Some(name.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocBlock {
    pub summary: String,
    pub description: String,
    pub tags: Vec<DocTag>,
    pub line: u32,
}

impl DocBlock {
    /// Parse a raw doc comment found at `line`
    pub fn parse(raw: &str, line: u32) -> Self {
        let lines = strip_comment_delimiters(raw);
        let tag_start = lines
            .iter()
            .position(|l| l.starts_with('@'))
            .unwrap_or(lines.len());

        let (summary, description) = split_summary(&lines[..tag_start]);

        Self {
            summary,
            description,
            tags: parse_tags(&lines[tag_start..]),
            line,
        }
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.name == name)
    }

    pub fn tags_by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a DocTag> + 'a {
        self.tags.iter().filter(move |t| t.name == name)
    }

    pub fn tags_by_name_mut<'a>(
        &'a mut self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a mut DocTag> + 'a {
        self.tags.iter_mut().filter(move |t| t.name == name)
    }
}

fn strip_comment_delimiters(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    let body = raw.strip_prefix("/**").unwrap_or(raw);
    let body = body.strip_suffix("*/").unwrap_or(body);

    body.lines()
        .map(|line| {
            let line = line.trim_start();
            let line = line.strip_prefix('*').unwrap_or(line);
            let line = line.strip_prefix(' ').unwrap_or(line);
            line.trim_end().to_string()
        })
        .collect()
}

/// Summary runs to the first blank line or the first line ending in `.`
fn split_summary(lines: &[String]) -> (String, String) {
    let text: Vec<&str> = lines
        .iter()
        .map(String::as_str)
        .skip_while(|l| l.trim().is_empty())
        .collect();

    let mut summary_end = text.len();
    for (index, line) in text.iter().enumerate() {
        if line.trim().is_empty() {
            summary_end = index;
            break;
        }
        if line.trim_end().ends_with('.') {
            summary_end = index + 1;
            break;
        }
    }

    let summary = text[..summary_end].join("\n").trim().to_string();
    let description = text[summary_end..].join("\n").trim().to_string();
    (summary, description)
}

fn parse_tags(lines: &[String]) -> Vec<DocTag> {
    let mut raw_tags: Vec<(String, String)> = Vec::new();

    for line in lines {
        if let Some(rest) = line.strip_prefix('@') {
            let name_len = rest.find(char::is_whitespace).unwrap_or(rest.len());
            let (name, content) = rest.split_at(name_len);
            raw_tags.push((name.to_string(), content.trim().to_string()));
        } else if let Some((_, content)) = raw_tags.last_mut() {
            if !line.trim().is_empty() {
                content.push('\n');
                content.push_str(line.trim());
            }
        }
    }

    raw_tags
        .into_iter()
        .map(|(name, content)| DocTag::new(name, content.trim()))
        .collect()
}

/// Doc comment belonging to the declaration under the cursor
///
/// Looks back at most 10 tokens and never across `{`, `}` or `;`, so a
/// previous member's comment is not picked up.
pub fn find_preceding_doc_comment(cursor: &mut TokenCursor) -> Option<DocBlock> {
    cursor
        .find_previous_by_type(
            &[TokenKind::DocComment],
            10,
            &[
                TokenKind::OpenBrace,
                TokenKind::CloseBrace,
                TokenKind::Semicolon,
            ],
        )
        .map(|token| DocBlock::parse(&token.text, token.line()))
}

/// Report an undocumented element
pub fn warn_missing(kind: &str, name: &str, line: u32) {
    crate::log_warning!(&format!("No DocBlock was found for {} {}", kind, name),
        "line" => line
    );
}

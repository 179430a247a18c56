use serde::{Deserialize, Serialize};

/// Kind of a span token, without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpanTokenKind {
    Literal,
    Link,
    Reference,
    Anchor,
}

impl SpanTokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Literal => "literal",
            Self::Link => "link",
            Self::Reference => "reference",
            Self::Anchor => "anchor",
        }
    }
}

/// Cross-reference parsed from interpreted text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceData {
    pub domain: Option<String>,
    pub role: String,
    pub url: String,
    pub text: Option<String>,
    pub anchor: Option<String>,
}

impl ReferenceData {
    /// `domain:role` when a domain is present
    pub fn joined_role(&self) -> String {
        match &self.domain {
            Some(domain) => format!("{}:{}", domain, self.role),
            None => self.role.clone(),
        }
    }

    /// Text shown for the reference; the url when no text was given
    pub fn display_text(&self) -> &str {
        self.text.as_deref().unwrap_or(&self.url)
    }
}

/// Typed payload of a span token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpanPayload {
    Literal { text: String },
    Link { link: String, url: String },
    Reference(ReferenceData),
    Anchor { link: String },
}

/// A recognised inline construct, replaced in the text by `id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanToken {
    pub id: String,
    pub payload: SpanPayload,
}

impl SpanToken {
    pub fn new(id: String, payload: SpanPayload) -> Self {
        Self { id, payload }
    }

    pub fn kind(&self) -> SpanTokenKind {
        match self.payload {
            SpanPayload::Literal { .. } => SpanTokenKind::Literal,
            SpanPayload::Link { .. } => SpanTokenKind::Link,
            SpanPayload::Reference(_) => SpanTokenKind::Reference,
            SpanPayload::Anchor { .. } => SpanTokenKind::Anchor,
        }
    }
}

/// Placeholder text plus the tokens it refers to, in creation order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanResult {
    pub value: String,
    pub tokens: Vec<SpanToken>,
}

impl SpanResult {
    pub fn token(&self, id: &str) -> Option<&SpanToken> {
        self.tokens.iter().find(|token| token.id == id)
    }

    pub fn is_plain(&self) -> bool {
        self.tokens.is_empty()
    }
}

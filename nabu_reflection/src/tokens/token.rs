//! PHP token definitions
//!
//! A closed set of token kinds. Keywords are recognised case-insensitively by
//! the lexer; punctuation kinds always carry their literal text.

use crate::utils::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    // Modifier keywords
    Abstract,
    Final,
    Static,
    Public,
    Protected,
    Private,
    Var,

    // Declaration keywords
    Class,
    Interface,
    Extends,
    Implements,
    Function,
    Const,
    Array,
    Namespace,
    Use,
    As,
    Include,
    IncludeOnce,
    Require,
    RequireOnce,

    // Values
    Identifier,
    Variable,
    StringLiteral,
    NumberLiteral,
    DocComment,
    Comment,
    Whitespace,
    InlineHtml,
    OpenTag,
    CloseTag,
    NsSeparator,

    // Punctuation
    OpenBrace,
    CloseBrace,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    Comma,
    Semicolon,
    Assign,
    Operator,
}

impl TokenKind {
    /// Punctuation kinds have no token type of their own in PHP's tokenizer
    pub fn is_punctuation(&self) -> bool {
        matches!(
            self,
            TokenKind::OpenBrace
                | TokenKind::CloseBrace
                | TokenKind::OpenParen
                | TokenKind::CloseParen
                | TokenKind::OpenBracket
                | TokenKind::CloseBracket
                | TokenKind::Comma
                | TokenKind::Semicolon
                | TokenKind::Assign
                | TokenKind::Operator
        )
    }

    pub fn is_trivia(&self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }

    pub fn is_include(&self) -> bool {
        matches!(
            self,
            TokenKind::Include | TokenKind::IncludeOnce | TokenKind::Require | TokenKind::RequireOnce
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Abstract => "abstract",
            TokenKind::Final => "final",
            TokenKind::Static => "static",
            TokenKind::Public => "public",
            TokenKind::Protected => "protected",
            TokenKind::Private => "private",
            TokenKind::Var => "var",
            TokenKind::Class => "class",
            TokenKind::Interface => "interface",
            TokenKind::Extends => "extends",
            TokenKind::Implements => "implements",
            TokenKind::Function => "function",
            TokenKind::Const => "const",
            TokenKind::Array => "array",
            TokenKind::Namespace => "namespace",
            TokenKind::Use => "use",
            TokenKind::As => "as",
            TokenKind::Include => "include",
            TokenKind::IncludeOnce => "include_once",
            TokenKind::Require => "require",
            TokenKind::RequireOnce => "require_once",
            TokenKind::Identifier => "identifier",
            TokenKind::Variable => "variable",
            TokenKind::StringLiteral => "string literal",
            TokenKind::NumberLiteral => "number literal",
            TokenKind::DocComment => "doc comment",
            TokenKind::Comment => "comment",
            TokenKind::Whitespace => "whitespace",
            TokenKind::InlineHtml => "inline html",
            TokenKind::OpenTag => "open tag",
            TokenKind::CloseTag => "close tag",
            TokenKind::NsSeparator => "\\",
            TokenKind::OpenBrace => "{",
            TokenKind::CloseBrace => "}",
            TokenKind::OpenParen => "(",
            TokenKind::CloseParen => ")",
            TokenKind::OpenBracket => "[",
            TokenKind::CloseBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Assign => "=",
            TokenKind::Operator => "operator",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Map a bare word to its keyword kind
pub fn keyword_kind(word: &str) -> Option<TokenKind> {
    let kind = match word.to_ascii_lowercase().as_str() {
        "abstract" => TokenKind::Abstract,
        "final" => TokenKind::Final,
        "static" => TokenKind::Static,
        "public" => TokenKind::Public,
        "protected" => TokenKind::Protected,
        "private" => TokenKind::Private,
        "var" => TokenKind::Var,
        "class" => TokenKind::Class,
        "interface" => TokenKind::Interface,
        "extends" => TokenKind::Extends,
        "implements" => TokenKind::Implements,
        "function" => TokenKind::Function,
        "const" => TokenKind::Const,
        "array" => TokenKind::Array,
        "namespace" => TokenKind::Namespace,
        "use" => TokenKind::Use,
        "as" => TokenKind::As,
        "include" => TokenKind::Include,
        "include_once" => TokenKind::IncludeOnce,
        "require" => TokenKind::Require,
        "require_once" => TokenKind::RequireOnce,
        _ => return None,
    };
    Some(kind)
}

/// Immutable unit produced by the lexer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    pub fn line(&self) -> u32 {
        self.span.start.line
    }

    pub fn offset(&self) -> usize {
        self.span.start.offset
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Identifier whose text matches case-insensitively (e.g. `define`)
    pub fn is_word(&self, word: &str) -> bool {
        self.kind == TokenKind::Identifier && self.text.eq_ignore_ascii_case(word)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}' at line {}", self.kind, self.text, self.line())
    }
}

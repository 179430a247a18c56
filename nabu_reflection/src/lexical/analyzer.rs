//! Core PHP lexical analyzer
//!
//! Produces the complete token list for a source file, trivia included, so
//! that bounded cursor searches count tokens the same way regardless of
//! formatting. Text outside `<?php ... ?>` is kept as `InlineHtml`.

use crate::config::compile_time::lexical::*;
use crate::file_processor::FileProcessingResult;
use crate::logging::codes;
use crate::tokens::{keyword_kind, Token, TokenKind};
use crate::utils::{Position, Span};
use crate::{log_debug, log_error, log_success};

/// Multi-character operators, longest first
const OPERATORS: &[&str] = &[
    "<=>", "===", "!==", "**=", "...", "<<=", ">>=", "??=", "?->", "==", "!=", "<>", "<=", ">=",
    "=>", "->", "::", "++", "--", "+=", "-=", "*=", "/=", ".=", "%=", "&=", "|=", "^=", "&&",
    "||", "??", "<<", ">>", "**",
];

/// Lexical analysis errors with compile-time security boundaries
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexerError {
    #[error("Unterminated {what} starting at line {line}")]
    Unterminated { what: &'static str, line: u32 },

    #[error("Identifier too long: {length} characters (max {MAX_IDENTIFIER_LENGTH})")]
    IdentifierTooLong { length: usize },

    #[error("String too large: {size} bytes (max {MAX_STRING_SIZE})")]
    StringTooLarge { size: usize },

    #[error("Comment too long: {length} characters (max {MAX_COMMENT_LENGTH})")]
    CommentTooLong { length: usize },

    #[error("Too many tokens: {count} (max {MAX_TOKEN_COUNT})")]
    TooManyTokens { count: usize },
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::Unterminated { what: "comment", .. } => {
                codes::lexical::UNTERMINATED_COMMENT
            }
            LexerError::Unterminated { .. } => codes::lexical::UNTERMINATED_STRING,
            LexerError::IdentifierTooLong { .. } => codes::lexical::IDENTIFIER_TOO_LONG,
            LexerError::StringTooLarge { .. } => codes::lexical::STRING_TOO_LARGE,
            LexerError::CommentTooLong { .. } => codes::lexical::COMMENT_TOO_LONG,
            LexerError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
        }
    }

    /// Start of the unterminated construct; limit errors have no location
    pub fn span(&self) -> Option<Span> {
        match self {
            LexerError::Unterminated { line, .. } => {
                let start = Position::new(0, *line, 1);
                Some(Span::new(start, start))
            }
            _ => None,
        }
    }
}

/// Token counts gathered during one tokenization
#[derive(Debug, Default, Clone)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub keyword_tokens: usize,
    pub identifier_tokens: usize,
    pub variable_tokens: usize,
    pub comment_count: usize,
    pub doc_comment_count: usize,
    pub max_string_length: usize,
}

impl LexicalMetrics {
    fn record_token(&mut self, token: &Token) {
        self.total_tokens += 1;
        match token.kind {
            TokenKind::Identifier => self.identifier_tokens += 1,
            TokenKind::Variable => self.variable_tokens += 1,
            TokenKind::Comment => self.comment_count += 1,
            TokenKind::DocComment => self.doc_comment_count += 1,
            TokenKind::StringLiteral => {
                self.max_string_length = self.max_string_length.max(token.text.len())
            }
            kind if keyword_kind(kind.as_str()) == Some(kind) => self.keyword_tokens += 1,
            _ => {}
        }
    }
}

/// PHP lexical analyzer with compile-time security boundaries
#[derive(Debug, Default)]
pub struct LexicalAnalyzer {
    metrics: LexicalMetrics,
}

impl LexicalAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    /// Tokenize a processed file with file-aware logging
    pub fn tokenize_file_result(
        &mut self,
        file_result: &FileProcessingResult,
    ) -> Result<Vec<Token>, LexerError> {
        let file_path = file_result.metadata.path.display().to_string();

        log_debug!("Starting lexical analysis",
            "file" => file_path.as_str(),
            "line_count" => file_result.metadata.line_count,
            "max_tokens_allowed" => MAX_TOKEN_COUNT
        );

        match self.tokenize(&file_result.source) {
            Ok(tokens) => {
                log_success!(codes::success::TOKENIZATION_COMPLETE, "Tokenization completed",
                    "file" => file_path.as_str(),
                    "tokens" => self.metrics.total_tokens,
                    "identifiers" => self.metrics.identifier_tokens,
                    "doc_comments" => self.metrics.doc_comment_count
                );
                Ok(tokens)
            }
            Err(error) => {
                match error.span() {
                    Some(span) => log_error!(error.error_code(), &error.to_string(), span = span,
                        "file" => file_path.as_str()
                    ),
                    None => log_error!(error.error_code(), &error.to_string(),
                        "file" => file_path.as_str()
                    ),
                }
                Err(error)
            }
        }
    }

    /// Tokenize raw PHP source
    pub fn tokenize(&mut self, source: &str) -> Result<Vec<Token>, LexerError> {
        self.metrics = LexicalMetrics::default();
        let mut lexer = Lexer::new(source);
        lexer.run()?;

        for token in &lexer.tokens {
            self.metrics.record_token(token);
        }
        Ok(lexer.tokens)
    }
}

struct Lexer<'s> {
    source: &'s str,
    offset: usize,
    position: Position,
    in_php: bool,
    tokens: Vec<Token>,
}

impl<'s> Lexer<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            offset: 0,
            position: Position::start(),
            in_php: false,
            tokens: Vec::new(),
        }
    }

    fn rest(&self) -> &'s str {
        &self.source[self.offset..]
    }

    fn push(&mut self, kind: TokenKind, len: usize) -> Result<(), LexerError> {
        if self.tokens.len() >= MAX_TOKEN_COUNT {
            return Err(LexerError::TooManyTokens {
                count: self.tokens.len() + 1,
            });
        }

        let text = &self.source[self.offset..self.offset + len];
        let end = self.position.advance_str(text);
        self.tokens
            .push(Token::new(kind, text, Span::new(self.position, end)));
        self.offset += len;
        self.position = end;
        Ok(())
    }

    fn run(&mut self) -> Result<(), LexerError> {
        while self.offset < self.source.len() {
            if self.in_php {
                self.lex_php()?;
            } else {
                self.lex_inline_html()?;
            }
        }
        Ok(())
    }

    fn lex_inline_html(&mut self) -> Result<(), LexerError> {
        let rest = self.rest();
        let Some(tag_start) = rest.find("<?") else {
            return self.push(TokenKind::InlineHtml, rest.len());
        };

        if tag_start > 0 {
            self.push(TokenKind::InlineHtml, tag_start)?;
        }

        let rest = self.rest();
        let tag_len = if rest.get(..5).is_some_and(|t| t.eq_ignore_ascii_case("<?php")) {
            5
        } else if rest.starts_with("<?=") {
            3
        } else {
            2
        };
        self.in_php = true;
        self.push(TokenKind::OpenTag, tag_len)
    }

    fn lex_php(&mut self) -> Result<(), LexerError> {
        let rest = self.rest();
        let Some(c) = rest.chars().next() else {
            return Ok(());
        };

        if rest.starts_with("?>") {
            self.in_php = false;
            return self.push(TokenKind::CloseTag, 2);
        }

        if c.is_whitespace() {
            let len = rest
                .find(|ch: char| !ch.is_whitespace())
                .unwrap_or(rest.len());
            return self.push(TokenKind::Whitespace, len);
        }

        if rest.starts_with("/*") {
            return self.lex_block_comment();
        }

        if rest.starts_with("//") || c == '#' {
            let len = line_comment_len(rest);
            check_comment_length(len)?;
            return self.push(TokenKind::Comment, len);
        }

        if c == '$' && rest[1..].starts_with(is_ident_start) {
            let len = 1 + ident_len(&rest[1..]);
            return self.push(TokenKind::Variable, len);
        }

        if is_ident_start(c) {
            return self.lex_word();
        }

        if c == '\\' {
            return self.push(TokenKind::NsSeparator, 1);
        }

        if c == '\'' || c == '"' || c == '`' {
            return self.lex_quoted(c);
        }

        if rest.starts_with("<<<") {
            if let Some(len) = self.heredoc_len()? {
                check_string_size(len)?;
                return self.push(TokenKind::StringLiteral, len);
            }
        }

        if c.is_ascii_digit() || (c == '.' && rest[1..].starts_with(|d: char| d.is_ascii_digit()))
        {
            let len = number_len(rest);
            return self.push(TokenKind::NumberLiteral, len);
        }

        let single = match c {
            '{' => Some(TokenKind::OpenBrace),
            '}' => Some(TokenKind::CloseBrace),
            '(' => Some(TokenKind::OpenParen),
            ')' => Some(TokenKind::CloseParen),
            '[' => Some(TokenKind::OpenBracket),
            ']' => Some(TokenKind::CloseBracket),
            ',' => Some(TokenKind::Comma),
            ';' => Some(TokenKind::Semicolon),
            _ => None,
        };
        if let Some(kind) = single {
            return self.push(kind, 1);
        }

        if let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(**op)) {
            return self.push(TokenKind::Operator, op.len());
        }

        if c == '=' {
            return self.push(TokenKind::Assign, 1);
        }

        self.push(TokenKind::Operator, c.len_utf8())
    }

    fn lex_block_comment(&mut self) -> Result<(), LexerError> {
        let rest = self.rest();
        let Some(close) = rest[2..].find("*/") else {
            return Err(LexerError::Unterminated {
                what: "comment",
                line: self.position.line,
            });
        };

        let len = close + 4;
        check_comment_length(len)?;

        let is_doc = rest.starts_with("/**")
            && len > 4
            && rest[3..].starts_with(|ch: char| ch.is_whitespace());
        let kind = if is_doc {
            TokenKind::DocComment
        } else {
            TokenKind::Comment
        };
        self.push(kind, len)
    }

    fn lex_word(&mut self) -> Result<(), LexerError> {
        let len = ident_len(self.rest());
        if len > MAX_IDENTIFIER_LENGTH {
            return Err(LexerError::IdentifierTooLong { length: len });
        }

        let word = &self.rest()[..len];
        let kind = if self.follows_member_access() {
            TokenKind::Identifier
        } else {
            keyword_kind(word).unwrap_or(TokenKind::Identifier)
        };
        self.push(kind, len)
    }

    /// `Foo::class` and `$this->list` name members, not keywords
    fn follows_member_access(&self) -> bool {
        self.tokens
            .iter()
            .rev()
            .find(|t| !t.kind.is_trivia())
            .is_some_and(|t| matches!(t.text.as_str(), "->" | "?->" | "::"))
    }

    fn lex_quoted(&mut self, quote: char) -> Result<(), LexerError> {
        let rest = self.rest();
        let mut escaped = false;

        for (index, ch) in rest.char_indices().skip(1) {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == quote {
                let len = index + 1;
                check_string_size(len)?;
                return self.push(TokenKind::StringLiteral, len);
            }
        }

        Err(LexerError::Unterminated {
            what: "string",
            line: self.position.line,
        })
    }

    /// Length of a heredoc/nowdoc including its closing label
    ///
    /// Returns `None` when `<<<` is not followed by a valid opening label.
    fn heredoc_len(&self) -> Result<Option<usize>, LexerError> {
        let rest = self.rest();
        let header = rest[3..].trim_start_matches([' ', '\t']);
        let header = header
            .strip_prefix(['\'', '"'])
            .unwrap_or(header);
        let label_len = ident_len(header);
        if label_len == 0 {
            return Ok(None);
        }
        let label = &header[..label_len];

        let Some(first_newline) = rest.find('\n') else {
            return Ok(None);
        };

        let mut line_start = first_newline + 1;
        while line_start <= rest.len() {
            let line_end = rest[line_start..]
                .find('\n')
                .map(|i| line_start + i)
                .unwrap_or(rest.len());
            let line = &rest[line_start..line_end];
            let trimmed = line.trim_start_matches([' ', '\t']);

            if let Some(after) = trimmed.strip_prefix(label) {
                if !after.starts_with(is_ident_char) {
                    let indent = line.len() - trimmed.len();
                    return Ok(Some(line_start + indent + label.len()));
                }
            }

            if line_end == rest.len() {
                break;
            }
            line_start = line_end + 1;
        }

        Err(LexerError::Unterminated {
            what: "heredoc",
            line: self.position.line,
        })
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

fn ident_len(text: &str) -> usize {
    text.find(|c: char| !is_ident_char(c)).unwrap_or(text.len())
}

/// Line comments end before the newline or a closing `?>`
fn line_comment_len(text: &str) -> usize {
    let newline = text.find('\n').unwrap_or(text.len());
    let close_tag = text.find("?>").unwrap_or(text.len());
    newline.min(close_tag)
}

fn number_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let digits_from = |start: usize, accept: fn(u8) -> bool| {
        let mut i = start;
        while i < bytes.len() && (accept(bytes[i]) || bytes[i] == b'_') {
            i += 1;
        }
        i
    };

    if text.len() > 1 && bytes[0] == b'0' && matches!(bytes[1], b'x' | b'X') {
        return digits_from(2, |b| b.is_ascii_hexdigit());
    }
    if text.len() > 1 && bytes[0] == b'0' && matches!(bytes[1], b'b' | b'B') {
        return digits_from(2, |b| b == b'0' || b == b'1');
    }

    let mut end = digits_from(0, |b| b.is_ascii_digit());
    if end < bytes.len() && bytes[end] == b'.' {
        end = digits_from(end + 1, |b| b.is_ascii_digit());
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exponent = end + 1;
        if exponent < bytes.len() && matches!(bytes[exponent], b'+' | b'-') {
            exponent += 1;
        }
        if exponent < bytes.len() && bytes[exponent].is_ascii_digit() {
            end = digits_from(exponent, |b| b.is_ascii_digit());
        }
    }
    end
}

fn check_comment_length(len: usize) -> Result<(), LexerError> {
    if len > MAX_COMMENT_LENGTH {
        return Err(LexerError::CommentTooLong { length: len });
    }
    Ok(())
}

fn check_string_size(len: usize) -> Result<(), LexerError> {
    if len > MAX_STRING_SIZE {
        return Err(LexerError::StringTooLarge { size: len });
    }
    Ok(())
}

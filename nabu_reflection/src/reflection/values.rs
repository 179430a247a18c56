//! Literal text extraction for defaults, constant values and call arguments

use crate::tokens::{TokenCursor, TokenKind};

fn is_level_open(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::OpenParen | TokenKind::OpenBracket)
}

fn is_level_close(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::CloseParen | TokenKind::CloseBracket)
}

fn ends_value(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Comma | TokenKind::Semicolon | TokenKind::OpenBrace | TokenKind::CloseBrace
    ) || is_level_close(kind)
}

/// Text after the first `=` following the cursor
///
/// Collection stops at `,`, `;` or a closing `)` on the outer level, so
/// `$a = array(1, 2)` yields `array(1, 2)`. The cursor does not move.
pub fn find_default(cursor: &mut TokenCursor) -> Option<String> {
    let origin = cursor.key();
    let mut level = 0usize;
    let mut seen_assign = false;
    let mut text = String::new();

    while let Some(token) = cursor.next() {
        let kind = token.kind;
        if level == 0 && ends_value(kind) {
            break;
        }

        if is_level_open(kind) {
            level += 1;
        } else if is_level_close(kind) {
            level -= 1;
        }

        if seen_assign {
            text.push_str(&token.text);
        } else if kind == TokenKind::Assign {
            seen_assign = true;
        }
    }

    cursor.seek(origin);
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Advance to the next `,` or `;` on the outer level
///
/// Returns the kind found with the cursor on it. When the stream or the
/// enclosing block ends first, the cursor stays where it was.
pub fn skip_to_separator(cursor: &mut TokenCursor) -> Option<TokenKind> {
    let origin = cursor.key();
    let mut level = 0usize;

    while let Some(token) = cursor.next() {
        match token.kind {
            TokenKind::Comma | TokenKind::Semicolon if level == 0 => return Some(token.kind),
            kind if is_level_open(kind) || kind == TokenKind::OpenBrace => level += 1,
            kind if is_level_close(kind) || kind == TokenKind::CloseBrace => {
                if level == 0 {
                    break;
                }
                level -= 1;
            }
            _ => {}
        }
    }

    cursor.seek(origin);
    None
}

/// Split the tokens strictly between `start` and `end` on outer commas
pub fn split_arguments(cursor: &TokenCursor, start: usize, end: usize) -> Vec<String> {
    let mut arguments = vec![String::new()];
    let mut level = 0usize;

    for token in &cursor.tokens()[start + 1..end] {
        match token.kind {
            TokenKind::Comma if level == 0 => {
                arguments.push(String::new());
                continue;
            }
            kind if is_level_open(kind) => level += 1,
            kind if is_level_close(kind) => level = level.saturating_sub(1),
            _ => {}
        }
        if let Some(current) = arguments.last_mut() {
            current.push_str(&token.text);
        }
    }

    arguments.iter().map(|a| a.trim().to_string()).collect()
}

/// Strip one pair of matching outer quotes
pub fn unquote(text: &str) -> &str {
    for quote in ['\'', '"'] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return &text[1..text.len() - 1];
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize;
    use crate::tokens::Token;

    fn at_variable(tokens: &[Token], name: &str) -> usize {
        tokens.iter().position(|t| t.text == name).unwrap()
    }

    #[test]
    fn test_default_with_nested_parentheses() {
        let tokens = tokenize("<?php function f($a = array(1, max(2, 3)), $b) {}").unwrap();
        let mut cursor = TokenCursor::new(&tokens);
        let a = at_variable(&tokens, "$a");
        cursor.seek(a);

        assert_eq!(find_default(&mut cursor).as_deref(), Some("array(1, max(2, 3))"));
        assert_eq!(cursor.key(), a);

        cursor.seek(at_variable(&tokens, "$b"));
        assert_eq!(find_default(&mut cursor), None);
    }

    #[test]
    fn test_default_with_short_array() {
        let tokens = tokenize("<?php class A { public $a = ['x' => 1, 'y' => 2]; }").unwrap();
        let mut cursor = TokenCursor::new(&tokens);
        cursor.seek(at_variable(&tokens, "$a"));
        assert_eq!(find_default(&mut cursor).as_deref(), Some("['x' => 1, 'y' => 2]"));
    }

    #[test]
    fn test_skip_to_separator() {
        let tokens = tokenize("<?php $a = f(1, 2), $b;").unwrap();
        let mut cursor = TokenCursor::new(&tokens);
        cursor.seek(at_variable(&tokens, "$a"));

        assert_eq!(skip_to_separator(&mut cursor), Some(TokenKind::Comma));
        assert_eq!(skip_to_separator(&mut cursor), Some(TokenKind::Semicolon));
        assert_eq!(skip_to_separator(&mut cursor), None);
    }

    #[test]
    fn test_split_arguments_and_unquote() {
        let tokens = tokenize("<?php define('NAME', strtoupper('a, b'));").unwrap();
        let cursor = TokenCursor::new(&tokens);
        let open = tokens.iter().position(|t| t.kind == TokenKind::OpenParen).unwrap();
        let close = tokens.iter().rposition(|t| t.kind == TokenKind::CloseParen).unwrap();

        let arguments = split_arguments(&cursor, open, close);
        assert_eq!(arguments, vec!["'NAME'", "strtoupper('a, b')"]);
        assert_eq!(unquote(&arguments[0]), "NAME");
        assert_eq!(unquote("x"), "x");
    }
}

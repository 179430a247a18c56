//! Brace-delimited body scanning
//!
//! Declaration parsers compose these two walks: [`scan_body`] finds the
//! extent of a declaration's body while handing the tokens before it to
//! the caller, and [`body_tokens`] visits the top-level tokens inside it.

use super::error::ReflectionError;
use crate::config::compile_time::reflection::MAX_NESTING_DEPTH;
use crate::tokens::{TokenCursor, TokenKind};

/// Locate the `open`/`close` pair that starts after the cursor
///
/// Every non-punctuation token before the first `open` is dispatched to
/// `on_token` with the cursor positioned on it. A stray `close` before the
/// first `open` is skipped. The cursor is back at its starting position on
/// success.
pub fn scan_body<F>(
    cursor: &mut TokenCursor,
    open: TokenKind,
    close: TokenKind,
    mut on_token: F,
) -> Result<(usize, usize), ReflectionError>
where
    F: FnMut(&mut TokenCursor) -> Result<(), ReflectionError>,
{
    let origin = cursor.key();
    let origin_line = cursor.try_current().map(|t| t.line()).unwrap_or(1);

    let mut depth: isize = -1;
    let mut start = None;
    let mut position = origin + 1;

    while position < cursor.len() {
        let kind = cursor.tokens()[position].kind;

        if kind == open {
            if depth == -1 {
                start = Some(position);
                depth = 0;
            }
            depth += 1;
            if depth as usize > MAX_NESTING_DEPTH {
                return Err(ReflectionError::NestingTooDeep {
                    depth: depth as usize,
                    line: cursor.tokens()[position].line(),
                });
            }
        } else if kind == close {
            if depth != -1 {
                depth -= 1;
                if depth == 0 {
                    if let Some(start) = start {
                        cursor.seek(origin);
                        return Ok((start, position));
                    }
                }
            }
        } else if depth == -1 && !kind.is_punctuation() {
            cursor.seek(position);
            on_token(cursor)?;
            position = position.max(cursor.key());
        }

        position += 1;
    }

    cursor.seek(origin);
    Err(ReflectionError::Unterminated {
        open,
        line: start
            .and_then(|s| cursor.token_at(s))
            .map(|t| t.line())
            .unwrap_or(origin_line),
    })
}

/// Visit the tokens directly inside `range`, skipping nested braces
///
/// `on_token` receives every non-punctuation token at body level and may
/// move the cursor forward, e.g. past a method's own body. The cursor ends
/// on the closing token of the range.
pub fn body_tokens<F>(
    cursor: &mut TokenCursor,
    range: (usize, usize),
    mut on_token: F,
) -> Result<(), ReflectionError>
where
    F: FnMut(&mut TokenCursor) -> Result<(), ReflectionError>,
{
    let (start, end) = range;
    let mut depth = 0usize;
    let mut position = start + 1;

    while position < end {
        let kind = cursor.tokens()[position].kind;
        match kind {
            TokenKind::OpenBrace => depth += 1,
            TokenKind::CloseBrace => depth = depth.saturating_sub(1),
            _ if depth == 0 && !kind.is_punctuation() => {
                cursor.seek(position);
                on_token(cursor)?;
                position = position.max(cursor.key());
            }
            _ => {}
        }
        position += 1;
    }

    cursor.seek(end);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize;
    use crate::tokens::Token;
    use assert_matches::assert_matches;

    const NESTED: &str = "<?php
class A {
    function b() {
        if (true) { echo 1; }
    }
}
class C {}";

    fn position_of(tokens: &[Token], kind: TokenKind) -> usize {
        tokens.iter().position(|t| t.kind == kind).unwrap()
    }

    #[test]
    fn test_brace_matching_on_nested_class() {
        let tokens = tokenize(NESTED).unwrap();
        let mut cursor = TokenCursor::new(&tokens);
        let class = position_of(&tokens, TokenKind::Class);
        cursor.seek(class);

        let (start, end) =
            scan_body(&mut cursor, TokenKind::OpenBrace, TokenKind::CloseBrace, |_| Ok(())).unwrap();

        assert_eq!(tokens[start].kind, TokenKind::OpenBrace);
        assert_eq!(tokens[start].line(), 2);
        assert_eq!(tokens[end].kind, TokenKind::CloseBrace);
        assert_eq!(tokens[end].line(), 6);
        assert_eq!(cursor.key(), class);
    }

    #[test]
    fn test_pre_brace_tokens_are_dispatched() {
        let tokens = tokenize("<?php class Foo extends Bar { }").unwrap();
        let mut cursor = TokenCursor::new(&tokens);
        cursor.seek(position_of(&tokens, TokenKind::Class));

        let mut seen = Vec::new();
        scan_body(&mut cursor, TokenKind::OpenBrace, TokenKind::CloseBrace, |c| {
            if c.current().kind != TokenKind::Whitespace {
                seen.push(c.current().text.clone());
            }
            Ok(())
        })
        .unwrap();

        assert_eq!(seen, vec!["Foo", "extends", "Bar"]);
    }

    #[test]
    fn test_stray_closer_before_opener_is_ignored() {
        let tokens = tokenize("<?php x } { y }").unwrap();
        let mut cursor = TokenCursor::new(&tokens);
        let (start, end) =
            scan_body(&mut cursor, TokenKind::OpenBrace, TokenKind::CloseBrace, |_| Ok(())).unwrap();
        assert_eq!(tokens[start].text, "{");
        assert_eq!(end, tokens.len() - 1);
    }

    #[test]
    fn test_unterminated_body() {
        let tokens = tokenize("<?php\nclass A {\n function b() {\n").unwrap();
        let mut cursor = TokenCursor::new(&tokens);
        cursor.seek(position_of(&tokens, TokenKind::Class));

        assert_matches!(
            scan_body(&mut cursor, TokenKind::OpenBrace, TokenKind::CloseBrace, |_| Ok(())),
            Err(ReflectionError::Unterminated { open: TokenKind::OpenBrace, line: 2 })
        );
    }

    #[test]
    fn test_missing_opener_is_unterminated() {
        let tokens = tokenize("<?php abstract function a();").unwrap();
        let mut cursor = TokenCursor::new(&tokens);
        assert_matches!(
            scan_body(&mut cursor, TokenKind::OpenBrace, TokenKind::CloseBrace, |_| Ok(())),
            Err(ReflectionError::Unterminated { .. })
        );
    }

    #[test]
    fn test_body_tokens_skip_nested_braces() {
        let tokens = tokenize(NESTED).unwrap();
        let mut cursor = TokenCursor::new(&tokens);
        cursor.seek(position_of(&tokens, TokenKind::Class));
        let range =
            scan_body(&mut cursor, TokenKind::OpenBrace, TokenKind::CloseBrace, |_| Ok(())).unwrap();

        let mut seen = Vec::new();
        body_tokens(&mut cursor, range, |c| {
            let token = c.current();
            if !token.kind.is_trivia() {
                seen.push(token.text.clone());
            }
            Ok(())
        })
        .unwrap();

        assert_eq!(seen, vec!["function", "b"]);
        assert_eq!(cursor.key(), range.1);
    }
}

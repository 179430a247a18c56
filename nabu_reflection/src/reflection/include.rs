use super::descriptors::{IncludeDescriptor, IncludeKind};
use crate::tokens::{TokenCursor, TokenKind};

fn include_kind(kind: TokenKind) -> Option<IncludeKind> {
    match kind {
        TokenKind::Include => Some(IncludeKind::Include),
        TokenKind::IncludeOnce => Some(IncludeKind::IncludeOnce),
        TokenKind::Require => Some(IncludeKind::Require),
        TokenKind::RequireOnce => Some(IncludeKind::RequireOnce),
        _ => None,
    }
}

/// Parse an include/require expression with the cursor on the keyword
///
/// The target is the text up to `;` (or `?>`), without one pair of
/// enclosing parentheses. The cursor ends on the last consumed token.
pub fn parse_include(cursor: &mut TokenCursor) -> Option<IncludeDescriptor> {
    let keyword = cursor.current();
    let kind = include_kind(keyword.kind)?;

    let mut target = String::new();
    let mut last = cursor.key();
    while let Some(token) = cursor.next() {
        if token.kind == TokenKind::CloseTag {
            break;
        }
        last = cursor.key();
        if token.kind == TokenKind::Semicolon {
            break;
        }
        target.push_str(&token.text);
    }
    cursor.seek(last);

    Some(IncludeDescriptor {
        kind,
        target: strip_outer_parens(target.trim()).to_string(),
        line: keyword.line(),
    })
}

/// Remove parentheses that wrap the whole expression
fn strip_outer_parens(text: &str) -> &str {
    let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) else {
        return text;
    };

    let mut depth = 0i32;
    for c in inner.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    // `(a) . (b)`: the first paren closes early
                    return text;
                }
            }
            _ => {}
        }
    }
    inner.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn includes_of(source: &str) -> Vec<IncludeDescriptor> {
        let tokens = crate::lexical::tokenize(source).unwrap();
        let mut cursor = TokenCursor::new(&tokens);
        let mut found = Vec::new();
        let mut position = 0;
        while position < tokens.len() {
            if tokens[position].kind.is_include() {
                cursor.seek(position);
                found.extend(parse_include(&mut cursor));
                position = cursor.key();
            }
            position += 1;
        }
        found
    }

    #[test]
    fn test_include_targets() {
        let found = includes_of(
            "<?php\nrequire_once 'a.php';\ninclude(__DIR__ . '/b.php');\nrequire ('c') . ('d');",
        );
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].kind, IncludeKind::RequireOnce);
        assert_eq!(found[0].target, "'a.php'");
        assert_eq!(found[0].line, 2);
        assert_eq!(found[1].kind, IncludeKind::Include);
        assert_eq!(found[1].target, "__DIR__ . '/b.php'");
        assert_eq!(found[2].target, "('c') . ('d')");
    }

    #[test]
    fn test_include_ends_at_close_tag() {
        let found = includes_of("<?php include 'x.php' ?>html");
        assert_eq!(found[0].target, "'x.php'");
    }
}

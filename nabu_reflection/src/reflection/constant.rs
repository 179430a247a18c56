use super::descriptors::ConstantDescriptor;
use super::docblock::{find_preceding_doc_comment, warn_missing};
use super::types::{next_significant, previous_significant};
use super::values::{find_default, skip_to_separator, split_arguments, unquote};
use super::ReflectionError;
use crate::tokens::{TokenCursor, TokenKind};

/// Parse `const A = 1, B = 2;` with the cursor on `const`
///
/// A typed constant (`const int A = 1`) takes the last name before `=`.
/// The cursor ends on the closing `;`.
pub fn parse_constants(cursor: &mut TokenCursor) -> Result<Vec<ConstantDescriptor>, ReflectionError> {
    let line = cursor.current().line();
    let doc_block = find_preceding_doc_comment(cursor);
    let mut constants = Vec::new();

    loop {
        let Some(name_position) = constant_name(cursor) else {
            if constants.is_empty() {
                return Err(ReflectionError::MissingName {
                    what: "constant",
                    line,
                });
            }
            break;
        };
        cursor.seek(name_position);

        let name = cursor.current();
        if doc_block.is_none() {
            warn_missing("constant", &name.text, name.line());
        }
        constants.push(ConstantDescriptor {
            name: name.text.clone(),
            value: find_default(cursor).unwrap_or_default(),
            doc_block: doc_block.clone(),
            line: name.line(),
        });

        if skip_to_separator(cursor) != Some(TokenKind::Comma) {
            break;
        }
    }

    Ok(constants)
}

/// Last identifier between the cursor and the next `=`, `,` or `;`
fn constant_name(cursor: &TokenCursor) -> Option<usize> {
    let mut name = None;
    for position in cursor.key() + 1..cursor.len() {
        match cursor.tokens()[position].kind {
            TokenKind::Identifier => name = Some(position),
            TokenKind::Assign | TokenKind::Comma | TokenKind::Semicolon => break,
            _ => {}
        }
    }
    name
}

/// Whether the `define` identifier under the cursor is a global call
pub fn is_define_call(cursor: &TokenCursor) -> bool {
    let tokens = cursor.tokens();
    let is_member = previous_significant(cursor).is_some_and(|p| {
        matches!(tokens[p].text.as_str(), "->" | "?->" | "::") || tokens[p].kind == TokenKind::Function
    });
    let is_call = next_significant(cursor).is_some_and(|p| tokens[p].kind == TokenKind::OpenParen);

    cursor.current().is_word("define") && is_call && !is_member
}

/// Parse `define('NAME', value)` with the cursor on `define`
///
/// The cursor ends on the closing `)`.
pub fn parse_define(cursor: &mut TokenCursor) -> Result<ConstantDescriptor, ReflectionError> {
    let token = cursor.current();
    let line = token.line();
    let doc_block = find_preceding_doc_comment(cursor);

    let (start, end) = match cursor.token_ids_of_pair(TokenKind::OpenParen, TokenKind::CloseParen) {
        (Some(start), Some(end)) => (start, end),
        _ => {
            return Err(ReflectionError::Unterminated {
                open: TokenKind::OpenParen,
                line,
            })
        }
    };

    let arguments = split_arguments(cursor, start, end);
    let name = arguments
        .first()
        .map(|a| unquote(a).to_string())
        .unwrap_or_default();
    if name.is_empty() {
        return Err(ReflectionError::MissingName {
            what: "constant",
            line,
        });
    }

    if doc_block.is_none() {
        warn_missing("constant", &name, line);
    }

    cursor.seek(end);
    Ok(ConstantDescriptor {
        name,
        value: arguments.get(1).cloned().unwrap_or_default(),
        doc_block,
        line,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use crate::lexical::tokenize;

    fn on_first(tokens: &[crate::tokens::Token], text: &str) -> usize {
        tokens.iter().position(|t| t.text == text).unwrap()
    }

    #[test]
    fn test_constant_list() {
        let tokens = tokenize("<?php class A { const A = 1, B = 'two'; }").unwrap();
        let mut cursor = TokenCursor::new(&tokens);
        cursor.seek(on_first(&tokens, "const"));

        let constants = parse_constants(&mut cursor).unwrap();
        let pairs: Vec<_> = constants
            .iter()
            .map(|c| (c.name.as_str(), c.value.as_str()))
            .collect();
        assert_eq!(pairs, vec![("A", "1"), ("B", "'two'")]);
        assert_eq!(cursor.current().kind, TokenKind::Semicolon);
    }

    #[test]
    fn test_typed_constant() {
        let tokens = tokenize("<?php const int LIMIT = 10;").unwrap();
        let mut cursor = TokenCursor::new(&tokens);
        cursor.seek(on_first(&tokens, "const"));

        let constants = parse_constants(&mut cursor).unwrap();
        assert_eq!(constants[0].name, "LIMIT");
        assert_eq!(constants[0].value, "10");
    }

    #[test]
    fn test_define() {
        let tokens =
            tokenize("<?php\n/** The answer. */\ndefine('ANSWER', 6 * (3 + 4));\n$x->define('NO', 1);")
                .unwrap();
        let mut cursor = TokenCursor::new(&tokens);
        let define = on_first(&tokens, "define");
        cursor.seek(define);
        assert!(is_define_call(&cursor));

        let constant = parse_define(&mut cursor).unwrap();
        assert_eq!(constant.name, "ANSWER");
        assert_eq!(constant.value, "6 * (3 + 4)");
        assert_eq!(constant.line, 3);
        assert!(constant.doc_block.is_some());
        assert_eq!(cursor.current().kind, TokenKind::CloseParen);

        let method_call = tokens.iter().rposition(|t| t.text == "define").unwrap();
        cursor.seek(method_call);
        assert!(!is_define_call(&cursor));
    }

    #[test]
    fn test_define_without_name() {
        let tokens = tokenize("<?php define('', 1);").unwrap();
        let mut cursor = TokenCursor::new(&tokens);
        cursor.seek(on_first(&tokens, "define"));
        assert_matches!(
            parse_define(&mut cursor),
            Err(ReflectionError::MissingName { what: "constant", .. })
        );
    }
}

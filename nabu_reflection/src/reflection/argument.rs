use super::descriptors::ArgumentDescriptor;
use super::values::find_default;
use crate::tokens::{TokenCursor, TokenKind};

const ARGUMENT_STOPS: &[TokenKind] = &[TokenKind::Comma, TokenKind::OpenParen];

/// Parse the argument whose variable is under the cursor
pub fn parse_argument(cursor: &mut TokenCursor) -> ArgumentDescriptor {
    let token = cursor.current();

    ArgumentDescriptor {
        name: token.text.clone(),
        type_hint: find_type_hint(cursor),
        default_value: find_default(cursor),
        line: token.line(),
    }
}

/// Class-like hint before the variable, falling back to `array`
fn find_type_hint(cursor: &mut TokenCursor) -> Option<String> {
    let origin = cursor.key();

    if cursor
        .goto_previous_by_type(&[TokenKind::Identifier], 5, ARGUMENT_STOPS)
        .is_some()
    {
        let tokens = cursor.tokens();
        let mut first = cursor.key();
        while first > 0
            && matches!(
                tokens[first - 1].kind,
                TokenKind::Identifier | TokenKind::NsSeparator
            )
        {
            first -= 1;
        }
        let hint: String = tokens[first..=cursor.key()]
            .iter()
            .map(|t| t.text.as_str())
            .collect();
        cursor.seek(origin);
        return Some(hint);
    }

    cursor
        .find_previous_by_type(&[TokenKind::Array], 5, ARGUMENT_STOPS)
        .map(|token| token.text.clone())
}

use super::descriptors::PropertyDescriptor;
use super::docblock::{find_preceding_doc_comment, warn_missing};
use super::modifiers::Modifiers;
use super::values::{find_default, skip_to_separator};
use super::ReflectionError;
use crate::tokens::{TokenCursor, TokenKind};

/// Parse the property declaration starting at the variable under the cursor
///
/// `public $a = 1, $b;` yields two properties sharing the modifiers and the
/// doc comment of the declaration. The cursor ends on the closing `;`.
pub fn parse_properties(cursor: &mut TokenCursor) -> Result<Vec<PropertyDescriptor>, ReflectionError> {
    let modifiers = Modifiers::probe(cursor);
    let doc_block = find_preceding_doc_comment(cursor);
    let mut properties = Vec::new();

    loop {
        let token = cursor.current();
        if doc_block.is_none() {
            warn_missing("property", &token.text, token.line());
        }

        properties.push(PropertyDescriptor {
            name: token.text.clone(),
            visibility: modifiers.visibility,
            is_static: modifiers.is_static,
            is_final: modifiers.is_final,
            default_value: find_default(cursor),
            doc_block: doc_block.clone(),
            line: token.line(),
        });

        match skip_to_separator(cursor) {
            Some(TokenKind::Comma) => {
                if cursor
                    .goto_next_by_type(&[TokenKind::Variable], 0, &[TokenKind::Semicolon])
                    .is_none()
                {
                    break;
                }
            }
            _ => break,
        }
    }

    Ok(properties)
}

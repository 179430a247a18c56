use super::descriptors::Visibility;
use crate::tokens::{TokenCursor, TokenKind};

const MEMBER_STOPS: &[TokenKind] = &[TokenKind::OpenBrace, TokenKind::Semicolon];
const DECLARATION_STOPS: &[TokenKind] = &[TokenKind::CloseBrace];

/// Modifier keywords in front of a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modifiers {
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_final: bool,
}

impl Modifiers {
    /// Probe backwards from the defining token; the cursor does not move
    ///
    /// Visibility is checked as public, then private, then protected, each
    /// later hit overriding the earlier one.
    pub fn probe(cursor: &mut TokenCursor) -> Self {
        let mut visibility = Visibility::Public;
        if cursor
            .find_previous_by_type(&[TokenKind::Private], 5, MEMBER_STOPS)
            .is_some()
        {
            visibility = Visibility::Private;
        }
        if cursor
            .find_previous_by_type(&[TokenKind::Protected], 5, MEMBER_STOPS)
            .is_some()
        {
            visibility = Visibility::Protected;
        }

        Self {
            visibility,
            is_static: cursor
                .find_previous_by_type(&[TokenKind::Static], 5, MEMBER_STOPS)
                .is_some(),
            is_abstract: cursor
                .find_previous_by_type(&[TokenKind::Abstract], 5, DECLARATION_STOPS)
                .is_some(),
            is_final: cursor
                .find_previous_by_type(&[TokenKind::Final], 5, DECLARATION_STOPS)
                .is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize;

    fn probe_before(source: &str, kind: TokenKind) -> Modifiers {
        let tokens = tokenize(source).unwrap();
        let mut cursor = TokenCursor::new(&tokens);
        let position = tokens.iter().rposition(|t| t.kind == kind).unwrap();
        cursor.seek(position);
        let modifiers = Modifiers::probe(&mut cursor);
        assert_eq!(cursor.key(), position);
        modifiers
    }

    #[test]
    fn test_visibility_defaults_to_public() {
        let m = probe_before("<?php class A { function f() {} }", TokenKind::Function);
        assert_eq!(m.visibility, Visibility::Public);
        assert!(!m.is_static && !m.is_abstract && !m.is_final);
    }

    #[test]
    fn test_visibility_override_order() {
        // Protected is probed last and wins over an earlier private hit
        let m = probe_before("<?php class A { private protected function f() {} }", TokenKind::Function);
        assert_eq!(m.visibility, Visibility::Protected);

        let m = probe_before("<?php class A { private static function f() {} }", TokenKind::Function);
        assert_eq!(m.visibility, Visibility::Private);
        assert!(m.is_static);
    }

    #[test]
    fn test_modifiers_do_not_leak_across_members() {
        let m = probe_before(
            "<?php class A { private static $a; function f() {} }",
            TokenKind::Function,
        );
        assert_eq!(m.visibility, Visibility::Public);
        assert!(!m.is_static);
    }

    #[test]
    fn test_abstract_and_final() {
        let m = probe_before("<?php abstract class A { final public function f() {} }", TokenKind::Function);
        assert!(m.is_final);
        assert!(!m.is_abstract);

        let m = probe_before("<?php abstract class A {}", TokenKind::Class);
        assert!(m.is_abstract);
    }
}

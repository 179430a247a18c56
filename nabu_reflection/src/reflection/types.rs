//! Qualified names and type expansion

use crate::tokens::{TokenCursor, TokenKind};
use std::collections::BTreeMap;

/// Names that are never namespace-qualified
pub const SCALAR_TYPES: &[&str] = &[
    "string", "int", "integer", "bool", "boolean", "float", "double", "object", "mixed", "array",
    "resource", "void", "null", "callback", "false", "true", "self", "static", "callable",
    "iterable", "$this",
];

pub const DEFAULT_NAMESPACE: &str = "default";

/// Expand each member of a `|` union to its fully qualified form
///
/// Scalars and names starting with `\` are returned unchanged. A leading
/// `namespace\` is replaced with `namespace`; an aliased first segment is
/// swapped for its target; any other relative name is prefixed with the
/// current namespace unless that namespace is the default one.
pub fn expand_type(ty: &str, namespace: &str, aliases: &BTreeMap<String, String>) -> String {
    ty.split('|')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| expand_single(part, namespace, aliases))
        .collect::<Vec<_>>()
        .join("|")
}

fn expand_single(part: &str, namespace: &str, aliases: &BTreeMap<String, String>) -> String {
    let (base, suffix) = match part.strip_suffix("[]") {
        Some(base) => (base, "[]"),
        None => (part, ""),
    };

    if base.starts_with('\\') || SCALAR_TYPES.contains(&base.to_ascii_lowercase().as_str()) {
        return part.to_string();
    }

    let mut segments = base.splitn(2, '\\');
    let first = segments.next().unwrap_or_default();
    let rest = segments.next();

    let expanded = if first.eq_ignore_ascii_case("namespace") {
        qualify(namespace, rest.unwrap_or_default())
    } else if let Some(target) = aliases.get(first) {
        match rest {
            Some(rest) => format!("\\{}\\{}", target.trim_start_matches('\\'), rest),
            None => format!("\\{}", target.trim_start_matches('\\')),
        }
    } else {
        qualify(namespace, base)
    };

    format!("{}{}", expanded, suffix)
}

fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() || namespace == DEFAULT_NAMESPACE {
        format!("\\{}", name)
    } else {
        format!("\\{}\\{}", namespace.trim_matches('\\'), name)
    }
}

/// Read a `\`-separated name starting on the token after the cursor
///
/// Leading trivia is skipped. On success the cursor rests on the last
/// token of the name; otherwise it does not move.
pub fn read_qualified_name(cursor: &mut TokenCursor) -> Option<String> {
    let tokens = cursor.tokens();
    let mut position = cursor.key() + 1;
    while tokens.get(position).is_some_and(|t| t.kind.is_trivia()) {
        position += 1;
    }

    let mut name = String::new();
    let mut last = None;
    while let Some(token) = tokens.get(position) {
        match token.kind {
            TokenKind::Identifier | TokenKind::NsSeparator => {
                name.push_str(&token.text);
                last = Some(position);
            }
            _ => break,
        }
        position += 1;
    }

    let last = last?;
    cursor.seek(last);
    Some(name)
}

/// Extend the identifier under the cursor with directly following segments
pub fn extend_qualified_name(cursor: &mut TokenCursor) -> String {
    let tokens = cursor.tokens();
    let mut name = cursor.current().text.clone();
    let mut position = cursor.key() + 1;

    while let (Some(separator), Some(segment)) = (tokens.get(position), tokens.get(position + 1)) {
        if separator.kind != TokenKind::NsSeparator || segment.kind != TokenKind::Identifier {
            break;
        }
        name.push('\\');
        name.push_str(&segment.text);
        position += 2;
    }

    cursor.seek(position - 1);
    name
}

/// Read names separated by commas, e.g. an `implements` list
pub fn read_name_list(cursor: &mut TokenCursor) -> Vec<String> {
    let mut names = Vec::new();
    while let Some(name) = read_qualified_name(cursor) {
        names.push(name);
        match next_significant(cursor) {
            Some(position) if cursor.tokens()[position].kind == TokenKind::Comma => {
                cursor.seek(position)
            }
            _ => break,
        }
    }
    names
}

/// Position of the first non-trivia token after the cursor
pub fn next_significant(cursor: &TokenCursor) -> Option<usize> {
    (cursor.key() + 1..cursor.len()).find(|&p| !cursor.tokens()[p].kind.is_trivia())
}

/// Position of the last non-trivia token before the cursor
pub fn previous_significant(cursor: &TokenCursor) -> Option<usize> {
    (0..cursor.key()).rev().find(|&p| !cursor.tokens()[p].kind.is_trivia())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize;

    fn aliases() -> BTreeMap<String, String> {
        let mut aliases = BTreeMap::new();
        aliases.insert("Response".to_string(), "Symfony\\Http\\Response".to_string());
        aliases.insert("Orm".to_string(), "Doctrine\\ORM".to_string());
        aliases
    }

    #[test]
    fn test_scalars_and_absolute_names_are_untouched() {
        assert_eq!(expand_type("int|string[]|null", "App", &aliases()), "int|string[]|null");
        assert_eq!(expand_type("\\Foo\\Bar", "App", &aliases()), "\\Foo\\Bar");
    }

    #[test]
    fn test_aliases_expand_first_segment() {
        assert_eq!(
            expand_type("Response", "App", &aliases()),
            "\\Symfony\\Http\\Response"
        );
        assert_eq!(
            expand_type("Orm\\EntityManager[]", "App", &aliases()),
            "\\Doctrine\\ORM\\EntityManager[]"
        );
    }

    #[test]
    fn test_single_segment_takes_current_namespace() {
        assert_eq!(expand_type("User", "App\\Model", &aliases()), "\\App\\Model\\User");
        assert_eq!(expand_type("User", DEFAULT_NAMESPACE, &aliases()), "\\User");
        assert_eq!(
            expand_type("namespace\\User|int", "App", &aliases()),
            "\\App\\User|int"
        );
    }

    #[test]
    fn test_read_name_list() {
        let tokens = tokenize("<?php implements A, \\B\\C ,D {").unwrap();
        let mut cursor = TokenCursor::new(&tokens);
        let keyword = tokens.iter().position(|t| t.kind == TokenKind::Implements).unwrap();
        cursor.seek(keyword);

        assert_eq!(read_name_list(&mut cursor), vec!["A", "\\B\\C", "D"]);
        assert_eq!(cursor.current().text, "D");
    }

    #[test]
    fn test_read_qualified_name_without_name_keeps_cursor() {
        let tokens = tokenize("<?php extends {").unwrap();
        let mut cursor = TokenCursor::new(&tokens);
        cursor.seek(1);
        assert!(read_qualified_name(&mut cursor).is_none());
        assert_eq!(cursor.key(), 1);
    }
}

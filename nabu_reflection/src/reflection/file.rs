//! File-level reflection
//!
//! Walks the top-level tokens of a file, tracking namespace and `use`
//! aliases, and dispatches each declaration to its parser.

use super::class::{parse_class, parse_interface};
use super::constant::{is_define_call, parse_constants, parse_define};
use super::descriptors::{FileDescriptor, FunctionKind, Marker};
use super::docblock::DocBlock;
use super::function::parse_function;
use super::include::parse_include;
use super::types::{next_significant, DEFAULT_NAMESPACE};
use super::{Context, ReflectionError};
use crate::config::compile_time::reflection::MAX_MARKER_COUNT;
use crate::config::runtime::ReflectionPreferences;
use crate::logging::codes;
use crate::tokens::{Token, TokenCursor, TokenKind};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::borrow::Cow;
use std::collections::BTreeMap;

const FILE_DOC_STOPS: &[TokenKind] = &[TokenKind::Class, TokenKind::Interface, TokenKind::Namespace];

#[derive(Debug, Clone)]
pub struct FileReflector {
    marker_terms: Vec<String>,
    include_closures: bool,
}

impl Default for FileReflector {
    fn default() -> Self {
        Self::new()
    }
}

impl FileReflector {
    pub fn new() -> Self {
        Self {
            marker_terms: vec!["TODO".to_string(), "FIXME".to_string()],
            include_closures: false,
        }
    }

    pub fn from_preferences(preferences: &ReflectionPreferences) -> Self {
        Self {
            marker_terms: preferences.marker_terms.clone(),
            include_closures: preferences.include_closures,
        }
    }

    pub fn with_marker_terms(mut self, terms: Vec<String>) -> Self {
        self.marker_terms = terms;
        self
    }

    pub fn with_closures(mut self, include: bool) -> Self {
        self.include_closures = include;
        self
    }

    /// Reflect one tokenized file
    ///
    /// Any structural error aborts the whole file; no partial descriptor is
    /// returned.
    pub fn reflect(
        &self,
        path: &str,
        source: &str,
        tokens: &[Token],
    ) -> Result<FileDescriptor, ReflectionError> {
        let mut file = FileDescriptor {
            path: path.to_string(),
            hash: content_hash(source),
            doc_block: None,
            namespace_aliases: BTreeMap::new(),
            includes: Vec::new(),
            constants: Vec::new(),
            functions: Vec::new(),
            interfaces: Vec::new(),
            classes: Vec::new(),
            markers: self.find_markers(source),
        };

        if tokens.is_empty() {
            return Ok(file);
        }

        let (doc_block, tokens) = take_file_doc_block(tokens);
        file.doc_block = doc_block;

        let mut ctx = Context::default();
        let mut cursor = TokenCursor::new(&tokens);

        loop {
            let Some(token) = cursor.try_current() else {
                break;
            };

            match token.kind {
                TokenKind::Namespace => parse_namespace(&mut cursor, &mut ctx),
                TokenKind::Use => parse_use(&mut cursor, &mut ctx.namespace_aliases),
                TokenKind::Class => file.classes.push(parse_class(&mut cursor, &ctx)?),
                TokenKind::Interface => file.interfaces.push(parse_interface(&mut cursor, &ctx)?),
                TokenKind::Function => {
                    let function = parse_function(&mut cursor, &ctx)?;
                    if function.kind == FunctionKind::Function || self.include_closures {
                        file.functions.push(function);
                    }
                }
                TokenKind::Const => file.constants.extend(parse_constants(&mut cursor)?),
                TokenKind::Identifier if is_define_call(&cursor) => {
                    file.constants.push(parse_define(&mut cursor)?)
                }
                kind if kind.is_include() => file.includes.extend(parse_include(&mut cursor)),
                _ => {}
            }

            if cursor.next().is_none() {
                break;
            }
        }

        file.namespace_aliases = ctx.namespace_aliases;

        crate::log_success!(codes::success::REFLECTION_COMPLETE, "Reflection complete",
            "file" => path,
            "classes" => file.classes.len(),
            "interfaces" => file.interfaces.len(),
            "functions" => file.functions.len(),
            "constants" => file.constants.len(),
            "markers" => file.markers.len()
        );

        Ok(file)
    }

    /// `// TODO: message` style markers, one per line
    pub fn find_markers(&self, source: &str) -> Vec<Marker> {
        let terms: Vec<String> = self
            .marker_terms
            .iter()
            .filter(|t| !t.is_empty())
            .map(|t| regex::escape(t))
            .collect();
        if terms.is_empty() {
            return Vec::new();
        }

        let pattern = format!(r"//\s*({}):?\s*(.*)", terms.join("|"));
        let Ok(regex) = Regex::new(&pattern) else {
            return Vec::new();
        };

        source
            .lines()
            .enumerate()
            .filter_map(|(index, line)| {
                regex.captures(line).map(|captures| Marker {
                    kind: captures[1].to_string(),
                    message: captures[2].trim().to_string(),
                    line: index as u32 + 1,
                })
            })
            .take(MAX_MARKER_COUNT)
            .collect()
    }
}

/// Reflect with default settings
pub fn reflect(path: &str, source: &str, tokens: &[Token]) -> Result<FileDescriptor, ReflectionError> {
    FileReflector::new().reflect(path, source, tokens)
}

fn content_hash(source: &str) -> String {
    Sha256::digest(source.as_bytes())
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

/// Split off the file-level doc comment
///
/// The first doc comment counts for the file only when it carries
/// `@package` and no class, interface or namespace follows it closely.
/// The consumed comment is downgraded to a plain comment in the returned
/// tokens so the next declaration does not claim it as well.
fn take_file_doc_block(tokens: &[Token]) -> (Option<DocBlock>, Cow<'_, [Token]>) {
    let mut cursor = TokenCursor::new(tokens);
    if cursor
        .goto_next_by_type(&[TokenKind::DocComment], 10, FILE_DOC_STOPS)
        .is_none()
    {
        return (None, Cow::Borrowed(tokens));
    }

    let position = cursor.key();
    let token = cursor.current();
    let doc = DocBlock::parse(&token.text, token.line());
    let owns_declaration = cursor.find_next_by_type(FILE_DOC_STOPS, 5, &[TokenKind::DocComment]).is_some();

    if !doc.has_tag("package") || owns_declaration {
        return (None, Cow::Borrowed(tokens));
    }

    let mut owned = tokens.to_vec();
    owned[position].kind = TokenKind::Comment;
    (Some(doc), Cow::Owned(owned))
}

/// `namespace A\B;` or `namespace A\B { ... }`; `namespace\f()` is skipped
fn parse_namespace(cursor: &mut TokenCursor, ctx: &mut Context) {
    if next_significant(cursor).is_some_and(|p| cursor.tokens()[p].kind == TokenKind::NsSeparator) {
        return;
    }

    let mut parts = Vec::new();
    while let Some(token) = cursor.goto_next_by_type(
        &[TokenKind::Identifier],
        5,
        &[TokenKind::Semicolon, TokenKind::OpenBrace],
    ) {
        parts.push(token.text.as_str());
    }

    ctx.namespace = if parts.is_empty() {
        DEFAULT_NAMESPACE.to_string()
    } else {
        parts.join("\\")
    };
}

/// `use A\B, C\D as E;`, including `use function` and group syntax
///
/// The cursor ends on the closing `;`.
fn parse_use(cursor: &mut TokenCursor, aliases: &mut BTreeMap<String, String>) {
    let mut prefix = String::new();
    let mut name = String::new();
    let mut alias: Option<String> = None;
    let mut expect_alias = false;

    let mut finish = |prefix: &str, name: &mut String, alias: &mut Option<String>| {
        let fqn = format!("{}{}", prefix, name);
        let fqn = fqn.trim_start_matches('\\');
        if !fqn.is_empty() && !fqn.ends_with('\\') {
            let key = alias
                .take()
                .unwrap_or_else(|| fqn.rsplit('\\').next().unwrap_or(fqn).to_string());
            aliases.insert(key, fqn.to_string());
        }
        name.clear();
        *alias = None;
    };

    while let Some(token) = cursor.next() {
        match token.kind {
            TokenKind::Semicolon | TokenKind::CloseTag => break,
            TokenKind::Function | TokenKind::Const if name.is_empty() => {}
            TokenKind::As => expect_alias = true,
            TokenKind::Identifier if expect_alias => {
                alias = Some(token.text.clone());
                expect_alias = false;
            }
            TokenKind::Identifier | TokenKind::NsSeparator => name.push_str(&token.text),
            TokenKind::OpenBrace => {
                prefix = std::mem::take(&mut name);
            }
            TokenKind::Comma | TokenKind::CloseBrace => finish(&prefix, &mut name, &mut alias),
            _ => {}
        }
    }

    finish(&prefix, &mut name, &mut alias);

    // Ran off the end without a terminator
    if !cursor.valid() {
        cursor.seek(cursor.len() - 1);
    }
}

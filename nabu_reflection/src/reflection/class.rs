use super::braces::{body_tokens, scan_body};
use super::constant::parse_constants;
use super::descriptors::{ClassDescriptor, InterfaceDescriptor};
use super::docblock::{find_preceding_doc_comment, warn_missing};
use super::function::parse_method;
use super::modifiers::Modifiers;
use super::property::parse_properties;
use super::types::{extend_qualified_name, read_name_list, read_qualified_name};
use super::{Context, ReflectionError};
use crate::config::compile_time::reflection::MAX_MEMBERS_PER_CLASS;
use crate::tokens::{TokenCursor, TokenKind};

const HEADER_STOPS: &[TokenKind] = &[TokenKind::OpenBrace];

/// Parse a class with the cursor on `class`; the cursor ends on its `}`
pub fn parse_class(cursor: &mut TokenCursor, ctx: &Context) -> Result<ClassDescriptor, ReflectionError> {
    let line = cursor.current().line();
    let doc_block = find_preceding_doc_comment(cursor);
    let modifiers = Modifiers::probe(cursor);
    let name = declaration_name(cursor, "class", line)?;

    if doc_block.is_none() {
        warn_missing("class", &name, line);
    }

    let parent_class = match cursor.goto_next_by_type(&[TokenKind::Extends], 5, HEADER_STOPS) {
        Some(_) => read_qualified_name(cursor),
        None => None,
    };
    let interfaces = match cursor.goto_next_by_type(&[TokenKind::Implements], 5, HEADER_STOPS) {
        Some(_) => read_name_list(cursor),
        None => Vec::new(),
    };

    let mut class = ClassDescriptor {
        name,
        is_abstract: modifiers.is_abstract,
        is_final: modifiers.is_final,
        doc_block,
        parent_class,
        interfaces,
        constants: Vec::new(),
        properties: Vec::new(),
        methods: Vec::new(),
        line,
        namespace: ctx.namespace.clone(),
    };

    let range = scan_body(cursor, TokenKind::OpenBrace, TokenKind::CloseBrace, |_| Ok(()))?;
    body_tokens(cursor, range, |c| {
        match c.current().kind {
            TokenKind::Const => class.constants.extend(parse_constants(c)?),
            TokenKind::Variable => class.properties.extend(parse_properties(c)?),
            TokenKind::Function => class.methods.push(parse_method(c, ctx)?),
            _ => {}
        }
        Ok(())
    })?;

    check_member_count(&class.name, class.member_count())?;
    Ok(class)
}

/// Parse an interface with the cursor on `interface`; the cursor ends on its `}`
pub fn parse_interface(
    cursor: &mut TokenCursor,
    ctx: &Context,
) -> Result<InterfaceDescriptor, ReflectionError> {
    let line = cursor.current().line();
    let doc_block = find_preceding_doc_comment(cursor);
    let name = declaration_name(cursor, "interface", line)?;

    if doc_block.is_none() {
        warn_missing("interface", &name, line);
    }

    let interfaces = match cursor.goto_next_by_type(&[TokenKind::Extends], 5, HEADER_STOPS) {
        Some(_) => read_name_list(cursor),
        None => Vec::new(),
    };

    let mut interface = InterfaceDescriptor {
        name,
        doc_block,
        interfaces,
        constants: Vec::new(),
        methods: Vec::new(),
        line,
        namespace: ctx.namespace.clone(),
    };

    let range = scan_body(cursor, TokenKind::OpenBrace, TokenKind::CloseBrace, |_| Ok(()))?;
    body_tokens(cursor, range, |c| {
        match c.current().kind {
            TokenKind::Const => interface.constants.extend(parse_constants(c)?),
            TokenKind::Function => interface.methods.push(parse_method(c, ctx)?),
            _ => {}
        }
        Ok(())
    })?;

    check_member_count(
        &interface.name,
        interface.constants.len() + interface.methods.len(),
    )?;
    Ok(interface)
}

/// Name after the keyword, leaving the cursor on its last segment
fn declaration_name(
    cursor: &mut TokenCursor,
    what: &'static str,
    line: u32,
) -> Result<String, ReflectionError> {
    match cursor.goto_next_by_type(&[TokenKind::Identifier], 5, HEADER_STOPS) {
        Some(_) => Ok(extend_qualified_name(cursor)),
        None => Err(ReflectionError::MissingName { what, line }),
    }
}

fn check_member_count(name: &str, count: usize) -> Result<(), ReflectionError> {
    if count > MAX_MEMBERS_PER_CLASS {
        return Err(ReflectionError::TooManyMembers {
            name: name.to_string(),
            count,
        });
    }
    Ok(())
}

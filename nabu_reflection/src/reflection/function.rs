use super::argument::parse_argument;
use super::braces::scan_body;
use super::descriptors::{ArgumentDescriptor, FunctionDescriptor, FunctionKind, MethodDescriptor};
use super::docblock::{find_preceding_doc_comment, warn_missing, DocBlock};
use super::modifiers::Modifiers;
use super::{Context, ReflectionError};
use crate::tokens::{TokenCursor, TokenKind};

const NAME_STOPS: &[TokenKind] = &[
    TokenKind::OpenBrace,
    TokenKind::Semicolon,
    TokenKind::OpenParen,
];

/// Parse a function or closure with the cursor on `function`
///
/// The cursor ends on the closing brace of the body, or on the `;` of a
/// body-less (abstract or interface) declaration.
pub fn parse_function(
    cursor: &mut TokenCursor,
    ctx: &Context,
) -> Result<FunctionDescriptor, ReflectionError> {
    let origin = cursor.key();
    let line = cursor.current().line();
    let mut doc_block = find_preceding_doc_comment(cursor);

    let (name, kind) = match cursor.find_next_by_type(&[TokenKind::Identifier], 5, NAME_STOPS) {
        Some(token) => (token.text.clone(), FunctionKind::Function),
        None => ("Closure".to_string(), FunctionKind::Closure),
    };

    let (args_start, args_end) =
        match cursor.token_ids_of_pair(TokenKind::OpenParen, TokenKind::CloseParen) {
            (Some(start), Some(end)) => (start, end),
            (Some(_), None) => {
                return Err(ReflectionError::Unterminated {
                    open: TokenKind::OpenParen,
                    line,
                })
            }
            (None, _) => (origin, origin),
        };

    cursor.seek(args_end);
    let body_or_end = cursor
        .find_next_by_type(&[TokenKind::OpenBrace, TokenKind::Semicolon], 0, &[])
        .map(|token| token.kind);
    cursor.seek(origin);

    let mut arguments = Vec::new();
    match body_or_end {
        Some(TokenKind::Semicolon) => {
            for position in args_start + 1..args_end {
                if cursor.tokens()[position].kind == TokenKind::Variable {
                    cursor.seek(position);
                    arguments.push(parse_argument(cursor));
                }
            }
            cursor.seek(origin);
            cursor.goto_next_by_type(&[TokenKind::Semicolon], 0, &[]);
        }
        Some(_) => {
            let (_, end) = scan_body(cursor, TokenKind::OpenBrace, TokenKind::CloseBrace, |c| {
                let key = c.key();
                if key > args_start && key < args_end && c.current().kind == TokenKind::Variable {
                    arguments.push(parse_argument(c));
                }
                Ok(())
            })?;
            cursor.seek(end);
        }
        None => {
            return Err(ReflectionError::Unterminated {
                open: TokenKind::OpenBrace,
                line,
            })
        }
    }

    if let Some(doc) = doc_block.as_mut() {
        check_param_tags(doc, &arguments, &name);
    }

    Ok(FunctionDescriptor {
        name,
        kind,
        arguments,
        doc_block,
        line,
        namespace: ctx.namespace.clone(),
    })
}

/// Parse a class or interface method with the cursor on `function`
pub fn parse_method(
    cursor: &mut TokenCursor,
    ctx: &Context,
) -> Result<MethodDescriptor, ReflectionError> {
    let modifiers = Modifiers::probe(cursor);
    let function = parse_function(cursor, ctx)?;

    if function.doc_block.is_none() {
        warn_missing("method", &function.name, function.line);
    }

    Ok(MethodDescriptor {
        function,
        visibility: modifiers.visibility,
        is_static: modifiers.is_static,
        is_abstract: modifiers.is_abstract,
        is_final: modifiers.is_final,
    })
}

/// Compare `@param` tags with the declared arguments in order
///
/// A tag without a variable name takes the argument's name.
fn check_param_tags(doc: &mut DocBlock, arguments: &[ArgumentDescriptor], function: &str) {
    let mut params: Vec<_> = doc.tags_by_name_mut("param").collect();

    for (index, argument) in arguments.iter().enumerate() {
        match params.get_mut(index) {
            None => {
                crate::log_warning!(
                    &format!("Argument {} is missing from the function Docblock", argument.name),
                    "function" => function,
                    "line" => argument.line
                );
            }
            Some(tag) if tag.variable_name().is_empty() => tag.set_variable_name(&argument.name),
            Some(tag) if tag.variable_name() != argument.name => {
                crate::log_warning!(
                    &format!(
                        "Name of argument {} does not match with function Docblock",
                        argument.name
                    ),
                    "function" => function,
                    "line" => argument.line
                );
            }
            Some(_) => {}
        }
    }
}

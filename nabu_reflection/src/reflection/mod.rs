//! Structural reflection of PHP token streams
//!
//! The [`FileReflector`] walks a file's tokens with a [`TokenCursor`] and
//! hands each declaration to its parser. Parsers are invoked with the cursor
//! on the declaration's defining keyword and leave it on the declaration's
//! last token, so the caller's walk skips over bodies it has no interest in.
//!
//! [`TokenCursor`]: crate::tokens::TokenCursor

pub mod argument;
pub mod braces;
pub mod class;
pub mod constant;
pub mod descriptors;
pub mod docblock;
pub mod error;
pub mod file;
pub mod function;
pub mod include;
pub mod modifiers;
pub mod property;
pub mod types;
pub mod values;

use std::collections::BTreeMap;

pub use descriptors::{
    ArgumentDescriptor, ClassDescriptor, ConstantDescriptor, FileDescriptor, FunctionDescriptor,
    FunctionKind, IncludeDescriptor, IncludeKind, InterfaceDescriptor, Marker, MethodDescriptor,
    PropertyDescriptor, Visibility,
};
pub use docblock::{find_preceding_doc_comment, DocBlock, DocTag};
pub use error::ReflectionError;
pub use file::{reflect, FileReflector};
pub use types::{expand_type, DEFAULT_NAMESPACE};

/// Namespace state shared by the parsers of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub namespace: String,
    pub namespace_aliases: BTreeMap<String, String>,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            namespace_aliases: BTreeMap::new(),
        }
    }
}

impl Context {
    pub fn expand_type(&self, ty: &str) -> String {
        expand_type(ty, &self.namespace, &self.namespace_aliases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_context() {
        let ctx = Context::default();
        assert_eq!(ctx.namespace, "default");
        assert_eq!(ctx.expand_type("Foo"), "\\Foo");
    }
}

//! Cross-reference resolution
//!
//! Roles are registered by name on a [`ReferenceResolver`], which also keeps
//! the dependencies and invalid links of the document being processed.

pub mod error;
pub mod kinds;
pub mod resolver;
pub mod url;

pub use error::ReferenceError;
pub use kinds::{
    default_references, AnchorReference, ClassReference, Dependency, DocReference,
    resolve_file_then_anchor, FunctionReference, MethodReference, NamespaceReference, Reference,
    ResolvedReference,
};
pub use resolver::{InvalidLink, ReferenceResolver, UNRESOLVED_PREFIX};

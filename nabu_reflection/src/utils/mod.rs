//! Shared primitive types used by the lexer, the reflection parsers and logging.

pub mod span;

pub use span::{Position, Span};

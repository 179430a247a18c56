//! Token system for PHP structural reflection
//!
//! The lexer produces a flat `Vec<Token>`; every later pass walks it through
//! a [`TokenCursor`] using bounded, stop-aware searches.
//!
//! ## Key Components
//!
//! - **[`TokenKind`]** - Closed enumeration of keyword, value and punctuation kinds
//! - **[`Token`]** - Kind, literal text and source span
//! - **[`TokenCursor`]** - Bidirectional cursor with `find_*` / `goto_*` searches

pub mod cursor;
pub mod token;

pub use cursor::{CursorError, Direction, TokenCursor};
pub use token::{keyword_kind, Token, TokenKind};

pub use crate::utils::{Position, Span};

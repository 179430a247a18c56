use crate::logging::codes;
use crate::tokens::{CursorError, TokenKind};

/// Structural errors; each one is fatal for the file being reflected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReflectionError {
    #[error("'{open}' opened after line {line} is never closed")]
    Unterminated { open: TokenKind, line: u32 },

    #[error("{what} declaration at line {line} has no name")]
    MissingName { what: &'static str, line: u32 },

    #[error("Nesting depth {depth} at line {line} exceeds the limit")]
    NestingTooDeep { depth: usize, line: u32 },

    #[error("{name} declares {count} members, more than the limit")]
    TooManyMembers { name: String, count: usize },

    #[error(transparent)]
    Cursor(#[from] CursorError),
}

impl ReflectionError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            ReflectionError::Unterminated { .. } => codes::reflection::UNTERMINATED_BLOCK,
            ReflectionError::MissingName { .. } => codes::reflection::MISSING_NAME,
            ReflectionError::NestingTooDeep { .. } => codes::reflection::NESTING_TOO_DEEP,
            ReflectionError::TooManyMembers { .. } => codes::reflection::TOO_MANY_MEMBERS,
            ReflectionError::Cursor(e) => e.error_code(),
        }
    }
}

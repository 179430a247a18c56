use crate::meta::MetaError;
use nabu_reflection::logging::codes;

#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    #[error("Malformed {role} reference \"{data}\": {reason}")]
    Malformed {
        role: String,
        data: String,
        reason: String,
    },

    #[error("Could not get canonical url for dependency {dependency}")]
    NoCanonicalUrl { dependency: String },

    #[error(transparent)]
    Meta(#[from] MetaError),
}

impl ReferenceError {
    pub fn malformed(role: &str, data: &str, reason: &str) -> Self {
        Self::Malformed {
            role: role.to_string(),
            data: data.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn error_code(&self) -> nabu_reflection::logging::Code {
        match self {
            ReferenceError::Malformed { .. } => codes::references::MALFORMED_REFERENCE,
            ReferenceError::NoCanonicalUrl { .. } => codes::references::NO_CANONICAL_URL,
            ReferenceError::Meta(error) => error.error_code(),
        }
    }
}

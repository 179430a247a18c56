//! Cross-document metadata
//!
//! One [`MetaEntry`] per parsed document, persisted between builds as JSON
//! so unchanged documents can be skipped and references resolved without
//! re-reading their sources.

pub mod entry;
pub mod store;

pub use entry::{MetaEntry, TitleNode};
pub use store::MetaStore;

use nabu_reflection::logging::codes;

#[derive(Debug, thiserror::Error)]
pub enum MetaError {
    #[error("Failed to access metadata '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed metadata '{path}': {source}")]
    Format {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not find dependency \"{dependency}\" in MetaEntry for \"{file}\"")]
    UnknownDependency { dependency: String, file: String },
}

impl MetaError {
    pub fn error_code(&self) -> nabu_reflection::logging::Code {
        match self {
            MetaError::Io { .. } => codes::guides::METADATA_IO,
            MetaError::Format { .. } => codes::guides::METADATA_FORMAT,
            MetaError::UnknownDependency { .. } => codes::references::UNKNOWN_DEPENDENCY,
        }
    }
}

/// ASCII slug: lowercase alphanumerics joined by single dashes
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Using Composer"), "using-composer");
        assert_eq!(slugify("  What's new?  "), "what-s-new");
        assert_eq!(slugify("__call()"), "call");
        assert_eq!(slugify("v2.0 -- Notes"), "v2-0-notes");
        assert_eq!(slugify("***"), "");
    }
}

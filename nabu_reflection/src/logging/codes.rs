//! Consolidated error codes and classification system
//!
//! Single source of truth for all error codes and their metadata. The
//! reflection crate, the guides crate and the CLI all report through these codes.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for an error code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub const fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// File processing error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const EMPTY_FILE: Code = Code::new("E008");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
}

/// Lexical analysis error codes
pub mod lexical {
    use super::Code;

    pub const INVALID_CHARACTER: Code = Code::new("E020");
    pub const UNTERMINATED_STRING: Code = Code::new("E021");
    pub const UNTERMINATED_COMMENT: Code = Code::new("E022");
    pub const IDENTIFIER_TOO_LONG: Code = Code::new("E023");
    pub const STRING_TOO_LARGE: Code = Code::new("E024");
    pub const COMMENT_TOO_LONG: Code = Code::new("E026");
    pub const TOO_MANY_TOKENS: Code = Code::new("E027");
}

/// Token cursor error codes
pub mod cursor {
    use super::Code;

    pub const INVALID_DIRECTION: Code = Code::new("E030");
    pub const INVALID_POSITION: Code = Code::new("E031");
}

/// Structural reflection error codes
pub mod reflection {
    use super::Code;

    pub const UNTERMINATED_BLOCK: Code = Code::new("E040");
    pub const MISSING_NAME: Code = Code::new("E041");
    pub const NESTING_TOO_DEEP: Code = Code::new("E042");
    pub const TOO_MANY_MEMBERS: Code = Code::new("E043");
    pub const EXPORT_FAILURE: Code = Code::new("E044");
}

/// Reference resolution error codes
pub mod references {
    use super::Code;

    pub const UNKNOWN_ROLE: Code = Code::new("E110");
    pub const MALFORMED_REFERENCE: Code = Code::new("E111");
    pub const INVALID_LINK: Code = Code::new("E112");
    pub const NO_CANONICAL_URL: Code = Code::new("E113");
    pub const UNKNOWN_DEPENDENCY: Code = Code::new("E114");
}

/// Guides (markup documents) error codes
pub mod guides {
    use super::Code;

    pub const METADATA_IO: Code = Code::new("E120");
    pub const METADATA_FORMAT: Code = Code::new("E121");
    pub const SCAN_FAILURE: Code = Code::new("E122");
    pub const RENDER_FAILURE: Code = Code::new("E123");
    pub const DOCUMENT_FAILURE: Code = Code::new("E124");
}

/// Batch processing error codes
pub mod batch {
    use super::Code;

    pub const DISCOVERY_FAILURE: Code = Code::new("E130");
    pub const WORKER_FAILURE: Code = Code::new("E131");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");

    // File processing
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");

    // Lexical
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");

    // Reflection
    pub const REFLECTION_COMPLETE: Code = Code::new("I040");
    pub const EXPORT_COMPLETE: Code = Code::new("I041");

    // Guides
    pub const SCAN_COMPLETE: Code = Code::new("I070");
    pub const METADATA_PHASE_COMPLETE: Code = Code::new("I071");
    pub const RENDER_PHASE_COMPLETE: Code = Code::new("I072");
    pub const METADATA_SAVED: Code = Code::new("I073");

    // Batch
    pub const BATCH_COMPLETE: Code = Code::new("I080");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

const ERROR_TABLE: &[ErrorMetadata] = &[
    // System errors
    ErrorMetadata::new(
        "ERR001",
        "System",
        Severity::Critical,
        false,
        "Critical internal system error",
        "File a bug report with the input that triggered it",
    ),
    ErrorMetadata::new(
        "ERR002",
        "System",
        Severity::Critical,
        false,
        "System initialization failure",
        "Check configuration and environment variables",
    ),
    // File processing errors
    ErrorMetadata::new(
        "E005",
        "FileProcessing",
        Severity::Medium,
        false,
        "File not found at specified path",
        "Check file path and ensure file exists",
    ),
    ErrorMetadata::new(
        "E006",
        "FileProcessing",
        Severity::Low,
        true,
        "File does not have the expected extension",
        "Rename the file or disable the extension requirement",
    ),
    ErrorMetadata::new(
        "E007",
        "FileProcessing",
        Severity::Medium,
        false,
        "File exceeds maximum size limit",
        "Reduce file size or raise the limit in the build profile",
    ),
    ErrorMetadata::new(
        "E008",
        "FileProcessing",
        Severity::Low,
        true,
        "File is empty when content expected",
        "Provide a file with content",
    ),
    ErrorMetadata::new(
        "E009",
        "FileProcessing",
        Severity::Medium,
        false,
        "Permission denied while reading file",
        "Check file permissions",
    ),
    ErrorMetadata::new(
        "E010",
        "FileProcessing",
        Severity::Medium,
        false,
        "File is not valid UTF-8",
        "Convert the file to UTF-8",
    ),
    ErrorMetadata::new(
        "E011",
        "FileProcessing",
        Severity::Medium,
        false,
        "I/O error while reading file",
        "Check disk and file system health",
    ),
    // Lexical errors
    ErrorMetadata::new(
        "E020",
        "Lexical",
        Severity::Medium,
        false,
        "Invalid character in source",
        "Remove or escape the character",
    ),
    ErrorMetadata::new(
        "E021",
        "Lexical",
        Severity::High,
        false,
        "Unterminated string literal",
        "Add the closing quote or heredoc terminator",
    ),
    ErrorMetadata::new(
        "E022",
        "Lexical",
        Severity::High,
        false,
        "Unterminated block comment",
        "Close the comment with */",
    ),
    ErrorMetadata::new(
        "E023",
        "Lexical",
        Severity::Medium,
        false,
        "Identifier exceeds maximum length",
        "Shorten the identifier",
    ),
    ErrorMetadata::new(
        "E024",
        "Lexical",
        Severity::Medium,
        false,
        "String literal exceeds maximum size",
        "Split the literal or raise the limit",
    ),
    ErrorMetadata::new(
        "E026",
        "Lexical",
        Severity::Medium,
        false,
        "Comment exceeds maximum length",
        "Shorten the comment or raise the limit",
    ),
    ErrorMetadata::new(
        "E027",
        "Lexical",
        Severity::High,
        false,
        "Token count exceeds maximum",
        "Split the file or raise the limit",
    ),
    // Cursor errors
    ErrorMetadata::new(
        "E030",
        "Cursor",
        Severity::High,
        false,
        "Search direction must be 'next' or 'previous'",
        "Fix the caller",
    ),
    ErrorMetadata::new(
        "E031",
        "Cursor",
        Severity::Critical,
        false,
        "Cursor moved outside the token stream",
        "File a bug report",
    ),
    // Reflection errors
    ErrorMetadata::new(
        "E040",
        "Reflection",
        Severity::High,
        false,
        "Block opened but never closed",
        "Balance the braces or parentheses",
    ),
    ErrorMetadata::new(
        "E041",
        "Reflection",
        Severity::High,
        false,
        "Declaration without a name",
        "Name the class, interface or constant",
    ),
    ErrorMetadata::new(
        "E042",
        "Reflection",
        Severity::High,
        false,
        "Block nesting exceeds maximum depth",
        "Flatten the code or raise the limit",
    ),
    ErrorMetadata::new(
        "E043",
        "Reflection",
        Severity::Medium,
        false,
        "Class declares more members than allowed",
        "Split the class or raise the limit",
    ),
    ErrorMetadata::new(
        "E044",
        "Reflection",
        Severity::Medium,
        true,
        "Structure export failed",
        "Check the output format",
    ),
    // Reference errors
    ErrorMetadata::new(
        "E110",
        "References",
        Severity::Low,
        true,
        "Unknown reference role",
        "Register the role or fix the markup",
    ),
    ErrorMetadata::new(
        "E111",
        "References",
        Severity::Medium,
        true,
        "Malformed reference text",
        "Use the Class::method form for method references",
    ),
    ErrorMetadata::new(
        "E112",
        "References",
        Severity::Low,
        true,
        "Link target could not be resolved",
        "Add the target or fix the link text",
    ),
    ErrorMetadata::new(
        "E113",
        "References",
        Severity::Medium,
        true,
        "Reference has no canonical url",
        "Fix the document path",
    ),
    ErrorMetadata::new(
        "E114",
        "References",
        Severity::Medium,
        true,
        "Dependency is not recorded for the document",
        "Record the dependency before resolving it",
    ),
    // Guides errors
    ErrorMetadata::new(
        "E120",
        "Guides",
        Severity::High,
        false,
        "Metadata file could not be read or written",
        "Check the metadata path",
    ),
    ErrorMetadata::new(
        "E121",
        "Guides",
        Severity::High,
        false,
        "Metadata file is not valid JSON",
        "Delete the metadata file to force a full rebuild",
    ),
    ErrorMetadata::new(
        "E122",
        "Guides",
        Severity::High,
        false,
        "Source directory scan failed",
        "Check the source directory",
    ),
    ErrorMetadata::new(
        "E123",
        "Guides",
        Severity::Medium,
        true,
        "Template rendering failed",
        "Check the template name and variables",
    ),
    ErrorMetadata::new(
        "E124",
        "Guides",
        Severity::Medium,
        true,
        "Document could not be processed",
        "See the preceding errors for this document",
    ),
    // Batch errors
    ErrorMetadata::new(
        "E130",
        "Batch",
        Severity::High,
        false,
        "Batch file discovery failed",
        "Check the input directory",
    ),
    ErrorMetadata::new(
        "E131",
        "Batch",
        Severity::High,
        false,
        "Batch worker thread failed",
        "Run sequentially to isolate the failing file",
    ),
];

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, &'static ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, &'static ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| ERROR_TABLE.iter().map(|m| (m.code, m)).collect())
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code).copied()
}

pub fn get_severity(code: &str) -> Severity {
    get_error_metadata(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

pub fn get_description(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

pub fn get_category(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_error_code_has_metadata() {
        let codes = [
            system::INTERNAL_ERROR,
            file_processing::FILE_TOO_LARGE,
            lexical::UNTERMINATED_STRING,
            cursor::INVALID_DIRECTION,
            reflection::UNTERMINATED_BLOCK,
            references::UNKNOWN_ROLE,
            guides::METADATA_FORMAT,
            batch::WORKER_FAILURE,
        ];
        for code in codes {
            assert_ne!(get_description(code.as_str()), "Unknown error", "{}", code);
        }
    }

    #[test]
    fn test_table_has_no_duplicates() {
        assert_eq!(get_error_registry().len(), ERROR_TABLE.len());
    }

    #[test]
    fn test_unknown_code_defaults() {
        assert_eq!(get_category("Z999"), "Unknown");
        assert!(is_recoverable("Z999"));
        assert_eq!(get_severity("Z999"), Severity::Medium);
    }
}

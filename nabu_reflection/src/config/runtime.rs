// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProcessorPreferences {
    /// Whether to require a .php extension on reflected files
    pub require_php_extension: bool,

    /// Whether to enable detailed performance logging
    pub enable_performance_logging: bool,

    /// Whether a UTF-8 byte order mark is stripped before lexing
    pub strip_byte_order_mark: bool,
}

impl Default for FileProcessorPreferences {
    fn default() -> Self {
        Self {
            require_php_extension: env::var("NABU_REQUIRE_PHP_EXTENSION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_performance_logging: env::var("NABU_ENABLE_PERFORMANCE_LOGGING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            strip_byte_order_mark: env::var("NABU_STRIP_BOM")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflectionPreferences {
    /// Comment markers collected per file (`// TODO: ...`)
    pub marker_terms: Vec<String>,

    /// Whether type names are expanded against namespace and `use` aliases on export
    pub expand_types: bool,

    /// Whether closures assigned at file level are reported as functions
    pub include_closures: bool,
}

impl Default for ReflectionPreferences {
    fn default() -> Self {
        Self {
            marker_terms: env::var("NABU_MARKERS")
                .ok()
                .map(|v| parse_list(&v))
                .filter(|terms| !terms.is_empty())
                .unwrap_or_else(|| vec!["TODO".to_string(), "FIXME".to_string()]),
            expand_types: env::var("NABU_EXPAND_TYPES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            include_closures: env::var("NABU_INCLUDE_CLOSURES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidesPreferences {
    /// Source file extension scanned for documents
    pub source_extension: String,

    /// Role applied to interpreted text written without one
    pub default_role: String,

    /// Whether the build fails when invalid links remain
    pub fail_on_invalid_links: bool,
}

impl Default for GuidesPreferences {
    fn default() -> Self {
        Self {
            source_extension: env::var("NABU_GUIDES_EXTENSION").unwrap_or_else(|_| "rst".to_string()),
            default_role: env::var("NABU_GUIDES_DEFAULT_ROLE").unwrap_or_else(|_| "ref".to_string()),
            fail_on_invalid_links: env::var("NABU_GUIDES_FAIL_ON_INVALID_LINKS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    /// Preferred minimum log level
    pub min_log_level: LogLevel,

    /// Whether to include file context in log messages
    pub include_file_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var("NABU_LOGGING_USE_STRUCTURED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var("NABU_LOGGING_ENABLE_CONSOLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            min_log_level: env::var("NABU_LOGGING_MIN_LEVEL")
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            include_file_context: env::var("NABU_LOGGING_INCLUDE_FILE_CONTEXT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables and CLI flags)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub file_processor: FileProcessorPreferences,
    pub reflection: ReflectionPreferences,
    pub guides: GuidesPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Load preferences from a TOML document; absent sections fall back to env-driven defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn from_toml_file(path: &std::path::Path) -> Result<Self, RuntimeConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| RuntimeConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content).map_err(|e| RuntimeConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RuntimeConfigError {
    #[error("Failed to read configuration '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration '{path}': {message}")]
    Parse { path: String, message: String },
}

/// Environment variable names for configuration
pub mod env_vars {
    // File Processor
    pub const REQUIRE_PHP_EXTENSION: &str = "NABU_REQUIRE_PHP_EXTENSION";
    pub const ENABLE_PERFORMANCE_LOGGING: &str = "NABU_ENABLE_PERFORMANCE_LOGGING";
    pub const STRIP_BOM: &str = "NABU_STRIP_BOM";

    // Reflection
    pub const MARKERS: &str = "NABU_MARKERS";
    pub const EXPAND_TYPES: &str = "NABU_EXPAND_TYPES";
    pub const INCLUDE_CLOSURES: &str = "NABU_INCLUDE_CLOSURES";

    // Guides
    pub const GUIDES_EXTENSION: &str = "NABU_GUIDES_EXTENSION";
    pub const GUIDES_DEFAULT_ROLE: &str = "NABU_GUIDES_DEFAULT_ROLE";
    pub const GUIDES_FAIL_ON_INVALID_LINKS: &str = "NABU_GUIDES_FAIL_ON_INVALID_LINKS";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "NABU_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "NABU_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "NABU_LOGGING_MIN_LEVEL";
    pub const LOGGING_INCLUDE_FILE_CONTEXT: &str = "NABU_LOGGING_INCLUDE_FILE_CONTEXT";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("WARN"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("2"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("verbose"), None);
    }

    #[test]
    fn test_env_var_names_exist() {
        assert!(env_vars::MARKERS.starts_with("NABU_"));
        assert!(env_vars::GUIDES_DEFAULT_ROLE.starts_with("NABU_"));
        assert!(env_vars::LOGGING_MIN_LEVEL.starts_with("NABU_"));
    }

    #[test]
    fn test_parse_marker_list() {
        assert_eq!(parse_list(" TODO, FIXME ,,XXX"), vec!["TODO", "FIXME", "XXX"]);
    }

    #[test]
    fn test_toml_overrides_single_section() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            [guides]
            source_extension = "txt"
            default_role = "doc"
            fail_on_invalid_links = true
            "#,
        )
        .unwrap();

        assert_eq!(config.guides.source_extension, "txt");
        assert_eq!(config.guides.default_role, "doc");
        assert!(config.guides.fail_on_invalid_links);
        assert!(!config.reflection.marker_terms.is_empty());
    }

    #[test]
    fn test_toml_file_missing() {
        let result = RuntimeConfig::from_toml_file(std::path::Path::new("/nonexistent/nabu.toml"));
        assert!(matches!(result, Err(RuntimeConfigError::Io { .. })));
    }
}

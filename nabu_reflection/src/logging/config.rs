//! Logging settings
//!
//! Buffer limits are compile-time constants; level and sink choice come from
//! the `NABU_LOGGING_*` environment, read once.

use crate::config::compile_time::logging::{LOG_BUFFER_SIZE, SECURITY_MIN_LOG_LEVEL};
use crate::config::runtime::LoggingPreferences;
use crate::logging::events::LogLevel;
use std::sync::LazyLock;

static PREFERENCES: LazyLock<LoggingPreferences> = LazyLock::new(LoggingPreferences::default);

fn check_preferences(preferences: &LoggingPreferences) -> Result<(), String> {
    if preferences.use_structured_logging && !preferences.enable_console_logging {
        return Err("Structured logging requires console logging to be enabled".to_string());
    }
    Ok(())
}

/// Requested level, clamped so errors and warnings are never filtered out
pub fn get_min_log_level() -> LogLevel {
    let requested = PREFERENCES.min_log_level.to_events_log_level();
    let floor = match SECURITY_MIN_LOG_LEVEL {
        0 => LogLevel::Error,
        1 => LogLevel::Warning,
        _ => LogLevel::Info,
    };
    requested.max(floor)
}

pub fn use_structured_logging() -> bool {
    PREFERENCES.use_structured_logging
}

pub fn use_console_logging() -> bool {
    PREFERENCES.enable_console_logging
}

pub fn include_file_context() -> bool {
    PREFERENCES.include_file_context
}

pub fn validate_config() -> Result<(), String> {
    if LOG_BUFFER_SIZE < 100 {
        return Err(format!("Log buffer size too small: {}", LOG_BUFFER_SIZE));
    }
    check_preferences(&PREFERENCES)
}

//! Error collector for batch file processing with cargo-style output

use super::events::LogEvent;
use crate::config::compile_time::logging::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

// ============================================================================
// FILE PROCESSING CONTEXT
// ============================================================================

/// Context information for file processing
#[derive(Debug, Clone)]
pub struct FileProcessingContext {
    pub file_path: PathBuf,
    pub file_id: usize,
}

impl FileProcessingContext {
    pub fn new(file_path: PathBuf, file_id: usize) -> Self {
        Self {
            file_path,
            file_id,
        }
    }
}

// ============================================================================
// PROCESSING SUMMARY
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ProcessingSummary {
    pub total_files: usize,
    pub files_with_errors: usize,
    pub files_with_warnings: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
}

// ============================================================================
// ERROR COLLECTOR
// ============================================================================

/// Thread-safe error collector keyed by file
pub struct ErrorCollector {
    file_events: Mutex<BTreeMap<PathBuf, Vec<LogEvent>>>,
    file_contexts: Mutex<BTreeMap<PathBuf, FileProcessingContext>>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self {
            file_events: Mutex::new(BTreeMap::new()),
            file_contexts: Mutex::new(BTreeMap::new()),
        }
    }

    /// Record an event for a specific file
    pub fn record_event(&self, file_path: &Path, event: LogEvent) {
        let Ok(mut events) = self.file_events.lock() else {
            return;
        };

        let total: usize = events.values().map(Vec::len).sum();
        if total >= MAX_ERROR_COLLECTION {
            return;
        }

        let file_events = events.entry(file_path.to_path_buf()).or_default();

        if file_events.len() < MAX_LOG_EVENTS_PER_FILE {
            file_events.push(event);
        } else if file_events.len() == MAX_LOG_EVENTS_PER_FILE {
            file_events.push(LogEvent::warning(&format!(
                "Too many events for file (limit: {})",
                MAX_LOG_EVENTS_PER_FILE
            )));
        }
    }

    pub fn record_file_context(&self, context: FileProcessingContext) {
        if let Ok(mut contexts) = self.file_contexts.lock() {
            contexts.insert(context.file_path.clone(), context);
        }
    }

    pub fn get_all_file_events(&self) -> BTreeMap<PathBuf, Vec<LogEvent>> {
        self.file_events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn get_summary(&self) -> ProcessingSummary {
        let events = self.get_all_file_events();
        let contexts = self
            .file_contexts
            .lock()
            .map(|c| c.len())
            .unwrap_or_default();

        let mut summary = ProcessingSummary {
            total_files: contexts.max(events.len()),
            ..ProcessingSummary::default()
        };

        for file_events in events.values() {
            let errors = file_events.iter().filter(|e| e.is_error()).count();
            let warnings = file_events.iter().filter(|e| e.is_warning()).count();
            summary.total_errors += errors;
            summary.total_warnings += warnings;
            if errors > 0 {
                summary.files_with_errors += 1;
            }
            if warnings > 0 {
                summary.files_with_warnings += 1;
            }
        }

        summary
    }

}

impl Default for ErrorCollector {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// CARGO-STYLE FORMATTING
// ============================================================================

/// Format collected errors and warnings grouped by file
pub fn format_cargo_style_errors(collector: &ErrorCollector) -> String {
    let mut output = String::new();

    for (file_path, events) in &collector.get_all_file_events() {
        let reportable: Vec<_> = events
            .iter()
            .filter(|e| e.is_error() || e.is_warning())
            .collect();
        if reportable.is_empty() {
            continue;
        }

        output.push_str(&format!("Checking {}...\n", file_path.display()));

        for event in reportable {
            let kind = if event.is_error() { "error" } else { "warning" };
            let location = event
                .span
                .as_ref()
                .map(|s| {
                    format!(
                        " --> {}:{}:{}",
                        file_path.display(),
                        s.start().line,
                        s.start().column
                    )
                })
                .unwrap_or_default();

            output.push_str(&format!(
                "{}[{}]: {}{}\n",
                kind,
                event.code.as_str(),
                event.message,
                location
            ));

            for (key, value) in &event.context {
                if key != "file" && key != "file_id" {
                    output.push_str(&format!("  = {}: {}\n", key, value));
                }
            }

            if event.is_error() {
                let action = event.recommended_action();
                if action != "No specific action available" {
                    output.push_str(&format!("  = help: {}\n", action));
                }
            }
        }

        output.push('\n');
    }

    let summary = collector.get_summary();
    if summary.total_errors > 0 {
        output.push_str(&format!("Total errors: {}\n", summary.total_errors));
    }
    if summary.total_warnings > 0 {
        output.push_str(&format!("Total warnings: {}\n", summary.total_warnings));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_events_grouped_by_file() {
        let collector = ErrorCollector::new();
        let a = PathBuf::from("a.php");
        let b = PathBuf::from("b.php");

        collector.record_event(&a, LogEvent::error(codes::reflection::MISSING_NAME, "no name"));
        collector.record_event(&a, LogEvent::warning("odd"));
        collector.record_event(&b, LogEvent::info("ok"));

        let events = collector.get_all_file_events();
        assert_eq!(events[&a].len(), 2);
        assert_eq!(events[&b].len(), 1);

        let summary = collector.get_summary();
        assert_eq!(summary.total_errors, 1);
        assert_eq!(summary.files_with_warnings, 1);
        assert_eq!(summary.files_with_errors, 1);
    }

    #[test]
    fn test_cargo_style_output() {
        let collector = ErrorCollector::new();
        let path = PathBuf::from("src/Foo.php");
        collector.record_event(
            &path,
            LogEvent::error(codes::reflection::UNTERMINATED_BLOCK, "'{' never closed")
                .with_context("line", "3"),
        );

        let output = format_cargo_style_errors(&collector);
        assert!(output.contains("Checking src/Foo.php..."));
        assert!(output.contains("error[E040]: '{' never closed"));
        assert!(output.contains("= line: 3"));
        assert!(output.contains("Total errors: 1"));
    }

    #[test]
    fn test_per_file_limit_adds_single_overflow_warning() {
        let collector = ErrorCollector::new();
        let path = PathBuf::from("big.php");
        for _ in 0..MAX_LOG_EVENTS_PER_FILE + 5 {
            collector.record_event(&path, LogEvent::info("event"));
        }
        assert_eq!(
            collector.get_all_file_events()[&path].len(),
            (MAX_LOG_EVENTS_PER_FILE + 1).min(MAX_ERROR_COLLECTION)
        );
    }
}

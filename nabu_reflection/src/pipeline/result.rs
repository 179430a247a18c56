use crate::file_processor::FileMetadata;
use crate::lexical::LexicalMetrics;
use crate::reflection::FileDescriptor;
use std::time::Duration;

/// Everything produced for one file
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub file: FileDescriptor,
    pub file_metadata: FileMetadata,
    pub lexical_metrics: LexicalMetrics,
    pub token_count: usize,
    pub processing_duration: Duration,
}

impl PipelineResult {
    pub fn new(
        file: FileDescriptor,
        file_metadata: FileMetadata,
        lexical_metrics: LexicalMetrics,
        token_count: usize,
        processing_duration: Duration,
    ) -> Self {
        Self {
            file,
            file_metadata,
            lexical_metrics,
            token_count,
            processing_duration,
        }
    }

    pub fn log_success(&self, file_path: &str) {
        let seconds = self.processing_duration.as_secs_f64().max(f64::EPSILON);
        crate::log_success!(
            crate::logging::codes::success::FILE_PROCESSING_SUCCESS,
            "File reflected",
            "file" => file_path,
            "duration_ms" => format!("{:.2}", seconds * 1000.0),
            "elements" => self.file.element_count(),
            "processing_rate_bytes_per_sec" => format!("{:.0}", self.file_metadata.size as f64 / seconds),
            "processing_rate_tokens_per_sec" => format!("{:.0}", self.token_count as f64 / seconds)
        );
    }
}

mod error;
mod result;

pub use error::PipelineError;
pub use result::PipelineResult;

use crate::config::runtime::RuntimeConfig;
use crate::file_processor::FileProcessor;
use crate::lexical::LexicalAnalyzer;
use crate::logging;
use crate::reflection::FileReflector;
use std::path::Path;
use std::time::Instant;

/// The per-file stages (file -> lexical -> reflection) with their settings
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    processor: FileProcessor,
    reflector: FileReflector,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self {
            processor: FileProcessor::from_preferences(&config.file_processor),
            reflector: FileReflector::from_preferences(&config.reflection),
        }
    }

    /// Run one file through every stage under its logging context
    pub fn process_file(&self, file_path: &Path) -> Result<PipelineResult, PipelineError> {
        self.process_file_with_id(file_path, 0)
    }

    pub fn process_file_with_id(
        &self,
        file_path: &Path,
        file_id: usize,
    ) -> Result<PipelineResult, PipelineError> {
        let start_time = Instant::now();
        let display_path = file_path.display().to_string();

        logging::with_file_context(file_path.to_path_buf(), file_id, || {
            crate::log_debug!("Starting reflection pipeline", "file" => display_path.as_str());

            // Stage 1: File processing
            let file_result = self.processor.process_file(file_path)?;

            // Stage 2: Lexical analysis
            let mut analyzer = LexicalAnalyzer::new();
            let tokens = analyzer.tokenize_file_result(&file_result)?;

            // Stage 3: Reflection
            let file = self
                .reflector
                .reflect(&display_path, &file_result.source, &tokens)
                .map_err(|error| {
                    crate::log_error!(error.error_code(), &error.to_string(),
                        "file" => display_path.as_str()
                    );
                    error
                })?;

            let result = PipelineResult::new(
                file,
                file_result.metadata,
                analyzer.metrics().clone(),
                tokens.len(),
                start_time.elapsed(),
            );
            result.log_success(&display_path);

            Ok(result)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn process_file(path: &Path) -> Result<PipelineResult, PipelineError> {
        Pipeline::new().process_file(path)
    }

    fn php_file(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".php").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_process_file() {
        let file = php_file("<?php\nclass Service {\n    public function run() {}\n}\n");
        let result = process_file(file.path()).unwrap();

        assert_eq!(result.file.classes[0].name, "Service");
        assert_eq!(result.file_metadata.line_count, 4);
        assert_eq!(result.token_count, result.lexical_metrics.total_tokens);
    }

    #[test]
    fn test_structural_error_is_reported_per_stage() {
        let file = php_file("<?php\nclass Broken {\n");
        let error = process_file(file.path()).unwrap_err();
        assert_matches!(error, PipelineError::Reflection(_));
        assert_eq!(error.stage(), "reflection");
    }

    #[test]
    fn test_lexical_error() {
        let file = php_file("<?php $a = 'unterminated;");
        assert_matches!(
            process_file(file.path()),
            Err(PipelineError::LexicalAnalysis(_))
        );
    }

    #[test]
    fn test_missing_file() {
        assert_matches!(
            process_file(Path::new("/definitely/not/here.php")),
            Err(PipelineError::FileProcessing(_))
        );
    }
}

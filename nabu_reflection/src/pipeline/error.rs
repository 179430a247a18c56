use crate::export::ExportError;
use crate::file_processor::FileProcessorError;
use crate::lexical::LexerError;
use crate::reflection::ReflectionError;

/// Pipeline processing errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("File processing failed: {0}")]
    FileProcessing(#[from] FileProcessorError),

    #[error("Lexical analysis failed: {0}")]
    LexicalAnalysis(#[from] LexerError),

    #[error("Reflection failed: {0}")]
    Reflection(#[from] ReflectionError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Pipeline error: {message}")]
    Pipeline { message: String },
}

impl PipelineError {
    pub fn pipeline_error(message: &str) -> Self {
        Self::Pipeline {
            message: message.to_string(),
        }
    }

    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            PipelineError::FileProcessing(e) => e.error_code(),
            PipelineError::LexicalAnalysis(e) => e.error_code(),
            PipelineError::Reflection(e) => e.error_code(),
            PipelineError::Export(e) => e.error_code(),
            PipelineError::Pipeline { .. } => crate::logging::codes::system::INTERNAL_ERROR,
        }
    }

    /// Stage that failed, for summaries
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::FileProcessing(_) => "file",
            PipelineError::LexicalAnalysis(_) => "lexical",
            PipelineError::Reflection(_) => "reflection",
            PipelineError::Export(_) => "export",
            PipelineError::Pipeline { .. } => "pipeline",
        }
    }
}

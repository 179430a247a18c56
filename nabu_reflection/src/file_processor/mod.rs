//! Source file loading with compile-time size limits and encoding checks

mod processor;

pub use processor::{FileMetadata, FileProcessingResult, FileProcessor, FileProcessorError};

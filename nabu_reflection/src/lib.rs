// Internal modules
pub mod batch;
pub mod config;
pub mod export;
pub mod file_processor;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod reflection;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use batch::{BatchConfig, BatchError, BatchResults};
pub use export::{ExportError, ExportFormat};
pub use pipeline::{Pipeline, PipelineError, PipelineResult};
pub use reflection::{FileDescriptor, FileReflector, ReflectionError};

//! Batch processing module for PHP reflection
//!
//! Provides directory-based batch processing with sequential and parallel execution modes.
//! A failing file is recorded in the results and never aborts the rest of the batch
//! unless fail-fast mode is requested.

use crate::config::compile_time::batch_processing::{MAX_FILES_PER_BATCH, MAX_WORKER_THREADS};
use crate::logging::{self, codes};
use crate::pipeline::{Pipeline, PipelineError, PipelineResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// BATCH PROCESSING TYPES
// ============================================================================

/// Batch processing configuration
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_threads: usize,
    pub recursive: bool,
    pub max_files: Option<usize>,
    pub progress_reporting: bool,
    pub fail_fast: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_threads: std::thread::available_parallelism()
                .map(|n| n.get().min(MAX_WORKER_THREADS))
                .unwrap_or(4)
                .max(1),
            recursive: true,
            max_files: None,
            progress_reporting: false,
            fail_fast: false,
        }
    }
}

impl BatchConfig {
    /// Thread count clamped to `[1, MAX_WORKER_THREADS]`
    pub fn effective_threads(&self) -> usize {
        self.max_threads.clamp(1, MAX_WORKER_THREADS.max(1))
    }

    /// File limit, never above the compile-time ceiling
    pub fn effective_max_files(&self) -> usize {
        self.max_files
            .unwrap_or(MAX_FILES_PER_BATCH)
            .min(MAX_FILES_PER_BATCH)
    }
}

/// Batch processing results
#[derive(Debug, Default)]
pub struct BatchResults {
    pub successful_files: Vec<(PathBuf, PipelineResult)>,
    pub failed_files: Vec<(PathBuf, PipelineError)>,
    pub processing_duration: Duration,
    pub files_processed: usize,
    pub files_discovered: usize,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success_count(&self) -> usize {
        self.successful_files.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed_files.len()
    }

    pub fn success_rate(&self) -> f64 {
        if self.files_processed == 0 {
            0.0
        } else {
            self.successful_files.len() as f64 / self.files_processed as f64
        }
    }

    pub fn add_success(&mut self, file_path: PathBuf, result: PipelineResult) {
        self.successful_files.push((file_path, result));
        self.files_processed += 1;
    }

    pub fn add_failure(&mut self, file_path: PathBuf, error: PipelineError) {
        self.failed_files.push((file_path, error));
        self.files_processed += 1;
    }

    pub fn merge(&mut self, other: BatchResults) {
        self.successful_files.extend(other.successful_files);
        self.failed_files.extend(other.failed_files);
        self.files_processed += other.files_processed;
    }

    /// Sort both lists by path so parallel runs report deterministically
    pub fn sort(&mut self) {
        self.successful_files.sort_by(|a, b| a.0.cmp(&b.0));
        self.failed_files.sort_by(|a, b| a.0.cmp(&b.0));
    }

    pub fn summary(&self) -> String {
        format!(
            "Batch processing completed: {} files processed, {} successful ({:.1}%), {} failed, {:.2}s total",
            self.files_processed,
            self.success_count(),
            self.success_rate() * 100.0,
            self.failure_count(),
            self.processing_duration.as_secs_f64()
        )
    }
}

/// Batch processing errors
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("No PHP files found in directory: {path}")]
    NoFilesFound { path: String },

    #[error("IO error during directory traversal: {error}")]
    IoError { error: String },

    #[error("Thread pool error: {message}")]
    ThreadError { message: String },
}

impl BatchError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            BatchError::ThreadError { .. } => codes::batch::WORKER_FAILURE,
            _ => codes::batch::DISCOVERY_FAILURE,
        }
    }
}

// ============================================================================
// FILE DISCOVERY
// ============================================================================

/// Discover PHP files in a directory, sorted by path
pub fn discover_php_files(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<Vec<PathBuf>, BatchError> {
    crate::log_info!("Starting file discovery",
        "directory" => dir_path.display(),
        "recursive" => config.recursive
    );

    if !dir_path.is_dir() {
        let error = BatchError::DirectoryNotFound {
            path: dir_path.display().to_string(),
        };
        crate::log_error!(error.error_code(), &error.to_string());
        return Err(error);
    }

    let limit = config.effective_max_files();
    let mut files = Vec::new();
    visit_directory(dir_path, &mut files, config.recursive, limit)?;

    if files.is_empty() {
        return Err(BatchError::NoFilesFound {
            path: dir_path.display().to_string(),
        });
    }

    files.sort();

    crate::log_debug!("File discovery completed",
        "files_found" => files.len(),
        "directory" => dir_path.display()
    );

    Ok(files)
}

fn visit_directory(
    dir_path: &Path,
    files: &mut Vec<PathBuf>,
    recursive: bool,
    limit: usize,
) -> Result<(), BatchError> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir_path)
        .map_err(|e| BatchError::IoError {
            error: e.to_string(),
        })?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()
        .map_err(|e| BatchError::IoError {
            error: e.to_string(),
        })?;
    entries.sort();

    for path in entries {
        if files.len() >= limit {
            crate::log_warning!("Reached maximum file limit",
                "files_found" => files.len(),
                "limit" => limit
            );
            return Ok(());
        }

        if path.is_dir() {
            if recursive {
                visit_directory(&path, files, recursive, limit)?;
            }
        } else if is_php_file(&path) {
            files.push(path);
        }
    }

    Ok(())
}

/// Check if a path represents a PHP source file
fn is_php_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("php"))
            .unwrap_or(false)
}

// ============================================================================
// BATCH PROCESSING
// ============================================================================

/// Process a directory of PHP files sequentially
pub fn process_directory_sequential(
    dir_path: &Path,
    config: &BatchConfig,
    pipeline: &Pipeline,
) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();
    let files = discover_php_files(dir_path, config)?;

    let mut results = BatchResults::new();
    results.files_discovered = files.len();

    for (file_id, file_path) in files.iter().enumerate() {
        if config.progress_reporting {
            crate::log_info!("Processing file",
                "index" => file_id + 1,
                "total" => files.len(),
                "file" => file_path.display()
            );
        }

        match pipeline.process_file_with_id(file_path, file_id) {
            Ok(pipeline_result) => results.add_success(file_path.clone(), pipeline_result),
            Err(pipeline_error) => {
                record_failure(file_path, file_id, &pipeline_error);
                results.add_failure(file_path.clone(), pipeline_error);
                if config.fail_fast {
                    crate::log_warning!("Fail-fast mode enabled, stopping batch processing");
                    break;
                }
            }
        }
    }

    results.processing_duration = start_time.elapsed();
    log_completion(&results, 1);
    Ok(results)
}

/// Process a directory of PHP files on worker threads, chunk by chunk
pub fn process_directory_parallel(
    dir_path: &Path,
    config: &BatchConfig,
    pipeline: &Pipeline,
) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();
    let threads = config.effective_threads();
    let files = discover_php_files(dir_path, config)?;

    let mut results = BatchResults::new();
    results.files_discovered = files.len();

    let chunk_size = calculate_chunk_size(&files, threads);
    crate::log_debug!("Parallel processing configuration",
        "total_files" => files.len(),
        "chunk_size" => chunk_size,
        "threads" => threads
    );

    for (chunk_index, chunk) in files.chunks(chunk_size).enumerate() {
        let chunk_results = process_chunk_parallel(chunk, chunk_index * chunk_size, threads, pipeline)?;
        results.merge(chunk_results);

        if config.fail_fast && results.failure_count() > 0 {
            crate::log_warning!("Fail-fast mode enabled, stopping batch processing");
            break;
        }
    }

    results.sort();
    results.processing_duration = start_time.elapsed();
    log_completion(&results, threads);
    Ok(results)
}

fn process_chunk_parallel(
    files: &[PathBuf],
    first_file_id: usize,
    threads: usize,
    pipeline: &Pipeline,
) -> Result<BatchResults, BatchError> {
    let results = Arc::new(Mutex::new(BatchResults::new()));
    let files_per_thread = files.len().div_ceil(threads).max(1);
    let mut handles = Vec::new();

    for (thread_id, thread_files) in files.chunks(files_per_thread).enumerate() {
        let thread_files = thread_files.to_vec();
        let results = Arc::clone(&results);
        let pipeline = pipeline.clone();
        let base_id = first_file_id + thread_id * files_per_thread;

        handles.push(thread::spawn(move || -> Result<(), BatchError> {
            for (offset, file_path) in thread_files.into_iter().enumerate() {
                let file_id = base_id + offset;
                let outcome = pipeline.process_file_with_id(&file_path, file_id);
                if let Err(error) = &outcome {
                    record_failure(&file_path, file_id, error);
                }

                let mut guard = results.lock().map_err(|_| BatchError::ThreadError {
                    message: "Result collection lock poisoned".to_string(),
                })?;
                match outcome {
                    Ok(result) => guard.add_success(file_path, result),
                    Err(error) => guard.add_failure(file_path, error),
                }
            }
            Ok(())
        }));
    }

    for handle in handles {
        handle.join().map_err(|_| BatchError::ThreadError {
            message: "Thread panicked during processing".to_string(),
        })??;
    }

    let results = Arc::try_unwrap(results).map_err(|_| BatchError::ThreadError {
        message: "Failed to extract results from worker threads".to_string(),
    })?;
    results.into_inner().map_err(|_| BatchError::ThreadError {
        message: "Result collection lock poisoned".to_string(),
    })
}

fn record_failure(file_path: &Path, file_id: usize, error: &PipelineError) {
    logging::with_file_context(file_path.to_path_buf(), file_id, || {
        crate::log_error!(error.error_code(), &error.to_string(),
            "file" => file_path.display(),
            "stage" => error.stage()
        );
    });
}

fn log_completion(results: &BatchResults, threads: usize) {
    crate::log_success!(codes::success::BATCH_COMPLETE, "Batch processing completed",
        "files_processed" => results.files_processed,
        "successful" => results.success_count(),
        "failed" => results.failure_count(),
        "threads" => threads,
        "duration_ms" => format!("{:.2}", results.processing_duration.as_secs_f64() * 1000.0)
    );
}

/// Calculate chunk size for parallel processing
fn calculate_chunk_size(files: &[PathBuf], max_threads: usize) -> usize {
    const MIN_CHUNK_SIZE: usize = 1;
    const MAX_CHUNK_SIZE: usize = 50;

    let ideal_chunk_size = files.len().div_ceil(max_threads.max(1));
    ideal_chunk_size.clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE)
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Reflect every PHP file under `dir_path`, sequentially when one thread is configured
pub fn process_directory_with_config(
    dir_path: &Path,
    config: &BatchConfig,
    pipeline: &Pipeline,
) -> Result<BatchResults, BatchError> {
    if config.effective_threads() == 1 {
        process_directory_sequential(dir_path, config, pipeline)
    } else {
        process_directory_parallel(dir_path, config, pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_tree(root: &Path) {
        fs::write(root.join("a.php"), "<?php class A {}").unwrap();
        fs::write(root.join("broken.php"), "<?php class Broken {").unwrap();
        fs::write(root.join("notes.txt"), "not php").unwrap();
        fs::create_dir(root.join("lib")).unwrap();
        fs::write(root.join("lib").join("b.php"), "<?php function b() {}").unwrap();
    }

    #[test]
    fn test_file_discovery() {
        let temp_dir = tempdir().unwrap();
        write_tree(temp_dir.path());

        let recursive = discover_php_files(temp_dir.path(), &BatchConfig::default()).unwrap();
        assert_eq!(recursive.len(), 3);
        assert!(recursive.iter().all(|f| f.extension().unwrap() == "php"));

        let flat = BatchConfig {
            recursive: false,
            ..BatchConfig::default()
        };
        assert_eq!(discover_php_files(temp_dir.path(), &flat).unwrap().len(), 2);

        let limited = BatchConfig {
            max_files: Some(1),
            ..BatchConfig::default()
        };
        assert_eq!(discover_php_files(temp_dir.path(), &limited).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_directory() {
        let result = discover_php_files(Path::new("/no/such/dir"), &BatchConfig::default());
        assert!(matches!(result, Err(BatchError::DirectoryNotFound { .. })));
    }

    #[test]
    fn test_failure_does_not_abort_batch() {
        let temp_dir = tempdir().unwrap();
        write_tree(temp_dir.path());

        for threads in [1, 3] {
            let config = BatchConfig {
                max_threads: threads,
                ..BatchConfig::default()
            };
            let results =
                process_directory_with_config(temp_dir.path(), &config, &Pipeline::new()).unwrap();

            assert_eq!(results.files_processed, 3);
            assert_eq!(results.success_count(), 2);
            assert_eq!(results.failure_count(), 1);
            assert!(results.failed_files[0].0.ends_with("broken.php"));
            assert!(matches!(results.failed_files[0].1, PipelineError::Reflection(_)));
        }
    }

    #[test]
    fn test_fail_fast_stops_sequential_batch() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("a_broken.php"), "<?php class {}").unwrap();
        fs::write(temp_dir.path().join("b_ok.php"), "<?php class B {}").unwrap();

        let config = BatchConfig {
            max_threads: 1,
            fail_fast: true,
            ..BatchConfig::default()
        };
        let results =
            process_directory_with_config(temp_dir.path(), &config, &Pipeline::new()).unwrap();
        assert_eq!(results.files_processed, 1);
        assert_eq!(results.failure_count(), 1);
    }

    #[test]
    fn test_is_php_file() {
        let temp_dir = tempdir().unwrap();
        let php_file = temp_dir.path().join("test.PHP");
        let txt_file = temp_dir.path().join("test.txt");
        fs::write(&php_file, "content").unwrap();
        fs::write(&txt_file, "content").unwrap();

        assert!(is_php_file(&php_file));
        assert!(!is_php_file(&txt_file));
        assert!(!is_php_file(temp_dir.path()));
    }

    #[test]
    fn test_chunk_size_calculation() {
        assert_eq!(calculate_chunk_size(&vec![PathBuf::new(); 100], 4), 25);
        assert_eq!(calculate_chunk_size(&vec![PathBuf::new(); 10], 4), 3);
        assert_eq!(calculate_chunk_size(&vec![PathBuf::new(); 1], 4), 1);
        assert_eq!(calculate_chunk_size(&vec![PathBuf::new(); 200], 4), 50);
    }

    #[test]
    fn test_batch_results_summary() {
        let results = BatchResults::new();
        assert_eq!(results.success_rate(), 0.0);
        assert!(results.summary().contains("0 files processed"));
    }
}

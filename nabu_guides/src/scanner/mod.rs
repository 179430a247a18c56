//! Source discovery and freshness
//!
//! A document is re-parsed when it changed since its metadata was recorded,
//! or when one of its direct dependencies (or its parent) did. The check is
//! one level deep: a dependency whose own dependencies changed
//! still has fresh metadata.

pub mod parse_queue;

pub use parse_queue::ParseQueue;

use crate::meta::MetaStore;
use nabu_reflection::logging::codes;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Source directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Failed to walk '{path}': {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to read modification time of '{path}': {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    pub fn error_code(&self) -> nabu_reflection::logging::Code {
        codes::guides::SCAN_FAILURE
    }
}

/// A discovered source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Modification time in seconds since the epoch
    pub mtime: i64,
}

pub struct Scanner<'m> {
    extension: String,
    directory: PathBuf,
    metas: &'m MetaStore,
    files: BTreeMap<String, SourceFile>,
}

impl<'m> Scanner<'m> {
    pub fn new(extension: &str, directory: &Path, metas: &'m MetaStore) -> Self {
        Self {
            extension: extension.trim_start_matches('.').to_string(),
            directory: directory.to_path_buf(),
            metas,
            files: BTreeMap::new(),
        }
    }

    /// Walk the directory and decide which documents need parsing
    pub fn scan(&mut self) -> Result<ParseQueue, ScanError> {
        if !self.directory.is_dir() {
            return Err(ScanError::DirectoryNotFound(self.directory.clone()));
        }

        self.files = self.discover()?;

        let mut queue = ParseQueue::new();
        for document in self.files.keys() {
            queue.add_file(document, self.requires_parsing(document));
        }

        nabu_reflection::log_success!(codes::success::SCAN_COMPLETE, "Source scan complete",
            "directory" => self.directory.display(),
            "documents" => queue.len(),
            "to_parse" => queue.files_to_parse().len()
        );
        Ok(queue)
    }

    /// Files found by the last scan, keyed by document path
    pub fn files(&self) -> &BTreeMap<String, SourceFile> {
        &self.files
    }

    fn discover(&self) -> Result<BTreeMap<String, SourceFile>, ScanError> {
        let mut files = BTreeMap::new();

        for entry in WalkDir::new(&self.directory).sort_by_file_name() {
            let entry = entry.map_err(|source| ScanError::Walk {
                path: self.directory.clone(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let Some(document) = self.document_path(path) else {
                continue;
            };

            let modified = entry
                .metadata()
                .map_err(|source| ScanError::Walk {
                    path: path.to_path_buf(),
                    source,
                })?
                .modified()
                .map_err(|source| ScanError::Metadata {
                    path: path.to_path_buf(),
                    source,
                })?;

            files.insert(
                document,
                SourceFile {
                    path: path.to_path_buf(),
                    mtime: chrono::DateTime::<chrono::Utc>::from(modified).timestamp(),
                },
            );
        }

        Ok(files)
    }

    /// `guide/install.rst` to `guide/install`; `None` for other extensions
    fn document_path(&self, path: &Path) -> Option<String> {
        if path.extension()?.to_str()? != self.extension {
            return None;
        }

        let relative = path.strip_prefix(&self.directory).ok()?.with_extension("");
        let parts: Vec<&str> = relative
            .components()
            .map(|component| component.as_os_str().to_str())
            .collect::<Option<_>>()?;
        Some(parts.join("/"))
    }

    fn requires_parsing(&self, document: &str) -> bool {
        if self.has_file_been_updated(document) {
            return true;
        }

        let Some(entry) = self.metas.get(document) else {
            return true;
        };

        entry
            .depends
            .iter()
            .chain(entry.parent.iter())
            .any(|dependency| {
                !self.files.contains_key(dependency) || self.has_file_been_updated(dependency)
            })
    }

    /// New, or modified after its metadata was recorded
    fn has_file_been_updated(&self, document: &str) -> bool {
        match (self.metas.get(document), self.files.get(document)) {
            (Some(entry), Some(file)) => entry.mtime < file.mtime,
            _ => true,
        }
    }
}

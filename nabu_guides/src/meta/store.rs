use super::{MetaEntry, MetaError};
use nabu_reflection::logging::codes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Metadata of every known document, keyed by document path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetaStore {
    entries: BTreeMap<String, MetaEntry>,
}

impl MetaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from JSON; a missing file is an empty store
    pub fn load(path: &Path) -> Result<Self, MetaError> {
        if !path.exists() {
            nabu_reflection::log_debug!("No metadata file, starting empty",
                "path" => path.display()
            );
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path).map_err(|source| MetaError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| MetaError::Format {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), MetaError> {
        let content = serde_json::to_string_pretty(self).map_err(|source| MetaError::Format {
            path: path.display().to_string(),
            source,
        })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| MetaError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }
        fs::write(path, content).map_err(|source| MetaError::Io {
            path: path.display().to_string(),
            source,
        })?;

        nabu_reflection::log_success!(codes::success::METADATA_SAVED, "Metadata saved",
            "path" => path.display(),
            "documents" => self.entries.len()
        );
        Ok(())
    }

    pub fn get(&self, document: &str) -> Option<&MetaEntry> {
        self.entries.get(document)
    }

    pub fn get_mut(&mut self, document: &str) -> Option<&mut MetaEntry> {
        self.entries.get_mut(document)
    }

    /// Store an entry under its `file`, replacing any previous entry whole
    pub fn set(&mut self, entry: MetaEntry) {
        self.entries.insert(entry.file.clone(), entry);
    }

    pub fn remove(&mut self, document: &str) -> Option<MetaEntry> {
        self.entries.remove(document)
    }

    pub fn contains(&self, document: &str) -> bool {
        self.entries.contains_key(document)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetaEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

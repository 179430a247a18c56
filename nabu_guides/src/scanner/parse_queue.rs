use std::collections::BTreeMap;

/// Every discovered document and whether it must be parsed again
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseQueue {
    files: BTreeMap<String, bool>,
}

impl ParseQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, document: &str, parse_needed: bool) {
        self.files.insert(document.to_string(), parse_needed);
    }

    pub fn is_file_queued(&self, document: &str) -> bool {
        self.files.get(document).copied().unwrap_or(false)
    }

    pub fn is_known(&self, document: &str) -> bool {
        self.files.contains_key(document)
    }

    pub fn files_to_parse(&self) -> Vec<&str> {
        self.files
            .iter()
            .filter(|(_, parse)| **parse)
            .map(|(file, _)| file.as_str())
            .collect()
    }

    pub fn files_to_skip(&self) -> Vec<&str> {
        self.files
            .iter()
            .filter(|(_, parse)| !**parse)
            .map(|(file, _)| file.as_str())
            .collect()
    }

    /// Take the documents to parse, leaving the skipped ones behind
    pub fn drain(&mut self) -> Vec<String> {
        let queued: Vec<String> = self
            .files
            .iter()
            .filter(|(_, parse)| **parse)
            .map(|(file, _)| file.clone())
            .collect();
        self.files.retain(|_, parse| !*parse);
        queued
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

//! Per-document state shared by the tokenizer, the resolver and the renderer

use crate::meta::{MetaEntry, MetaStore};
use crate::references::url;
use std::collections::{BTreeMap, VecDeque};

#[derive(Debug, Clone, Default)]
pub struct Environment {
    current_file: String,
    metas: MetaStore,
    variables: BTreeMap<String, String>,
    links: BTreeMap<String, String>,
    anonymous: VecDeque<String>,
}

impl Environment {
    pub fn new(metas: MetaStore) -> Self {
        Self {
            metas,
            ..Self::default()
        }
    }

    /// Switch to `file` with an empty link table
    pub fn reset_document(&mut self, file: &str) {
        self.current_file = file.to_string();
        self.links.clear();
        self.anonymous.clear();
    }

    /// Switch to `file`, dropping the previous document's links
    ///
    /// Link targets recorded for `file` in the metadata are loaded back.
    pub fn start_document(&mut self, file: &str) {
        self.reset_document(file);

        if let Some(entry) = self.metas.get(file) {
            self.links.extend(
                entry
                    .links
                    .iter()
                    .map(|(name, url)| (normalize_name(name), url.trim().to_string())),
            );
        }
    }

    pub fn current_file(&self) -> &str {
        &self.current_file
    }

    pub fn set_current_file(&mut self, file: &str) {
        self.current_file = file.to_string();
    }

    pub fn dir_name(&self) -> &str {
        url::dir_name(&self.current_file)
    }

    /// Output url of the current document
    pub fn url(&self) -> String {
        format!("{}.html", self.current_file)
    }

    pub fn metas(&self) -> &MetaStore {
        &self.metas
    }

    pub fn metas_mut(&mut self) -> &mut MetaStore {
        &mut self.metas
    }

    pub fn into_metas(self) -> MetaStore {
        self.metas
    }

    pub fn get_meta_entry(&self) -> Option<&MetaEntry> {
        self.metas.get(&self.current_file)
    }

    pub fn set_variable(&mut self, name: &str, value: impl Into<String>) {
        self.variables.insert(name.to_string(), value.into());
    }

    pub fn get_variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    /// Record a link target; the name `_` names the oldest pending anonymous link
    pub fn set_link(&mut self, name: &str, url: &str) {
        let mut name = normalize_name(name);

        if name == "_" {
            match self.anonymous.pop_front() {
                Some(anonymous) => name = anonymous,
                None => {
                    nabu_reflection::log_warning!("Anonymous link target without a pending reference",
                        "file" => &self.current_file,
                        "url" => url
                    );
                    return;
                }
            }
        }

        self.links.insert(name, url.trim().to_string());
    }

    /// Url of a named link, `""` when unknown
    pub fn get_link(&self, name: &str) -> String {
        self.links
            .get(&normalize_name(name))
            .cloned()
            .unwrap_or_default()
    }

    pub fn links(&self) -> &BTreeMap<String, String> {
        &self.links
    }

    pub fn reset_anonymous_stack(&mut self) {
        self.anonymous.clear();
    }

    pub fn push_anonymous(&mut self, name: &str) {
        self.anonymous.push_back(normalize_name(name));
    }

    /// Root-relative document path of `url` as seen from the current document
    pub fn canonical_url(&self, url: &str) -> String {
        url::canonical_url(self.dir_name(), url)
    }

    /// A root-relative url made relative to the current document's directory
    pub fn relative_url(&self, url: &str) -> String {
        url::relative_url(self.dir_name(), url)
    }

    /// Url to put in rendered output for a root-relative target
    pub fn generate_url(&self, path: &str) -> String {
        self.relative_url(path)
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_are_case_insensitive() {
        let mut env = Environment::default();
        env.set_link("  PHP Manual ", " https://php.net ");
        assert_eq!(env.get_link("php manual"), "https://php.net");
        assert_eq!(env.get_link("unknown"), "");
    }

    #[test]
    fn test_anonymous_stack() {
        let mut env = Environment::default();
        env.reset_anonymous_stack();
        env.push_anonymous("First");
        env.push_anonymous("Second");

        env.set_link("_", "https://one.example");
        env.set_link("_", "https://two.example");
        env.set_link("_", "https://three.example");

        assert_eq!(env.get_link("first"), "https://one.example");
        assert_eq!(env.get_link("second"), "https://two.example");
        assert_eq!(env.links().len(), 2);
    }

    #[test]
    fn test_start_document_loads_stored_links() {
        let mut metas = MetaStore::new();
        let mut entry = MetaEntry::new("guide/install", "guide/install.html", "Install", 0);
        entry.links.insert("Composer".to_string(), "https://getcomposer.org".to_string());
        metas.set(entry);

        let mut env = Environment::new(metas);
        env.set_link("stale", "x");
        env.start_document("guide/install");

        assert_eq!(env.get_link("stale"), "");
        assert_eq!(env.get_link("composer"), "https://getcomposer.org");
        assert_eq!(env.dir_name(), "guide");
        assert_eq!(env.url(), "guide/install.html");
        assert_eq!(env.get_meta_entry().unwrap().title, "Install");
    }

    #[test]
    fn test_url_helpers_use_current_directory() {
        let mut env = Environment::default();
        env.set_current_file("guide/install");
        assert_eq!(env.canonical_url("../index"), "index");
        assert_eq!(env.generate_url("classes/Foo.html"), "../classes/Foo.html");
    }

    #[test]
    fn test_variables() {
        let mut env = Environment::default();
        env.set_variable("version", "3.0");
        assert_eq!(env.get_variable("version"), Some("3.0"));
        assert_eq!(env.get_variable("missing"), None);
    }
}

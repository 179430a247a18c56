use super::{slugify, MetaError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A heading and the headings nested below it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleNode {
    pub title: String,
    #[serde(default)]
    pub children: Vec<TitleNode>,
}

impl TitleNode {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            children: Vec::new(),
        }
    }
}

/// Everything later documents need to know about one parsed document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaEntry {
    pub file: String,
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub titles: Vec<TitleNode>,
    #[serde(default)]
    pub tocs: Vec<Vec<String>>,
    #[serde(default)]
    pub depends: Vec<String>,
    #[serde(default)]
    pub links: BTreeMap<String, String>,
    pub mtime: i64,
    #[serde(default)]
    pub parent: Option<String>,

    /// Original names already rewritten by `resolve_dependency`
    #[serde(skip)]
    resolved_dependencies: Vec<String>,
}

impl MetaEntry {
    pub fn new(file: impl Into<String>, url: impl Into<String>, title: impl Into<String>, mtime: i64) -> Self {
        Self {
            file: file.into(),
            url: url.into(),
            title: title.into(),
            titles: Vec::new(),
            tocs: Vec::new(),
            depends: Vec::new(),
            links: BTreeMap::new(),
            mtime,
            parent: None,
            resolved_dependencies: Vec::new(),
        }
    }

    /// All headings of the titles tree, depth first
    pub fn all_titles(&self) -> Vec<&str> {
        fn collect<'a>(nodes: &'a [TitleNode], out: &mut Vec<&'a str>) {
            for node in nodes {
                out.push(&node.title);
                collect(&node.children, out);
            }
        }

        let mut titles = Vec::new();
        collect(&self.titles, &mut titles);
        titles
    }

    /// Whether a heading slugs to the same value as `text`
    pub fn has_title(&self, text: &str) -> bool {
        let wanted = slugify(text);
        self.all_titles().into_iter().any(|title| slugify(title) == wanted)
    }

    /// The heading whose slug matches `text`, as written
    pub fn find_title(&self, text: &str) -> Option<&str> {
        let wanted = slugify(text);
        self.all_titles().into_iter().find(|title| slugify(title) == wanted)
    }

    /// Replace an unresolved dependency with the file it resolved to
    ///
    /// Only the first resolution of a given name counts; later calls are
    /// ignored. A target already listed is not added twice.
    pub fn resolve_dependency(&mut self, original: &str, new: &str) -> Result<(), MetaError> {
        if self.resolved_dependencies.iter().any(|d| d == original) {
            return Ok(());
        }

        let position = self
            .depends
            .iter()
            .position(|d| d == original)
            .ok_or_else(|| MetaError::UnknownDependency {
                dependency: original.to_string(),
                file: self.file.clone(),
            })?;

        if self.depends.iter().any(|d| d == new) {
            self.depends.remove(position);
        } else {
            self.depends[position] = new.to_string();
        }
        self.resolved_dependencies.push(original.to_string());
        Ok(())
    }

    pub fn remove_dependency(&mut self, dependency: &str) {
        if let Some(position) = self.depends.iter().position(|d| d == dependency) {
            self.depends.remove(position);
        }
    }

    pub fn set_parent(&mut self, parent: impl Into<String>) {
        self.parent = Some(parent.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn entry() -> MetaEntry {
        let mut entry = MetaEntry::new("guide/install", "guide/install.html", "Installation", 100);
        entry.titles = vec![TitleNode {
            title: "Installation".to_string(),
            children: vec![TitleNode::new("Using Composer"), TitleNode::new("PHAR")],
        }];
        entry.depends = vec!["index".to_string(), "UNRESOLVED__composer".to_string()];
        entry
    }

    #[test]
    fn test_has_title_compares_slugs() {
        let entry = entry();
        assert!(entry.has_title("using composer"));
        assert!(entry.has_title("Using  Composer!"));
        assert!(entry.has_title("Installation"));
        assert!(!entry.has_title("Configuration"));
        assert_eq!(entry.find_title("phar"), Some("PHAR"));
    }

    #[test]
    fn test_resolve_dependency_once() {
        let mut entry = entry();
        entry
            .resolve_dependency("UNRESOLVED__composer", "guide/composer")
            .unwrap();
        assert_eq!(entry.depends, vec!["index", "guide/composer"]);

        // already resolved: ignored even though the name is gone now
        entry
            .resolve_dependency("UNRESOLVED__composer", "elsewhere")
            .unwrap();
        assert_eq!(entry.depends, vec!["index", "guide/composer"]);
    }

    #[test]
    fn test_resolve_dependency_to_known_target() {
        let mut entry = entry();
        entry.resolve_dependency("UNRESOLVED__composer", "index").unwrap();
        assert_eq!(entry.depends, vec!["index"]);
    }

    #[test]
    fn test_resolve_unknown_dependency() {
        let mut entry = entry();
        assert_matches!(
            entry.resolve_dependency("missing", "x"),
            Err(MetaError::UnknownDependency { dependency, file }) if dependency == "missing" && file == "guide/install"
        );
    }

    #[test]
    fn test_remove_dependency() {
        let mut entry = entry();
        entry.remove_dependency("index");
        entry.remove_dependency("not-there");
        assert_eq!(entry.depends, vec!["UNRESOLVED__composer"]);
    }
}

//! Incremental two-phase guide build
//!
//! Phase 1 parses every queued document and writes its metadata entry.
//! Phase 2 starts only once all entries are written, so references between
//! documents parsed in the same run resolve against fresh metadata.

use crate::document::{self, Block, Document, DocumentError};
use crate::environment::Environment;
use crate::meta::{slugify, MetaEntry, MetaError, MetaStore};
use crate::references::{InvalidLink, ReferenceResolver};
use crate::render::{escape, HtmlRenderer, RenderError, Renderer, SpanRenderer};
use crate::scanner::{ScanError, Scanner, SourceFile};
use crate::span::{SpanPayload, SpanResult, SpanTokenizer};
use nabu_reflection::config::runtime::GuidesPreferences;
use nabu_reflection::logging::{self, codes, Code};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Meta(#[from] MetaError),

    #[error("{count} invalid link(s) found")]
    InvalidLinks { count: usize },
}

impl BuildError {
    pub fn error_code(&self) -> Code {
        match self {
            BuildError::Scan(error) => error.error_code(),
            BuildError::Meta(error) => error.error_code(),
            BuildError::InvalidLinks { .. } => codes::references::INVALID_LINK,
        }
    }
}

/// Why a single document could not be built
#[derive(Debug, thiserror::Error)]
enum DocumentFailure {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Failed to write '{path}': {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DocumentFailure {
    fn error_code(&self) -> Code {
        match self {
            DocumentFailure::Document(error) => error.error_code(),
            DocumentFailure::Render(error) => error.error_code(),
            DocumentFailure::Output { .. } => codes::file_processing::IO_ERROR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedDocument {
    pub document: String,
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub parsed: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<FailedDocument>,
    pub invalid_links: Vec<InvalidLink>,
    pub duration: Duration,
}

impl BuildReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Built {} document(s), skipped {}, failed {} in {:.2?}",
            self.parsed.len(),
            self.skipped.len(),
            self.failed.len(),
            self.duration
        );
        for failure in &self.failed {
            summary.push_str(&format!(
                "\n  error[{}]: {}: {}",
                failure.code, failure.document, failure.message
            ));
        }
        if !self.invalid_links.is_empty() {
            summary.push_str(&format!("\nInvalid links ({}):", self.invalid_links.len()));
            for link in &self.invalid_links {
                summary.push_str(&format!("\n  {}", link));
            }
        }
        summary
    }
}

/// A document parsed in phase 1, waiting to be rendered
struct ParsedDocument {
    document: Document,
    spans: Vec<SpanResult>,
}

pub struct Builder {
    extension: String,
    default_role: String,
    fail_on_invalid_links: bool,
    renderer: Box<dyn Renderer>,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    pub fn new() -> Self {
        Self {
            extension: "rst".to_string(),
            default_role: "ref".to_string(),
            fail_on_invalid_links: false,
            renderer: Box::new(HtmlRenderer),
        }
    }

    pub fn from_preferences(preferences: &GuidesPreferences) -> Self {
        Self {
            extension: preferences.source_extension.clone(),
            default_role: preferences.default_role.clone(),
            fail_on_invalid_links: preferences.fail_on_invalid_links,
            ..Self::new()
        }
    }

    pub fn with_renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.to_string();
        self
    }

    pub fn with_default_role(mut self, role: &str) -> Self {
        self.default_role = role.to_string();
        self
    }

    pub fn fail_on_invalid_links(mut self, fail: bool) -> Self {
        self.fail_on_invalid_links = fail;
        self
    }

    /// Build the guides under `source_dir`
    ///
    /// Metadata is loaded from and saved back to `meta_path`. Rendered pages
    /// are written below `out_dir` when one is given. A document that fails
    /// is reported without stopping the build.
    pub fn build(
        &self,
        source_dir: &Path,
        meta_path: &Path,
        out_dir: Option<&Path>,
    ) -> Result<BuildReport, BuildError> {
        let start = Instant::now();
        let metas = MetaStore::load(meta_path)?;

        let (queue, files) = {
            let mut scanner = Scanner::new(&self.extension, source_dir, &metas);
            let queue = scanner.scan()?;
            (queue, scanner.files().clone())
        };

        let mut report = BuildReport {
            skipped: queue.files_to_skip().into_iter().map(str::to_string).collect(),
            ..BuildReport::default()
        };
        let mut env = Environment::new(metas);
        let mut resolver = ReferenceResolver::new();

        let mut parsed = Vec::new();
        for (file_id, document) in queue.files_to_parse().into_iter().enumerate() {
            let Some(source) = files.get(document) else {
                continue;
            };
            let result = logging::with_file_context(source.path.clone(), file_id, || {
                self.collect_metadata(&mut env, &mut resolver, document, source)
            });

            match result {
                Ok(parsed_document) => parsed.push(parsed_document),
                Err(error) => record_failure(&mut report, document, &source.path, &error),
            }
        }

        nabu_reflection::log_success!(codes::success::METADATA_PHASE_COMPLETE, "Metadata phase complete",
            "parsed" => parsed.len(),
            "failed" => report.failed.len()
        );

        assign_parents(&mut env, &parsed);

        for (file_id, document) in parsed.iter().enumerate() {
            let name = document.document.file.as_str();
            let path = files.get(name).map(|source| source.path.clone()).unwrap_or_default();

            let result = logging::with_file_context(path.clone(), file_id, || {
                let html = self.render_document(&mut env, &mut resolver, document)?;
                if let Some(out_dir) = out_dir {
                    write_output(out_dir, name, &html)?;
                }
                Ok::<(), DocumentFailure>(())
            });

            for link in resolver.invalid_links() {
                nabu_reflection::log_warning!("Invalid link",
                    "file" => &link.document,
                    "link" => &link.link
                );
            }
            report.invalid_links.extend_from_slice(resolver.invalid_links());

            match result {
                Ok(()) => report.parsed.push(name.to_string()),
                Err(error) => {
                    env.metas_mut().remove(name);
                    record_failure(&mut report, name, &path, &error);
                }
            }
        }

        nabu_reflection::log_success!(codes::success::RENDER_PHASE_COMPLETE, "Render phase complete",
            "rendered" => report.parsed.len(),
            "invalid_links" => report.invalid_links.len()
        );

        env.into_metas().save(meta_path)?;
        report.duration = start.elapsed();

        if self.fail_on_invalid_links && !report.invalid_links.is_empty() {
            return Err(BuildError::InvalidLinks {
                count: report.invalid_links.len(),
            });
        }
        Ok(report)
    }

    /// Phase 1: parse one document and store its metadata entry
    fn collect_metadata(
        &self,
        env: &mut Environment,
        resolver: &mut ReferenceResolver,
        name: &str,
        source: &SourceFile,
    ) -> Result<ParsedDocument, DocumentFailure> {
        let text = document::read_source(&source.path)?;
        let document = document::parse(name, &text)?;

        env.reset_document(name);
        resolver.scope(name);

        let spans: Vec<SpanResult> = {
            let mut tokenizer = SpanTokenizer::new(resolver).with_default_role(&self.default_role);
            document
                .paragraphs()
                .map(|paragraph| tokenizer.tokenize(env, paragraph))
                .collect()
        };

        for target in &document.targets {
            if target.is_anonymous() || !target.url.is_empty() {
                env.set_link(&target.name, &target.url);
            }
        }

        let mut tocs = Vec::with_capacity(document.tocs.len());
        for toc in &document.tocs {
            let mut entries = Vec::with_capacity(toc.len());
            for entry in toc {
                if let Err(error) = resolver.add_dependency(env, entry, false) {
                    nabu_reflection::log_error!(error.error_code(), &error.to_string(),
                        "file" => name
                    );
                    continue;
                }
                entries.push(env.canonical_url(entry));
            }
            tocs.push(entries);
        }

        let mut entry = MetaEntry::new(
            name,
            format!("{}.html", name),
            document.title().unwrap_or(name),
            source.mtime,
        );
        entry.titles = document.titles.clone();
        entry.tocs = tocs;
        entry.depends = resolver.dependencies().to_vec();
        entry.links = env.links().clone();
        for target in document.targets.iter().filter(|t| !t.is_anonymous()) {
            entry.links.entry(target.name.clone()).or_default();
        }
        env.metas_mut().set(entry);

        Ok(ParsedDocument { document, spans })
    }

    /// Phase 2: resolve and render one document
    fn render_document(
        &self,
        env: &mut Environment,
        resolver: &mut ReferenceResolver,
        parsed: &ParsedDocument,
    ) -> Result<String, DocumentFailure> {
        let name = parsed.document.file.as_str();
        env.start_document(name);
        resolver.scope(name);

        for token in parsed.spans.iter().flat_map(|span| &span.tokens) {
            if let SpanPayload::Reference(data) = &token.payload {
                let role = data.joined_role();
                if resolver.has_role(&role) {
                    resolver.found(env, &role, &data.url);
                }
            }
        }

        let mut html = String::new();
        let mut spans = parsed.spans.iter();
        for block in &parsed.document.blocks {
            match block {
                Block::Title { level, text } => {
                    let anchor = self
                        .renderer
                        .render("anchor.html", &json!({ "name": slugify(text) }))?;
                    let tag = (level + 1).min(6);
                    html.push_str(&format!("{}<h{tag}>{}</h{tag}>\n", anchor, escape(text)));
                }
                Block::Paragraph { .. } => {
                    let Some(span) = spans.next() else {
                        continue;
                    };
                    let body = SpanRenderer::new(env, resolver, self.renderer.as_ref()).render(span)?;
                    html.push_str(&format!("<p>{}</p>\n", body));
                }
            }
        }

        Ok(html)
    }
}

/// Toctree entries become children of the document listing them
fn assign_parents(env: &mut Environment, parsed: &[ParsedDocument]) {
    for document in parsed {
        let parent = document.document.file.as_str();
        let children: Vec<String> = env
            .metas()
            .get(parent)
            .map(|entry| entry.tocs.iter().flatten().cloned().collect())
            .unwrap_or_default();

        for child in children {
            if let Some(entry) = env.metas_mut().get_mut(&child) {
                entry.set_parent(parent);
            }
        }
    }
}

fn write_output(out_dir: &Path, document: &str, html: &str) -> Result<(), DocumentFailure> {
    let path = out_dir.join(format!("{}.html", document));
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| DocumentFailure::Output {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(&path, html).map_err(|source| DocumentFailure::Output { path, source })
}

fn record_failure(report: &mut BuildReport, document: &str, path: &Path, error: &DocumentFailure) {
    logging::with_file_context(path.to_path_buf(), 0, || {
        nabu_reflection::log_error!(codes::guides::DOCUMENT_FAILURE, &format!("Failed to build document: {}", error),
            "file" => document,
            "cause" => error.error_code().as_str()
        );
    });
    report.failed.push(FailedDocument {
        document: document.to_string(),
        code: error.error_code().as_str(),
        message: error.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    struct Project {
        dir: TempDir,
    }

    impl Project {
        fn new(files: &[(&str, &str)]) -> Self {
            let dir = TempDir::new().unwrap();
            for (relative, content) in files {
                let path = dir.path().join("docs").join(relative);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(path, content).unwrap();
            }
            Self { dir }
        }

        fn docs(&self) -> PathBuf {
            self.dir.path().join("docs")
        }

        fn meta(&self) -> PathBuf {
            self.dir.path().join("cache/meta.json")
        }

        fn out(&self) -> PathBuf {
            self.dir.path().join("out")
        }

        fn build(&self) -> BuildReport {
            Builder::new()
                .build(&self.docs(), &self.meta(), Some(&self.out()))
                .unwrap()
        }

        fn page(&self, document: &str) -> String {
            fs::read_to_string(self.out().join(format!("{}.html", document))).unwrap()
        }
    }

    const INDEX: &str = "\
Guide
=====

Start with :doc:`guide/install` or read `Using Composer`.

.. toctree::

   guide/install
";

    const INSTALL: &str = "\
Installation
============

Using Composer
--------------

Back to :doc:`../index`, see PHP_ and missing_.

.. _PHP: https://php.net
";

    #[test]
    fn test_build_renders_cross_references() {
        let project = Project::new(&[("index.rst", INDEX), ("guide/install.rst", INSTALL)]);
        let report = project.build();

        assert_eq!(report.parsed, vec!["guide/install", "index"]);
        assert!(report.failed.is_empty());

        let index = project.page("index");
        assert!(index.contains("<h1>Guide</h1>"));
        assert!(index.contains(
            "<a href=\"guide/install.html\" class=\"reference internal\">Installation</a>"
        ));
        assert!(index.contains(
            "<a href=\"guide/install.html#using-composer\" class=\"reference internal\">Using Composer</a>"
        ));

        let install = project.page("guide/install");
        assert!(install.contains("<a href=\"../index.html\" class=\"reference internal\">Guide</a>"));
        assert!(install.contains("<a href=\"https://php.net\">PHP</a>"));
        assert_eq!(
            report.invalid_links,
            vec![InvalidLink {
                document: "guide/install".to_string(),
                link: "missing".to_string()
            }]
        );
    }

    #[test]
    fn test_build_persists_metadata() {
        let project = Project::new(&[("index.rst", INDEX), ("guide/install.rst", INSTALL)]);
        project.build();

        let metas = MetaStore::load(&project.meta()).unwrap();
        let index = metas.get("index").unwrap();
        assert_eq!(index.title, "Guide");
        assert_eq!(index.tocs, vec![vec!["guide/install".to_string()]]);
        assert_eq!(index.depends, vec!["guide/install"]);

        let install = metas.get("guide/install").unwrap();
        assert_eq!(install.parent.as_deref(), Some("index"));
        assert_eq!(install.links.get("php").map(String::as_str), Some("https://php.net"));
        assert_eq!(install.depends, vec!["index"]);
    }

    #[test]
    fn test_second_build_skips_fresh_documents() {
        let project = Project::new(&[("index.rst", INDEX), ("guide/install.rst", INSTALL)]);
        project.build();

        let report = project.build();
        assert!(report.parsed.is_empty());
        assert_eq!(report.skipped, vec!["guide/install", "index"]);
    }

    #[test]
    fn test_failed_document_does_not_stop_the_build() {
        let project = Project::new(&[
            ("index.rst", "Index\n=====\n\nHello.\n"),
            ("broken.rst", "Broken\n======\n\n.. _: https://nowhere.example\n"),
        ]);
        let report = project.build();

        assert_eq!(report.parsed, vec!["index"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].document, "broken");
        assert!(report.has_failures());
        assert!(report.summary().contains("broken"));

        let metas = MetaStore::load(&project.meta()).unwrap();
        assert!(metas.contains("index"));
        assert!(!metas.contains("broken"));
    }

    #[test]
    fn test_fail_on_invalid_links() {
        let project = Project::new(&[("index.rst", "Index\n=====\n\nSee nowhere_.\n")]);
        let result = Builder::new()
            .fail_on_invalid_links(true)
            .build(&project.docs(), &project.meta(), None);
        assert_matches!(result, Err(BuildError::InvalidLinks { count: 1 }));
        assert!(project.meta().exists());
    }

    struct MarkdownLinks;

    impl Renderer for MarkdownLinks {
        fn render(&self, template: &str, vars: &serde_json::Value) -> Result<String, RenderError> {
            match template {
                "link.html" => Ok(format!(
                    "[{}]({})",
                    vars["title"].as_str().unwrap_or_default(),
                    vars["url"].as_str().unwrap_or_default()
                )),
                "anchor.html" => Ok(String::new()),
                other => Err(RenderError::UnknownTemplate(other.to_string())),
            }
        }
    }

    #[test]
    fn test_custom_renderer() {
        let project = Project::new(&[("index.rst", INDEX), ("guide/install.rst", INSTALL)]);
        Builder::new()
            .with_renderer(Box::new(MarkdownLinks))
            .build(&project.docs(), &project.meta(), Some(&project.out()))
            .unwrap();

        let index = project.page("index");
        assert!(index.contains("<h1>Guide</h1>"));
        assert!(index.contains("[Installation](guide/install.html)"));
    }

    #[test]
    fn test_missing_source_directory() {
        let dir = TempDir::new().unwrap();
        let result = Builder::new().build(&dir.path().join("none"), &dir.path().join("meta.json"), None);
        assert_matches!(result, Err(BuildError::Scan(ScanError::DirectoryNotFound(_))));
    }
}

//! RST document skeleton
//!
//! Only the structure the build needs is recognised: section titles,
//! explicit link targets, toctrees and paragraphs. Other directives and
//! comments are skipped together with their indented body.

use crate::meta::TitleNode;
use nabu_reflection::config::compile_time::guides::MAX_DOCUMENT_SIZE;
use nabu_reflection::logging::codes;
use std::fs;
use std::path::{Path, PathBuf};

/// Characters accepted as title underlines
pub const TITLE_ADORNMENTS: &[char] = &['=', '-', '~', '^', '"', '\'', '*', '+', '#'];

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Document '{path}' is {size} bytes, above the {limit} byte limit")]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("Document '{0}' is not valid UTF-8")]
    InvalidEncoding(PathBuf),

    #[error("Link target without a name on line {line}")]
    InvalidTarget { line: usize },
}

impl DocumentError {
    pub fn error_code(&self) -> nabu_reflection::logging::Code {
        match self {
            DocumentError::Io { .. } => codes::file_processing::IO_ERROR,
            DocumentError::TooLarge { .. } => codes::file_processing::FILE_TOO_LARGE,
            DocumentError::InvalidEncoding(_) => codes::file_processing::INVALID_ENCODING,
            DocumentError::InvalidTarget { .. } => codes::guides::DOCUMENT_FAILURE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Title { level: usize, text: String },
    Paragraph { text: String, line: usize },
}

/// `.. _name: url`; the url is empty for internal targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    pub name: String,
    pub url: String,
}

impl LinkTarget {
    /// `.. __: url`, naming the next pending anonymous reference
    pub fn is_anonymous(&self) -> bool {
        self.name == "_"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub file: String,
    pub blocks: Vec<Block>,
    pub titles: Vec<TitleNode>,
    pub targets: Vec<LinkTarget>,
    pub tocs: Vec<Vec<String>>,
}

impl Document {
    /// Text of the first title, if any
    pub fn title(&self) -> Option<&str> {
        self.titles.first().map(|node| node.title.as_str())
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Paragraph { text, .. } => Some(text.as_str()),
            Block::Title { .. } => None,
        })
    }
}

/// Read a source file, enforcing the size limit
pub fn read_source(path: &Path) -> Result<String, DocumentError> {
    let size = fs::metadata(path)
        .map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .len();
    if size > MAX_DOCUMENT_SIZE {
        return Err(DocumentError::TooLarge {
            path: path.to_path_buf(),
            size,
            limit: MAX_DOCUMENT_SIZE,
        });
    }

    let bytes = fs::read(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|_| DocumentError::InvalidEncoding(path.to_path_buf()))
}

pub fn parse(file: &str, source: &str) -> Result<Document, DocumentError> {
    Parser::new(file, source).parse()
}

struct Parser<'s> {
    lines: Vec<&'s str>,
    position: usize,
    adornments: Vec<char>,
    paragraph: Vec<&'s str>,
    paragraph_line: usize,
    document: Document,
}

impl<'s> Parser<'s> {
    fn new(file: &str, source: &'s str) -> Self {
        Self {
            lines: source.lines().collect(),
            position: 0,
            adornments: Vec::new(),
            paragraph: Vec::new(),
            paragraph_line: 0,
            document: Document {
                file: file.to_string(),
                ..Document::default()
            },
        }
    }

    fn parse(mut self) -> Result<Document, DocumentError> {
        while let Some(&line) = self.lines.get(self.position) {
            let trimmed = line.trim();

            if trimmed.is_empty() {
                self.flush_paragraph();
                self.position += 1;
            } else if let Some(target) = line.strip_prefix(".. _") {
                self.flush_paragraph();
                self.parse_target(target)?;
                self.position += 1;
            } else if trimmed == ".. toctree::" && !is_indented(line) {
                self.flush_paragraph();
                self.position += 1;
                self.parse_toctree();
            } else if line.starts_with("..") {
                self.flush_paragraph();
                self.position += 1;
                self.skip_indented();
            } else if let Some(adornment) = self.underline_below(line) {
                self.flush_paragraph();
                self.add_title(adornment, trimmed);
                self.position += 2;
            } else if self.paragraph.is_empty() && is_underline(trimmed).is_some() {
                // transition
                self.position += 1;
            } else {
                if self.paragraph.is_empty() {
                    self.paragraph_line = self.position + 1;
                }
                self.paragraph.push(line.trim_start());
                self.position += 1;
            }
        }

        self.flush_paragraph();
        Ok(self.document)
    }

    fn flush_paragraph(&mut self) {
        if self.paragraph.is_empty() {
            return;
        }
        let text = self.paragraph.join("\n");
        self.paragraph.clear();
        self.document.blocks.push(Block::Paragraph {
            text,
            line: self.paragraph_line,
        });
    }

    /// `.. _name: url`, `.. _name:` and `` .. _`odd: name`: url ``
    fn parse_target(&mut self, target: &str) -> Result<(), DocumentError> {
        let (name, rest) = match target.strip_prefix('`') {
            Some(quoted) => match quoted.split_once("`:") {
                Some((name, rest)) => (name, rest),
                None => (quoted, ""),
            },
            None => match target.split_once(": ") {
                Some((name, rest)) => (name, rest),
                None => (target.trim_end().trim_end_matches(':'), ""),
            },
        };

        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return Err(DocumentError::InvalidTarget {
                line: self.position + 1,
            });
        }

        self.document.targets.push(LinkTarget {
            name,
            url: rest.trim().to_string(),
        });
        Ok(())
    }

    fn parse_toctree(&mut self) {
        let mut entries = Vec::new();

        while let Some(&line) = self.lines.get(self.position) {
            let trimmed = line.trim();
            if !trimmed.is_empty() && !is_indented(line) {
                break;
            }
            if !trimmed.is_empty() && !trimmed.starts_with(':') {
                entries.push(trimmed.to_string());
            }
            self.position += 1;
        }

        self.document.tocs.push(entries);
    }

    fn skip_indented(&mut self) {
        while let Some(&line) = self.lines.get(self.position) {
            if !line.trim().is_empty() && !is_indented(line) {
                break;
            }
            self.position += 1;
        }
    }

    fn underline_below(&self, line: &str) -> Option<char> {
        if is_indented(line) || !self.paragraph.is_empty() {
            return None;
        }
        let next = self.lines.get(self.position + 1)?;
        let adornment = is_underline(next.trim_end())?;
        (next.trim_end().chars().count() >= line.trim().chars().count()).then_some(adornment)
    }

    fn add_title(&mut self, adornment: char, text: &str) {
        let level = match self.adornments.iter().position(|&c| c == adornment) {
            Some(level) => level,
            None => {
                self.adornments.push(adornment);
                self.adornments.len() - 1
            }
        };

        insert_title(&mut self.document.titles, level, text);
        self.document.blocks.push(Block::Title {
            level,
            text: text.to_string(),
        });
    }
}

fn is_indented(line: &str) -> bool {
    line.starts_with([' ', '\t'])
}

/// The adornment character when `line` is one repeated adornment
fn is_underline(line: &str) -> Option<char> {
    let first = line.chars().next()?;
    (TITLE_ADORNMENTS.contains(&first) && line.chars().all(|c| c == first)).then_some(first)
}

/// Attach a title at `level`, below the last title of the level above
fn insert_title(nodes: &mut Vec<TitleNode>, level: usize, text: &str) {
    match nodes.last_mut() {
        Some(last) if level > 0 => insert_title(&mut last.children, level - 1, text),
        _ => nodes.push(TitleNode::new(text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const SOURCE: &str = "\
Installation
============

Intro paragraph with a
second line.

Using Composer
--------------

Run ``composer require``.

.. _composer-docs: https://getcomposer.org
.. _requirements:

Requirements
------------

Details
~~~~~~~

.. toctree::
   :maxdepth: 2

   install/phar
   install/docker

.. note::

   Skipped directive body.

Last words.
";

    #[test]
    fn test_titles_tree() {
        let document = parse("install", SOURCE).unwrap();
        assert_eq!(document.title(), Some("Installation"));
        assert_eq!(
            document.titles,
            vec![TitleNode {
                title: "Installation".to_string(),
                children: vec![
                    TitleNode::new("Using Composer"),
                    TitleNode {
                        title: "Requirements".to_string(),
                        children: vec![TitleNode::new("Details")],
                    },
                ],
            }]
        );
    }

    #[test]
    fn test_paragraphs_targets_and_tocs() {
        let document = parse("install", SOURCE).unwrap();

        assert_eq!(
            document.paragraphs().collect::<Vec<_>>(),
            vec![
                "Intro paragraph with a\nsecond line.",
                "Run ``composer require``.",
                "Last words.",
            ]
        );
        assert_eq!(
            document.targets,
            vec![
                LinkTarget {
                    name: "composer-docs".to_string(),
                    url: "https://getcomposer.org".to_string()
                },
                LinkTarget {
                    name: "requirements".to_string(),
                    url: String::new()
                },
            ]
        );
        assert_eq!(
            document.tocs,
            vec![vec!["install/phar".to_string(), "install/docker".to_string()]]
        );
    }

    #[test]
    fn test_short_underline_is_not_a_title() {
        let document = parse("x", "Long title\n===\n").unwrap();
        assert!(document.titles.is_empty());
        assert_eq!(document.paragraphs().count(), 1);
    }

    #[test]
    fn test_anonymous_and_quoted_targets() {
        let document = parse("x", ".. __: https://a.example\n.. _`Odd: Name`: https://b.example\n").unwrap();
        assert!(document.targets[0].is_anonymous());
        assert_eq!(document.targets[1].name, "odd: name");
        assert_eq!(document.targets[1].url, "https://b.example");
    }

    #[test]
    fn test_nameless_target_fails() {
        assert_matches!(
            parse("x", "Text\n\n.. _: https://a.example\n"),
            Err(DocumentError::InvalidTarget { line: 3 })
        );
    }

    #[test]
    fn test_read_source_rejects_invalid_utf8() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("bad.rst");
        fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        assert_matches!(read_source(&path), Err(DocumentError::InvalidEncoding(_)));
    }
}

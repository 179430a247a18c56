//! # Nabu Guides
//!
//! Incremental builds of reStructuredText guides: inline spans are
//! tokenized, cross-references resolved against metadata persisted between
//! runs, and only documents whose sources or direct dependencies changed
//! are parsed again.

pub mod build;
pub mod document;
pub mod environment;
pub mod meta;
pub mod references;
pub mod render;
pub mod scanner;
pub mod span;

pub use build::{BuildError, BuildReport, Builder, FailedDocument};
pub use environment::Environment;
pub use meta::{MetaEntry, MetaError, MetaStore, TitleNode};
pub use references::{InvalidLink, Reference, ReferenceError, ReferenceResolver, ResolvedReference};
pub use render::{HtmlRenderer, RenderError, Renderer, SpanRenderer};
pub use scanner::{ParseQueue, ScanError, Scanner};
pub use span::{SpanResult, SpanToken, SpanTokenizer};

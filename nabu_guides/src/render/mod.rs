//! Output rendering
//!
//! [`SpanRenderer`] turns tokenized spans into markup. Anything template
//! shaped (links, anchors) goes through the [`Renderer`] seam so the output
//! format can be swapped without touching span handling.

pub mod html;
pub mod span_renderer;

pub use html::HtmlRenderer;
pub use span_renderer::{escape, render, SpanRenderer};

use nabu_reflection::logging::codes;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Unknown template \"{0}\"")]
    UnknownTemplate(String),

    #[error("Template \"{template}\" requires the variable \"{variable}\"")]
    MissingVariable { template: String, variable: String },
}

impl RenderError {
    pub fn error_code(&self) -> nabu_reflection::logging::Code {
        codes::guides::RENDER_FAILURE
    }
}

/// Renders a named template with JSON variables
pub trait Renderer: Send + Sync {
    fn render(&self, template: &str, vars: &serde_json::Value) -> Result<String, RenderError>;
}

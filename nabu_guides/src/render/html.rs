use super::span_renderer::escape;
use super::{RenderError, Renderer};
use serde_json::Value;

/// Built-in HTML templates
///
/// `link.html` takes `{url, title, attributes}`, the title being markup
/// already; `anchor.html` takes `{name}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    pub fn new() -> Self {
        Self
    }

    fn link(&self, vars: &Value) -> Result<String, RenderError> {
        let url = required(vars, "link.html", "url")?;
        let title = required(vars, "link.html", "title")?;

        let mut html = format!("<a href=\"{}\"", escape(url));
        if let Some(attributes) = vars.get("attributes").and_then(Value::as_object) {
            for (name, value) in attributes {
                let value = value.as_str().map_or_else(|| value.to_string(), str::to_string);
                html.push_str(&format!(" {}=\"{}\"", escape(name), escape(&value)));
            }
        }
        html.push('>');
        html.push_str(title);
        html.push_str("</a>");
        Ok(html)
    }

    fn anchor(&self, vars: &Value) -> Result<String, RenderError> {
        let name = required(vars, "anchor.html", "name")?;
        Ok(format!("<a id=\"{}\"></a>", escape(name)))
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, template: &str, vars: &Value) -> Result<String, RenderError> {
        match template {
            "link.html" => self.link(vars),
            "anchor.html" => self.anchor(vars),
            other => Err(RenderError::UnknownTemplate(other.to_string())),
        }
    }
}

fn required<'v>(vars: &'v Value, template: &str, variable: &str) -> Result<&'v str, RenderError> {
    vars.get(variable)
        .and_then(Value::as_str)
        .ok_or_else(|| RenderError::MissingVariable {
            template: template.to_string(),
            variable: variable.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn test_link_template() {
        let html = HtmlRenderer
            .render(
                "link.html",
                &json!({
                    "url": "guide/install.html?a=1&b=2",
                    "title": "<em>Install</em>",
                    "attributes": {"class": "reference internal"}
                }),
            )
            .unwrap();
        assert_eq!(
            html,
            "<a href=\"guide/install.html?a=1&amp;b=2\" class=\"reference internal\"><em>Install</em></a>"
        );
    }

    #[test]
    fn test_anchor_template() {
        let html = HtmlRenderer.render("anchor.html", &json!({"name": "setup"})).unwrap();
        assert_eq!(html, "<a id=\"setup\"></a>");
    }

    #[test]
    fn test_template_errors() {
        assert_matches!(
            HtmlRenderer.render("image.html", &json!({})),
            Err(RenderError::UnknownTemplate(name)) if name == "image.html"
        );
        assert_matches!(
            HtmlRenderer.render("link.html", &json!({"title": "x"})),
            Err(RenderError::MissingVariable { variable, .. }) if variable == "url"
        );
    }
}

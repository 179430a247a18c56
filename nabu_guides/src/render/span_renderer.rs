use super::{RenderError, Renderer};
use crate::environment::Environment;
use crate::meta::slugify;
use crate::references::{ReferenceResolver, ResolvedReference};
use crate::span::{ReferenceData, SpanPayload, SpanResult, SpanToken};
use regex::{Captures, Regex};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static STRONG_EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\*\*(.+?)\*\*").expect("strong emphasis pattern"));

static EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\*(.+?)\*").expect("emphasis pattern"));

static VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\|(.+?)\|").expect("variable pattern"));

/// Escape text for HTML content and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            ch => out.push(ch),
        }
    }
    out
}

/// Renders tokenized spans of the current document
///
/// Reference tokens are resolved as they are rendered, so the resolver must
/// be scoped to the document and know its dependencies.
pub struct SpanRenderer<'a> {
    env: &'a mut Environment,
    resolver: &'a mut ReferenceResolver,
    renderer: &'a dyn Renderer,
}

impl<'a> SpanRenderer<'a> {
    pub fn new(
        env: &'a mut Environment,
        resolver: &'a mut ReferenceResolver,
        renderer: &'a dyn Renderer,
    ) -> Self {
        Self {
            env,
            resolver,
            renderer,
        }
    }

    pub fn render(&mut self, span: &SpanResult) -> Result<String, RenderError> {
        let mut output = self.render_syntaxes(&span.value);

        // a token's text can hold the ids of tokens created before it
        for token in span.tokens.iter().rev() {
            let rendered = self.render_token(token)?;
            output = output.replace(&token.id, &rendered);
        }

        Ok(output)
    }

    fn render_syntaxes(&self, text: &str) -> String {
        let text = escape(text);
        let text = STRONG_EMPHASIS.replace_all(&text, "<strong>$1</strong>");
        let text = EMPHASIS.replace_all(&text, "<em>$1</em>");
        let text = text.replace('~', "&nbsp;");
        let text = VARIABLE.replace_all(&text, |caps: &Captures<'_>| {
            caps.get(1)
                .and_then(|name| self.env.get_variable(name.as_str()))
                .unwrap_or_default()
                .to_string()
        });
        text.replace(" \n", "<br>")
    }

    fn render_token(&mut self, token: &SpanToken) -> Result<String, RenderError> {
        match &token.payload {
            SpanPayload::Literal { text } => Ok(format!("<code>{}</code>", escape(text))),
            SpanPayload::Reference(data) => self.render_reference(data),
            SpanPayload::Link { link, url } => self.render_link(link, url),
            SpanPayload::Anchor { link } => {
                let anchor = self
                    .renderer
                    .render("anchor.html", &json!({ "name": slugify(link) }))?;
                Ok(format!("{}{}", anchor, escape(link)))
            }
        }
    }

    fn render_reference(&mut self, data: &ReferenceData) -> Result<String, RenderError> {
        let role = data.joined_role();

        let mut entry = self.env.get_meta_entry().cloned();
        let resolved = self.resolver.resolve(&*self.env, &role, &data.url, entry.as_mut());
        if let Some(entry) = entry {
            self.env.metas_mut().set(entry);
        }

        match resolved {
            Ok(Some(reference)) => {
                let title = match &data.text {
                    Some(text) => escape(text),
                    None => escape(&reference.title),
                };
                let url = match &data.anchor {
                    Some(anchor) => format!("{}#{}", reference.url, anchor),
                    None => reference.url.clone(),
                };
                self.link(&url, &title, &reference)
            }
            Ok(None) => {
                self.resolver.add_invalid_link(&data.url);
                Ok(escape(data.display_text()))
            }
            Err(error) => {
                nabu_reflection::log_error!(error.error_code(), &error.to_string(),
                    "file" => self.env.current_file(),
                    "role" => &role
                );
                Ok(escape(data.display_text()))
            }
        }
    }

    fn render_link(&mut self, link: &str, url: &str) -> Result<String, RenderError> {
        let mut url = url.to_string();

        if url.is_empty() {
            url = self.env.get_link(link);
        }
        if url.is_empty() {
            if let Some(entry) = self.env.get_meta_entry().filter(|entry| entry.has_title(link)) {
                url = format!("{}#{}", entry.url, slugify(link));
            }
        }
        if url.is_empty() {
            self.resolver.add_invalid_link(link);
            return Ok(escape(link));
        }

        let title = self.render_syntaxes(link);
        self.render_template_link(&url, &title, &BTreeMap::new())
    }

    fn link(&self, url: &str, title: &str, reference: &ResolvedReference) -> Result<String, RenderError> {
        self.render_template_link(url, title, &reference.attributes)
    }

    fn render_template_link(
        &self,
        url: &str,
        title: &str,
        attributes: &BTreeMap<String, String>,
    ) -> Result<String, RenderError> {
        self.renderer.render(
            "link.html",
            &json!({
                "url": self.env.generate_url(url),
                "title": title,
                "attributes": attributes,
            }),
        )
    }
}

/// Render one span of the current document
pub fn render(
    span: &SpanResult,
    env: &mut Environment,
    resolver: &mut ReferenceResolver,
    renderer: &dyn Renderer,
) -> Result<String, RenderError> {
    SpanRenderer::new(env, resolver, renderer).render(span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{MetaEntry, MetaStore, TitleNode};
    use crate::references::InvalidLink;
    use crate::render::HtmlRenderer;
    use crate::span::SpanTokenizer;

    fn environment() -> Environment {
        let mut metas = MetaStore::new();
        let mut install = MetaEntry::new("guide/install", "guide/install.html", "Installation", 0);
        install.titles = vec![TitleNode::new("Installation")];
        metas.set(install);

        let mut index = MetaEntry::new("guide/index", "guide/index.html", "Guide", 0);
        index.titles = vec![TitleNode {
            title: "Guide".to_string(),
            children: vec![TitleNode::new("Next steps")],
        }];
        metas.set(index);

        let mut env = Environment::new(metas);
        env.start_document("guide/index");
        env
    }

    fn render_text(env: &mut Environment, text: &str) -> (String, Vec<InvalidLink>) {
        let mut resolver = ReferenceResolver::new();
        resolver.scope(env.current_file());
        let span = SpanTokenizer::new(&mut resolver).tokenize(env, text);

        let mut entry = env.get_meta_entry().cloned().unwrap();
        entry.depends = resolver.dependencies().to_vec();
        env.metas_mut().set(entry);

        let html = render(&span, env, &mut resolver, &HtmlRenderer).unwrap();
        (html, resolver.invalid_links().to_vec())
    }

    #[test]
    fn test_syntaxes() {
        let mut env = environment();
        env.set_variable("version", "3.0");
        let (html, _) = render_text(&mut env, "**Bold** and *em* a~b |version||unknown| <x> \nend");
        assert_eq!(
            html,
            "<strong>Bold</strong> and <em>em</em> a&nbsp;b 3.0 &lt;x&gt;<br>end"
        );
    }

    #[test]
    fn test_literal() {
        let mut env = environment();
        let (html, _) = render_text(&mut env, "Run ``a < b`` now");
        assert_eq!(html, "Run <code>a &lt; b</code> now");
    }

    #[test]
    fn test_doc_reference_is_relative() {
        let mut env = environment();
        let (html, invalid) = render_text(&mut env, "See :doc:`install`.");
        assert_eq!(
            html,
            "See <a href=\"install.html\" class=\"reference internal\">Installation</a>."
        );
        assert!(invalid.is_empty());
    }

    #[test]
    fn test_reference_text_and_anchor() {
        let mut env = environment();
        let (html, _) = render_text(&mut env, ":doc:`the setup <install#composer>`");
        assert_eq!(
            html,
            "<a href=\"install.html#composer\" class=\"reference internal\">the setup</a>"
        );
    }

    #[test]
    fn test_php_reference() {
        let mut env = environment();
        let (html, _) = render_text(&mut env, ":php:class:`Acme\\Mailer`");
        assert_eq!(html, "<a href=\"../classes/Acme-Mailer.html\">Acme\\Mailer</a>");
    }

    #[test]
    fn test_resolved_ref_rewrites_dependency() {
        let mut env = environment();
        render_text(&mut env, "Read `Installation` first.");
        assert_eq!(env.get_meta_entry().unwrap().depends, vec!["guide/install"]);
    }

    #[test]
    fn test_unresolved_reference_falls_back_to_text() {
        let mut env = environment();
        let (html, invalid) = render_text(&mut env, "See :doc:`missing <nowhere>`.");
        assert_eq!(html, "See missing.");
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].link, "nowhere");
        assert!(env.get_meta_entry().unwrap().depends.is_empty());
    }

    #[test]
    fn test_malformed_reference_renders_text() {
        let mut env = environment();
        let (html, _) = render_text(&mut env, "Call :php:method:`Mailer`.");
        assert_eq!(html, "Call Mailer.");
    }

    #[test]
    fn test_link_fallback_chain() {
        let mut env = environment();
        env.set_link("PHP", "https://php.net");

        let (html, invalid) = render_text(&mut env, "Use PHP_, read `Next steps`_ or unknown_.");
        assert_eq!(
            html,
            "Use <a href=\"https://php.net\">PHP</a>, read \
             <a href=\"index.html#next-steps\">Next steps</a> or unknown."
        );
        assert_eq!(
            invalid,
            vec![InvalidLink {
                document: "guide/index".to_string(),
                link: "unknown".to_string()
            }]
        );
    }

    #[test]
    fn test_placeholder_inside_link_is_replaced() {
        let mut env = environment();
        let (html, _) = render_text(&mut env, "An example of role:`mis-used`.");
        assert_eq!(
            html,
            "An example of <a href=\"role:mis-used\">role:mis-used</a>."
        );
    }

    #[test]
    fn test_standalone_links_and_anchor() {
        let mut env = environment();
        let (html, _) = render_text(&mut env, "Mail a@b.org or _`Setup` now");
        assert_eq!(
            html,
            "Mail <a href=\"mailto:a@b.org\">a@b.org</a> or <a id=\"setup\"></a>Setup now"
        );
    }
}

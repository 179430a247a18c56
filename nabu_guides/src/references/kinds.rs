//! Reference roles
//!
//! Each role turns the body of `:role:`body`` into a target. Document roles
//! consult the metadata store; the PHP roles build urls into the API
//! documentation without looking anything up.

use super::ReferenceError;
use crate::environment::Environment;
use crate::meta::{slugify, TitleNode};
use std::collections::BTreeMap;

/// Target a reference resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReference {
    /// Document the reference points into, when it is a document
    pub file: Option<String>,
    pub url: String,
    pub title: String,
    pub titles: Vec<TitleNode>,
    pub attributes: BTreeMap<String, String>,
}

impl ResolvedReference {
    pub fn new(file: Option<String>, url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            file,
            url: url.into(),
            title: title.into(),
            titles: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }
}

/// Dependency a reference adds to the document that contains it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dependency {
    /// A document path, canonicalized against the current document
    Document(String),
    /// A name only resolution can map to a document
    Unresolved(String),
}

pub trait Reference: Send + Sync {
    /// Registry name, `domain:role` for domain roles
    fn name(&self) -> &str;

    fn resolve(&self, env: &Environment, data: &str) -> Result<Option<ResolvedReference>, ReferenceError>;

    /// Dependency recorded when the reference is first seen
    fn dependency(&self, _data: &str) -> Option<Dependency> {
        None
    }
}

/// Look `data` up as a document path first, then as a target or heading
///
/// Both document roles resolve this way; they differ only in the dependency
/// they record.
pub fn resolve_file_then_anchor(env: &Environment, data: &str) -> Option<ResolvedReference> {
    resolve_file(env, data).or_else(|| resolve_anchor(env, data))
}

fn resolve_file(env: &Environment, data: &str) -> Option<ResolvedReference> {
    let file = env.canonical_url(data);
    env.metas().get(&file).map(|entry| {
        let mut resolved = ResolvedReference::new(Some(file.clone()), &entry.url, &entry.title)
            .with_attribute("class", "reference internal");
        resolved.titles = entry.titles.clone();
        resolved
    })
}

/// First document, in path order, defining `data` as a link target or heading
fn resolve_anchor(env: &Environment, data: &str) -> Option<ResolvedReference> {
    let target = data.trim().to_lowercase();
    let slug = slugify(data);

    env.metas().iter().find_map(|(file, entry)| {
        let title = if entry.links.contains_key(&target) {
            Some(data.trim())
        } else {
            entry.find_title(data)
        }?;

        Some(
            ResolvedReference::new(Some(file.clone()), format!("{}#{}", entry.url, slug), title)
                .with_attribute("class", "reference internal"),
        )
    })
}

/// `:doc:`, recording the path as a dependency right away
#[derive(Debug, Default)]
pub struct DocReference;

impl Reference for DocReference {
    fn name(&self) -> &str {
        "doc"
    }

    fn resolve(&self, env: &Environment, data: &str) -> Result<Option<ResolvedReference>, ReferenceError> {
        Ok(resolve_file_then_anchor(env, data))
    }

    fn dependency(&self, data: &str) -> Option<Dependency> {
        Some(Dependency::Document(data.to_string()))
    }
}

/// `:ref:`, whose dependency is only known once it resolves
#[derive(Debug, Default)]
pub struct AnchorReference;

impl Reference for AnchorReference {
    fn name(&self) -> &str {
        "ref"
    }

    fn resolve(&self, env: &Environment, data: &str) -> Result<Option<ResolvedReference>, ReferenceError> {
        Ok(resolve_file_then_anchor(env, data))
    }

    fn dependency(&self, data: &str) -> Option<Dependency> {
        Some(Dependency::Unresolved(data.to_string()))
    }
}

/// `:class:` and `:php:class:`
#[derive(Debug)]
pub struct ClassReference {
    name: &'static str,
}

impl ClassReference {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl Reference for ClassReference {
    fn name(&self) -> &str {
        self.name
    }

    fn resolve(&self, _env: &Environment, data: &str) -> Result<Option<ResolvedReference>, ReferenceError> {
        let fqcn = data.trim().trim_start_matches('\\');
        Ok(Some(ResolvedReference::new(
            None,
            class_url(fqcn),
            fqcn,
        )))
    }
}

/// `:method:` and `:php:method:`, written `Class::method()`
#[derive(Debug)]
pub struct MethodReference {
    name: &'static str,
}

impl MethodReference {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl Reference for MethodReference {
    fn name(&self) -> &str {
        self.name
    }

    fn resolve(&self, _env: &Environment, data: &str) -> Result<Option<ResolvedReference>, ReferenceError> {
        let parts: Vec<&str> = data.trim().split("::").collect();
        let [class, method] = parts.as_slice() else {
            return Err(ReferenceError::malformed(
                self.name,
                data,
                "expected exactly one '::' between class and method",
            ));
        };

        let class = class.trim_start_matches('\\');
        let method = method.trim_end_matches("()");
        if class.is_empty() || method.is_empty() {
            return Err(ReferenceError::malformed(
                self.name,
                data,
                "class and method names must not be empty",
            ));
        }

        Ok(Some(ResolvedReference::new(
            None,
            format!("{}#method_{}", class_url(class), method),
            data.trim(),
        )))
    }
}

/// `:namespace:` and `:php:namespace:`
#[derive(Debug)]
pub struct NamespaceReference {
    name: &'static str,
}

impl NamespaceReference {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl Reference for NamespaceReference {
    fn name(&self) -> &str {
        self.name
    }

    fn resolve(&self, _env: &Environment, data: &str) -> Result<Option<ResolvedReference>, ReferenceError> {
        let namespace = data.trim().trim_start_matches('\\');
        Ok(Some(ResolvedReference::new(
            None,
            namespace_url(namespace),
            namespace,
        )))
    }
}

/// `:php:function:`; global functions live in the `default` namespace page
#[derive(Debug, Default)]
pub struct FunctionReference;

impl Reference for FunctionReference {
    fn name(&self) -> &str {
        "php:function"
    }

    fn resolve(&self, _env: &Environment, data: &str) -> Result<Option<ResolvedReference>, ReferenceError> {
        let qualified = data.trim().trim_start_matches('\\');
        let (namespace, function) = match qualified.rfind('\\') {
            Some(split) => (&qualified[..split], &qualified[split + 1..]),
            None => ("default", qualified),
        };
        let function = function.trim_end_matches("()");

        Ok(Some(ResolvedReference::new(
            None,
            format!("{}#function_{}", namespace_url(namespace), function),
            qualified,
        )))
    }
}

fn class_url(fqcn: &str) -> String {
    format!("classes/{}.html", fqcn.replace('\\', "-"))
}

fn namespace_url(namespace: &str) -> String {
    format!("namespaces/{}.html", namespace.to_lowercase().replace('\\', "-"))
}

/// The roles every resolver starts with
pub fn default_references() -> Vec<Box<dyn Reference>> {
    vec![
        Box::new(DocReference),
        Box::new(AnchorReference),
        Box::new(ClassReference::new("class")),
        Box::new(ClassReference::new("php:class")),
        Box::new(MethodReference::new("method")),
        Box::new(MethodReference::new("php:method")),
        Box::new(NamespaceReference::new("namespace")),
        Box::new(NamespaceReference::new("php:namespace")),
        Box::new(FunctionReference),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{MetaEntry, MetaStore};
    use assert_matches::assert_matches;

    fn env() -> Environment {
        let mut metas = MetaStore::new();
        let mut entry = MetaEntry::new("guide/install", "guide/install.html", "Installation", 0);
        entry.titles = vec![TitleNode {
            title: "Installation".to_string(),
            children: vec![TitleNode::new("Using Composer")],
        }];
        entry.links.insert("requirements".to_string(), String::new());
        metas.set(entry);

        let mut env = Environment::new(metas);
        env.set_current_file("guide/index");
        env
    }

    #[test]
    fn test_doc_reference_is_relative_to_current_document() {
        let resolved = DocReference.resolve(&env(), "install").unwrap().unwrap();
        assert_eq!(resolved.file.as_deref(), Some("guide/install"));
        assert_eq!(resolved.url, "guide/install.html");
        assert_eq!(resolved.title, "Installation");
        assert_eq!(resolved.titles.len(), 1);

        assert!(DocReference.resolve(&env(), "missing").unwrap().is_none());
    }

    #[test]
    fn test_anchor_reference_finds_targets_and_headings() {
        let env = env();

        let heading = AnchorReference.resolve(&env, "using composer").unwrap().unwrap();
        assert_eq!(heading.url, "guide/install.html#using-composer");
        assert_eq!(heading.title, "Using Composer");
        assert_eq!(heading.file.as_deref(), Some("guide/install"));

        let target = AnchorReference.resolve(&env, "Requirements").unwrap().unwrap();
        assert_eq!(target.url, "guide/install.html#requirements");

        assert!(AnchorReference.resolve(&env, "nowhere").unwrap().is_none());
    }

    #[test]
    fn test_ref_role_finds_documents() {
        let resolved = AnchorReference.resolve(&env(), "install").unwrap().unwrap();
        assert_eq!(resolved.file.as_deref(), Some("guide/install"));
        assert_eq!(resolved.url, "guide/install.html");
        assert_eq!(resolved.title, "Installation");
    }

    #[test]
    fn test_doc_role_falls_back_to_targets() {
        let resolved = DocReference.resolve(&env(), "requirements").unwrap().unwrap();
        assert_eq!(resolved.file.as_deref(), Some("guide/install"));
        assert_eq!(resolved.url, "guide/install.html#requirements");
        assert_eq!(resolved.title, "requirements");
    }

    #[test]
    fn test_php_roles() {
        let env = env();

        let class = ClassReference::new("php:class")
            .resolve(&env, "\\phpDocumentor\\Descriptor\\ClassDescriptor")
            .unwrap()
            .unwrap();
        assert_eq!(class.url, "classes/phpDocumentor-Descriptor-ClassDescriptor.html");

        let method = MethodReference::new("php:method")
            .resolve(&env, "phpDocumentor\\Descriptor\\ClassDescriptor::getParent()")
            .unwrap()
            .unwrap();
        assert_eq!(
            method.url,
            "classes/phpDocumentor-Descriptor-ClassDescriptor.html#method_getParent"
        );

        let namespace = NamespaceReference::new("namespace")
            .resolve(&env, "phpDocumentor\\Descriptor")
            .unwrap()
            .unwrap();
        assert_eq!(namespace.url, "namespaces/phpdocumentor-descriptor.html");

        let function = FunctionReference.resolve(&env, "strlen()").unwrap().unwrap();
        assert_eq!(function.url, "namespaces/default.html#function_strlen");

        let namespaced = FunctionReference
            .resolve(&env, "My\\Util\\format")
            .unwrap()
            .unwrap();
        assert_eq!(namespaced.url, "namespaces/my-util.html#function_format");
    }

    #[test]
    fn test_malformed_method_reference() {
        let method = MethodReference::new("php:method");
        assert_matches!(
            method.resolve(&env(), "NoSeparator"),
            Err(ReferenceError::Malformed { .. })
        );
        assert_matches!(
            method.resolve(&env(), "A::b::c()"),
            Err(ReferenceError::Malformed { .. })
        );
        assert_matches!(
            method.resolve(&env(), "::run()"),
            Err(ReferenceError::Malformed { .. })
        );
    }

    #[test]
    fn test_dependencies() {
        assert_eq!(
            DocReference.dependency("install"),
            Some(Dependency::Document("install".to_string()))
        );
        assert_eq!(
            AnchorReference.dependency("setup"),
            Some(Dependency::Unresolved("setup".to_string()))
        );
        assert_eq!(ClassReference::new("class").dependency("Foo"), None);
    }
}

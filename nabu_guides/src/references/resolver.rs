use super::kinds::{default_references, Dependency, Reference, ResolvedReference};
use super::ReferenceError;
use crate::environment::Environment;
use crate::meta::MetaEntry;
use nabu_reflection::config::compile_time::guides::MAX_DEPENDENCIES_PER_DOCUMENT;
use nabu_reflection::logging::codes;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Prefix keeping unresolved names apart from document paths
pub const UNRESOLVED_PREFIX: &str = "UNRESOLVED__";

/// A reference or link that could not be resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidLink {
    pub document: String,
    pub link: String,
}

impl fmt::Display for InvalidLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.document, self.link)
    }
}

/// Resolves roles to targets and tracks the dependencies of one document
///
/// Call [`ReferenceResolver::scope`] before processing each document.
pub struct ReferenceResolver {
    references: BTreeMap<String, Box<dyn Reference>>,
    document: String,
    dependencies: Vec<String>,
    unresolved_dependencies: HashMap<String, String>,
    original_dependency_names: HashMap<String, String>,
    invalid_links: Vec<InvalidLink>,
}

impl Default for ReferenceResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ReferenceResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceResolver")
            .field("roles", &self.references.keys().collect::<Vec<_>>())
            .field("document", &self.document)
            .field("dependencies", &self.dependencies)
            .field("invalid_links", &self.invalid_links)
            .finish()
    }
}

impl ReferenceResolver {
    /// Resolver with the document, anchor and PHP roles registered
    pub fn new() -> Self {
        let mut resolver = Self::empty();
        for reference in default_references() {
            resolver.register(reference);
        }
        resolver
    }

    pub fn empty() -> Self {
        Self {
            references: BTreeMap::new(),
            document: String::new(),
            dependencies: Vec::new(),
            unresolved_dependencies: HashMap::new(),
            original_dependency_names: HashMap::new(),
            invalid_links: Vec::new(),
        }
    }

    /// Register a role, replacing any role of the same name
    pub fn register(&mut self, reference: Box<dyn Reference>) {
        self.references.insert(reference.name().to_string(), reference);
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.references.contains_key(role)
    }

    /// Start collecting for `document`, forgetting the previous one
    pub fn scope(&mut self, document: &str) {
        self.document = document.to_string();
        self.dependencies.clear();
        self.unresolved_dependencies.clear();
        self.original_dependency_names.clear();
        self.invalid_links.clear();
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    /// Resolve `data` with the role `role`
    ///
    /// An unknown role is logged and yields `Ok(None)`. A reference that
    /// does not resolve is recorded as invalid and its dependency dropped
    /// from `meta_entry`; a resolved one rewrites its unresolved
    /// dependency to the file it resolved to.
    pub fn resolve(
        &mut self,
        env: &Environment,
        role: &str,
        data: &str,
        meta_entry: Option<&mut MetaEntry>,
    ) -> Result<Option<ResolvedReference>, ReferenceError> {
        let Some(reference) = self.references.get(role) else {
            self.missing_role(env, role);
            return Ok(None);
        };

        let Some(resolved) = reference.resolve(env, data)? else {
            self.add_invalid_link(data);
            if let Some(entry) = meta_entry {
                let original = self
                    .original_dependency_names
                    .get(data)
                    .map(String::as_str)
                    .unwrap_or(data);
                entry.remove_dependency(original);
            }
            return Ok(None);
        };

        if let (Some(unresolved), Some(entry), Some(file)) = (
            self.unresolved_dependencies.get(data),
            meta_entry,
            resolved.file.as_deref(),
        ) {
            entry.resolve_dependency(unresolved, file)?;
        }

        Ok(Some(resolved))
    }

    /// Register the dependency a reference implies as soon as it is seen
    pub fn found(&mut self, env: &Environment, role: &str, data: &str) {
        let Some(reference) = self.references.get(role) else {
            self.missing_role(env, role);
            return;
        };

        let result = match reference.dependency(data) {
            Some(Dependency::Document(path)) => self.add_dependency(env, &path, false),
            Some(Dependency::Unresolved(name)) => self.add_dependency(env, &name, true),
            None => Ok(()),
        };

        if let Err(error) = result {
            nabu_reflection::log_error!(error.error_code(), &error.to_string(),
                "file" => env.current_file(),
                "role" => role
            );
        }
    }

    /// Record a dependency of the scoped document
    ///
    /// Names that need resolving are stored as `UNRESOLVED__<name>` until a
    /// reference to them resolves; others are canonicalized document paths.
    pub fn add_dependency(
        &mut self,
        env: &Environment,
        dependency: &str,
        requires_resolving: bool,
    ) -> Result<(), ReferenceError> {
        let name = if requires_resolving {
            let name = format!("{}{}", UNRESOLVED_PREFIX, dependency);
            self.unresolved_dependencies
                .insert(dependency.to_string(), name.clone());
            name
        } else {
            let canonical = env.canonical_url(dependency);
            if canonical.is_empty() {
                return Err(ReferenceError::NoCanonicalUrl {
                    dependency: dependency.to_string(),
                });
            }
            canonical
        };
        self.original_dependency_names
            .insert(dependency.to_string(), name.clone());

        if self.dependencies.contains(&name) {
            return Ok(());
        }
        if self.dependencies.len() >= MAX_DEPENDENCIES_PER_DOCUMENT {
            nabu_reflection::log_warning!("Dependency limit reached, ignoring dependency",
                "file" => &self.document,
                "dependency" => &name,
                "limit" => MAX_DEPENDENCIES_PER_DOCUMENT
            );
            return Ok(());
        }

        self.dependencies.push(name);
        Ok(())
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn add_invalid_link(&mut self, link: &str) {
        let invalid = InvalidLink {
            document: self.document.clone(),
            link: link.to_string(),
        };
        if !self.invalid_links.contains(&invalid) {
            self.invalid_links.push(invalid);
        }
    }

    pub fn invalid_links(&self) -> &[InvalidLink] {
        &self.invalid_links
    }

    fn missing_role(&self, env: &Environment, role: &str) {
        let location = match env.current_file() {
            "" => String::new(),
            file => format!(" in \"{}\"", file),
        };
        nabu_reflection::log_error!(
            codes::references::UNKNOWN_ROLE,
            &format!("Unknown reference section \"{}\"{}", role, location)
        );
    }
}

//! Immutable reflection results
//!
//! Containers own their children outright. A descriptor is only handed out
//! once the parser that builds it has finished without error.

use super::docblock::DocBlock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionKind {
    Function,
    Closure,
}

impl FunctionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionKind::Function => "function",
            FunctionKind::Closure => "closure",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncludeKind {
    Include,
    IncludeOnce,
    Require,
    RequireOnce,
}

impl IncludeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncludeKind::Include => "include",
            IncludeKind::IncludeOnce => "include_once",
            IncludeKind::Require => "require",
            IncludeKind::RequireOnce => "require_once",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentDescriptor {
    pub name: String,
    pub type_hint: Option<String>,
    pub default_value: Option<String>,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    pub name: String,
    pub kind: FunctionKind,
    pub arguments: Vec<ArgumentDescriptor>,
    pub doc_block: Option<DocBlock>,
    pub line: u32,
    pub namespace: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub function: FunctionDescriptor,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_final: bool,
}

impl MethodDescriptor {
    pub fn name(&self) -> &str {
        &self.function.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
    pub default_value: Option<String>,
    pub doc_block: Option<DocBlock>,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantDescriptor {
    pub name: String,
    pub value: String,
    pub doc_block: Option<DocBlock>,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDescriptor {
    pub name: String,
    pub is_abstract: bool,
    pub is_final: bool,
    pub doc_block: Option<DocBlock>,
    pub parent_class: Option<String>,
    pub interfaces: Vec<String>,
    pub constants: Vec<ConstantDescriptor>,
    pub properties: Vec<PropertyDescriptor>,
    pub methods: Vec<MethodDescriptor>,
    pub line: u32,
    pub namespace: String,
}

impl ClassDescriptor {
    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name() == name)
    }

    pub fn member_count(&self) -> usize {
        self.constants.len() + self.properties.len() + self.methods.len()
    }
}

/// Same shape as a class; `interfaces` holds the extended interfaces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDescriptor {
    pub name: String,
    pub doc_block: Option<DocBlock>,
    pub interfaces: Vec<String>,
    pub constants: Vec<ConstantDescriptor>,
    pub methods: Vec<MethodDescriptor>,
    pub line: u32,
    pub namespace: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludeDescriptor {
    pub kind: IncludeKind,
    pub target: String,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub kind: String,
    pub message: String,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub path: String,
    pub hash: String,
    pub doc_block: Option<DocBlock>,
    pub namespace_aliases: BTreeMap<String, String>,
    pub includes: Vec<IncludeDescriptor>,
    pub constants: Vec<ConstantDescriptor>,
    pub functions: Vec<FunctionDescriptor>,
    pub interfaces: Vec<InterfaceDescriptor>,
    pub classes: Vec<ClassDescriptor>,
    pub markers: Vec<Marker>,
}

impl FileDescriptor {
    pub fn class(&self, name: &str) -> Option<&ClassDescriptor> {
        self.classes.iter().find(|c| c.name == name)
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDescriptor> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn element_count(&self) -> usize {
        self.includes.len()
            + self.constants.len()
            + self.functions.len()
            + self.interfaces.len()
            + self.classes.len()
    }
}

//! Structure XML writer
//!
//! A small hand-rolled writer; element and attribute values are always
//! escaped, booleans are written as `"true"`/`"false"`.

use crate::reflection::{
    expand_type, ArgumentDescriptor, ClassDescriptor, ConstantDescriptor, DocBlock,
    FileDescriptor, FunctionDescriptor, IncludeDescriptor, InterfaceDescriptor, MethodDescriptor,
    PropertyDescriptor,
};
use std::collections::BTreeMap;

/// Escape the five XML special characters
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Element name for a marker term: lowercase ASCII alphanumerics only
pub fn marker_element_name(term: &str) -> String {
    let name: String = term
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    match name.chars().next() {
        None => "marker".to_string(),
        Some(first) if first.is_ascii_digit() => format!("marker-{}", name),
        Some(_) => name,
    }
}

struct XmlWriter {
    out: String,
    depth: usize,
}

impl XmlWriter {
    fn new() -> Self {
        Self {
            out: String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n"),
            depth: 0,
        }
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
    }

    fn start_tag(&mut self, name: &str, attributes: &[(&str, String)]) {
        self.indent();
        self.out.push('<');
        self.out.push_str(name);
        for (key, value) in attributes {
            self.out.push(' ');
            self.out.push_str(key);
            self.out.push_str("=\"");
            self.out.push_str(&escape(value));
            self.out.push('"');
        }
    }

    fn open(&mut self, name: &str, attributes: &[(&str, String)]) {
        self.start_tag(name, attributes);
        self.out.push_str(">\n");
        self.depth += 1;
    }

    fn close(&mut self, name: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.indent();
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push_str(">\n");
    }

    fn leaf(&mut self, name: &str, attributes: &[(&str, String)], text: &str) {
        self.start_tag(name, attributes);
        if text.is_empty() {
            self.out.push_str("/>\n");
        } else {
            self.out.push('>');
            self.out.push_str(&escape(text));
            self.out.push_str("</");
            self.out.push_str(name);
            self.out.push_str(">\n");
        }
    }

    fn finish(self) -> String {
        self.out
    }
}

fn flag(value: bool) -> String {
    value.to_string()
}

/// Writes a [`FileDescriptor`] as structure XML
#[derive(Debug, Clone)]
pub struct XmlExporter {
    expand_types: bool,
}

impl Default for XmlExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlExporter {
    pub fn new() -> Self {
        Self { expand_types: true }
    }

    pub fn with_type_expansion(mut self, expand: bool) -> Self {
        self.expand_types = expand;
        self
    }

    pub fn export(&self, file: &FileDescriptor) -> String {
        let mut writer = XmlWriter::new();
        let aliases = &file.namespace_aliases;

        writer.open(
            "file",
            &[("path", file.path.clone()), ("hash", file.hash.clone())],
        );

        if let Some(doc) = &file.doc_block {
            write_doc_block(&mut writer, doc);
        }

        if !file.markers.is_empty() {
            writer.open("markers", &[]);
            for marker in &file.markers {
                writer.leaf(
                    &marker_element_name(&marker.kind),
                    &[("line", marker.line.to_string())],
                    &marker.message,
                );
            }
            writer.close("markers");
        }

        for (alias, fqn) in aliases {
            writer.leaf("namespace-alias", &[("name", alias.clone())], fqn);
        }
        for include in &file.includes {
            write_include(&mut writer, include);
        }
        for constant in &file.constants {
            write_constant(&mut writer, constant);
        }
        for function in &file.functions {
            self.write_function(&mut writer, "function", function, aliases, &[]);
        }
        for interface in &file.interfaces {
            self.write_interface(&mut writer, interface, aliases);
        }
        for class in &file.classes {
            self.write_class(&mut writer, class, aliases);
        }

        writer.close("file");
        writer.finish()
    }

    fn type_name(&self, ty: &str, namespace: &str, aliases: &BTreeMap<String, String>) -> String {
        if self.expand_types {
            expand_type(ty, namespace, aliases)
        } else {
            ty.to_string()
        }
    }

    fn write_class(
        &self,
        writer: &mut XmlWriter,
        class: &ClassDescriptor,
        aliases: &BTreeMap<String, String>,
    ) {
        writer.open(
            "class",
            &[
                ("final", flag(class.is_final)),
                ("abstract", flag(class.is_abstract)),
                ("namespace", class.namespace.clone()),
                ("line", class.line.to_string()),
            ],
        );
        writer.leaf("name", &[], &class.name);
        if let Some(parent) = &class.parent_class {
            let parent = self.type_name(parent, &class.namespace, aliases);
            writer.leaf("extends", &[], &parent);
        }
        for interface in &class.interfaces {
            let interface = self.type_name(interface, &class.namespace, aliases);
            writer.leaf("implements", &[], &interface);
        }
        if let Some(doc) = &class.doc_block {
            write_doc_block(writer, doc);
        }
        for constant in &class.constants {
            write_constant(writer, constant);
        }
        for property in &class.properties {
            write_property(writer, property);
        }
        for method in &class.methods {
            self.write_method(writer, method, aliases);
        }
        writer.close("class");
    }

    fn write_interface(
        &self,
        writer: &mut XmlWriter,
        interface: &InterfaceDescriptor,
        aliases: &BTreeMap<String, String>,
    ) {
        writer.open(
            "interface",
            &[
                ("namespace", interface.namespace.clone()),
                ("line", interface.line.to_string()),
            ],
        );
        writer.leaf("name", &[], &interface.name);
        for parent in &interface.interfaces {
            let parent = self.type_name(parent, &interface.namespace, aliases);
            writer.leaf("extends", &[], &parent);
        }
        if let Some(doc) = &interface.doc_block {
            write_doc_block(writer, doc);
        }
        for constant in &interface.constants {
            write_constant(writer, constant);
        }
        for method in &interface.methods {
            self.write_method(writer, method, aliases);
        }
        writer.close("interface");
    }

    fn write_method(
        &self,
        writer: &mut XmlWriter,
        method: &MethodDescriptor,
        aliases: &BTreeMap<String, String>,
    ) {
        let attributes = [
            ("final", flag(method.is_final)),
            ("abstract", flag(method.is_abstract)),
            ("static", flag(method.is_static)),
            ("visibility", method.visibility.as_str().to_string()),
        ];
        self.write_function(writer, "method", &method.function, aliases, &attributes);
    }

    fn write_function(
        &self,
        writer: &mut XmlWriter,
        element: &str,
        function: &FunctionDescriptor,
        aliases: &BTreeMap<String, String>,
        extra: &[(&str, String)],
    ) {
        let mut attributes: Vec<(&str, String)> = extra.to_vec();
        attributes.push(("namespace", function.namespace.clone()));
        attributes.push(("line", function.line.to_string()));
        if element == "function" {
            attributes.push(("type", function.kind.as_str().to_string()));
        }

        writer.open(element, &attributes);
        writer.leaf("name", &[], &function.name);
        if let Some(doc) = &function.doc_block {
            write_doc_block(writer, doc);
        }
        for argument in &function.arguments {
            self.write_argument(writer, argument, &function.namespace, aliases);
        }
        writer.close(element);
    }

    fn write_argument(
        &self,
        writer: &mut XmlWriter,
        argument: &ArgumentDescriptor,
        namespace: &str,
        aliases: &BTreeMap<String, String>,
    ) {
        writer.open("argument", &[("line", argument.line.to_string())]);
        writer.leaf("name", &[], &argument.name);
        let type_hint = argument
            .type_hint
            .as_deref()
            .map(|t| self.type_name(t, namespace, aliases))
            .unwrap_or_default();
        writer.leaf("type", &[], &type_hint);
        writer.leaf("default", &[], argument.default_value.as_deref().unwrap_or(""));
        writer.close("argument");
    }
}

fn write_doc_block(writer: &mut XmlWriter, doc: &DocBlock) {
    writer.open("docblock", &[("line", doc.line.to_string())]);
    writer.leaf("description", &[], &doc.summary);
    writer.leaf("long-description", &[], &doc.description);
    for tag in &doc.tags {
        let mut attributes = vec![
            ("name", tag.name.clone()),
            ("description", tag.description()),
        ];
        let types = tag.types();
        if !types.is_empty() {
            attributes.push(("type", types.join("|")));
        }
        if let Some(variable) = &tag.variable {
            attributes.push(("variable", variable.clone()));
        }
        writer.leaf("tag", &attributes, "");
    }
    writer.close("docblock");
}

fn write_include(writer: &mut XmlWriter, include: &IncludeDescriptor) {
    writer.leaf(
        "include",
        &[
            ("type", include.kind.as_str().to_string()),
            ("line", include.line.to_string()),
        ],
        &include.target,
    );
}

fn write_constant(writer: &mut XmlWriter, constant: &ConstantDescriptor) {
    writer.open("constant", &[("line", constant.line.to_string())]);
    writer.leaf("name", &[], &constant.name);
    writer.leaf("value", &[], &constant.value);
    if let Some(doc) = &constant.doc_block {
        write_doc_block(writer, doc);
    }
    writer.close("constant");
}

fn write_property(writer: &mut XmlWriter, property: &PropertyDescriptor) {
    writer.open(
        "property",
        &[
            ("final", flag(property.is_final)),
            ("static", flag(property.is_static)),
            ("visibility", property.visibility.as_str().to_string()),
            ("line", property.line.to_string()),
        ],
    );
    writer.leaf("name", &[], &property.name);
    writer.leaf("default", &[], property.default_value.as_deref().unwrap_or(""));
    if let Some(doc) = &property.doc_block {
        write_doc_block(writer, doc);
    }
    writer.close("property");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize;
    use crate::reflection::reflect;

    fn export_source(source: &str) -> String {
        let tokens = tokenize(source).unwrap();
        let file = reflect("src/a&b.php", source, &tokens).unwrap();
        XmlExporter::new().export(&file)
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a < b && \"c\" > 'd'"), "a &lt; b &amp;&amp; &quot;c&quot; &gt; &apos;d&apos;");
    }

    #[test]
    fn test_attributes_and_text_are_escaped() {
        let xml = export_source("<?php\nconst GREETING = \"<hello & bye>\";\n");
        assert!(xml.contains("path=\"src/a&amp;b.php\""));
        assert!(xml.contains("<value>&quot;&lt;hello &amp; bye&gt;&quot;</value>"));
        assert!(!xml.contains("<hello"));
    }

    #[test]
    fn test_class_element() {
        let xml = export_source(
            "<?php\nnamespace App;\nuse Lib\\Base;\nfinal class A extends Base {\n  protected static $x = 1;\n  public function run(Job $job) {}\n}\n",
        );
        assert!(xml.contains("<class final=\"true\" abstract=\"false\" namespace=\"App\" line=\"4\">"));
        assert!(xml.contains("<extends>\\Lib\\Base</extends>"));
        assert!(xml.contains("<namespace-alias name=\"Base\">Lib\\Base</namespace-alias>"));
        assert!(xml.contains("<property final=\"false\" static=\"true\" visibility=\"protected\" line=\"5\">"));
        assert!(xml.contains("<type>\\App\\Job</type>"));
        assert!(xml.trim_end().ends_with("</file>"));
    }

    #[test]
    fn test_type_expansion_can_be_disabled() {
        let source = "<?php namespace App; function f(Job $job) {}";
        let tokens = tokenize(source).unwrap();
        let file = reflect("f.php", source, &tokens).unwrap();
        let xml = XmlExporter::new().with_type_expansion(false).export(&file);
        assert!(xml.contains("<type>Job</type>"));
    }

    #[test]
    fn test_markers_element() {
        let xml = export_source("<?php\n// TODO: finish <this>\n");
        assert!(xml.contains("<markers>"));
        assert!(xml.contains("<todo line=\"2\">finish &lt;this&gt;</todo>"));
        assert_eq!(marker_element_name("Fix-Me"), "fixme");
        assert_eq!(marker_element_name("1st"), "marker-1st");
    }
}

//! Structural export of reflected files

pub mod json;
pub mod xml;

use crate::logging::codes;
use crate::reflection::FileDescriptor;
use std::str::FromStr;

pub use json::{from_json, to_json};
pub use xml::XmlExporter;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown export format '{0}' (expected 'xml' or 'json')")]
    UnknownFormat(String),
}

impl ExportError {
    pub fn error_code(&self) -> crate::logging::Code {
        codes::reflection::EXPORT_FAILURE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xml,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xml => "xml",
            ExportFormat::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xml" => Ok(ExportFormat::Xml),
            "json" => Ok(ExportFormat::Json),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

/// Structure XML with type expansion
pub fn to_xml(file: &FileDescriptor) -> String {
    XmlExporter::new().export(file)
}

/// Render a descriptor in the requested format
pub fn export(
    file: &FileDescriptor,
    format: ExportFormat,
    expand_types: bool,
) -> Result<String, ExportError> {
    let output = match format {
        ExportFormat::Xml if expand_types => to_xml(file),
        ExportFormat::Xml => XmlExporter::new().with_type_expansion(false).export(file),
        ExportFormat::Json => to_json(file)?,
    };

    crate::log_success!(codes::success::EXPORT_COMPLETE, "Export complete",
        "file" => &file.path,
        "format" => format.extension(),
        "bytes" => output.len()
    );

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_format_parsing() {
        assert_eq!("XML".parse::<ExportFormat>().unwrap(), ExportFormat::Xml);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_matches!("yaml".parse::<ExportFormat>(), Err(ExportError::UnknownFormat(f)) if f == "yaml");
    }

    #[test]
    fn test_export_dispatch() {
        let source = "<?php function f() {}";
        let tokens = crate::lexical::tokenize(source).unwrap();
        let file = crate::reflection::reflect("f.php", source, &tokens).unwrap();

        assert!(export(&file, ExportFormat::Xml, true).unwrap().contains("<function"));
        assert!(export(&file, ExportFormat::Json, true).unwrap().contains("\"functions\""));
    }
}

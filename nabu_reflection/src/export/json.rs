use super::ExportError;
use crate::reflection::FileDescriptor;

/// Pretty-printed JSON of the whole descriptor tree
pub fn to_json(file: &FileDescriptor) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(file)?)
}

/// Read back a descriptor written by [`to_json`]
pub fn from_json(json: &str) -> Result<FileDescriptor, ExportError> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize;
    use crate::reflection::reflect;

    #[test]
    fn test_json_keeps_structure() {
        let source = "<?php\n/** Doc. */\nclass A { public function f($x = 1) {} }";
        let tokens = tokenize(source).unwrap();
        let file = reflect("a.php", source, &tokens).unwrap();

        let json = to_json(&file).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["classes"][0]["name"], "A");
        assert_eq!(value["classes"][0]["methods"][0]["visibility"], "public");
        assert_eq!(
            value["classes"][0]["methods"][0]["function"]["arguments"][0]["default_value"],
            "1"
        );

        assert_eq!(from_json(&json).unwrap(), file);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(from_json("{"), Err(ExportError::Json(_))));
    }
}

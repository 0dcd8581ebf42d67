//! JSON Schema validation of YAML documents
//!
//! Schemas are Draft 7 JSON files next to each document type. YAML sources
//! are converted to JSON values before validation.

use std::fs;
use std::path::{Path, PathBuf};

use jsonschema::{Draft, JSONSchema};
use serde::Serialize;
use thiserror::Error;

use crate::domain::{ElementStatus, Meta};

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Failed to read schema {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse schema {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid schema {path}: {message}")]
    Compile { path: PathBuf, message: String },

    #[error("Document cannot be represented as JSON: {0}")]
    Convert(#[source] serde_json::Error),
}

/// One schema violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Location in the document, e.g. `wbs_elements → 0 → id`
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.path, self.message)
    }
}

/// A compiled JSON Schema
pub struct SchemaValidator {
    schema: JSONSchema,
    path: PathBuf,
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SchemaValidator {
    /// Loads and compiles a schema file
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let content = fs::read_to_string(path).map_err(|source| SchemaError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let schema: serde_json::Value =
            serde_json::from_str(&content).map_err(|source| SchemaError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        Self::compile(&schema, path)
    }

    /// Compiles an in-memory schema; `path` is only used in messages
    pub fn compile(schema: &serde_json::Value, path: &Path) -> Result<Self, SchemaError> {
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(schema)
            .map_err(|err| SchemaError::Compile {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;

        Ok(Self {
            schema: compiled,
            path: path.to_path_buf(),
        })
    }

    /// Returns the schema path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validates a YAML document, returning violations sorted by path
    pub fn validate(&self, document: &serde_yaml::Value) -> Result<Vec<Violation>, SchemaError> {
        let instance = serde_json::to_value(document).map_err(SchemaError::Convert)?;
        Ok(self.validate_json(&instance))
    }

    /// Validates a JSON instance, returning violations sorted by path
    pub fn validate_json(&self, instance: &serde_json::Value) -> Vec<Violation> {
        let mut violations: Vec<Violation> = match self.schema.validate(instance) {
            Ok(()) => return vec![],
            Err(errors) => errors
                .map(|err| Violation {
                    path: display_path(&err.instance_path.to_string()),
                    message: err.to_string(),
                })
                .collect(),
        };

        violations.sort_by(|a, b| a.path.cmp(&b.path));
        violations
    }
}

/// Formats a JSON pointer as `a → b → c`, `(root)` for the document itself
fn display_path(pointer: &str) -> String {
    let segments: Vec<&str> = pointer.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        "(root)".to_string()
    } else {
        segments.join(" → ")
    }
}

/// Checks every document gets regardless of schema
pub fn common_warnings(meta: &Meta) -> Vec<String> {
    let mut warnings = Vec::new();

    if meta.status == Some(ElementStatus::Done) && meta.author.is_none() {
        warnings.push("Status is done but no author is defined".to_string());
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn validator() -> SchemaValidator {
        let schema = json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "required": ["meta"],
            "properties": {
                "meta": {
                    "type": "object",
                    "required": ["title"],
                    "properties": { "title": { "type": "string" } }
                },
                "wbs_elements": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["id"]
                    }
                }
            }
        });
        SchemaValidator::compile(&schema, Path::new("scheme.json")).unwrap()
    }

    fn yaml(source: &str) -> serde_yaml::Value {
        serde_yaml::from_str(source).unwrap()
    }

    #[test]
    fn valid_document_has_no_violations() {
        let violations = validator()
            .validate(&yaml("meta: {title: Plan}\nwbs_elements: [{id: T1}]\n"))
            .unwrap();
        assert!(violations.is_empty());
    }

    #[test]
    fn missing_root_field() {
        let violations = validator().validate(&yaml("other: 1\n")).unwrap();

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "(root)");
        assert!(violations[0].message.contains("meta"));
    }

    #[test]
    fn nested_violation_path() {
        let violations = validator()
            .validate(&yaml("meta: {title: Plan}\nwbs_elements: [{id: T1}, {title: x}]\n"))
            .unwrap();

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "wbs_elements → 1");
        assert!(violations[0].to_string().starts_with("[wbs_elements → 1]"));
    }

    #[test]
    fn load_schema_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scheme.json");
        fs::write(&path, r#"{"type": "object", "required": ["meta"]}"#).unwrap();

        let validator = SchemaValidator::load(&path).unwrap();
        assert_eq!(validator.path(), path.as_path());
        assert_eq!(validator.validate(&yaml("meta: {}\n")).unwrap(), vec![]);
    }

    #[test]
    fn malformed_schema_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scheme.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            SchemaValidator::load(&path),
            Err(SchemaError::Parse { .. })
        ));
    }

    #[test]
    fn invalid_schema_is_compile_error() {
        let schema = json!({ "type": 12 });
        assert!(matches!(
            SchemaValidator::compile(&schema, Path::new("bad.json")),
            Err(SchemaError::Compile { .. })
        ));
    }

    #[test]
    fn done_without_author_warns() {
        let meta = Meta {
            status: Some(ElementStatus::Done),
            ..Meta::default()
        };
        assert_eq!(common_warnings(&meta).len(), 1);

        let meta = Meta {
            status: Some(ElementStatus::Done),
            author: Some("sam".to_string()),
            ..Meta::default()
        };
        assert!(common_warnings(&meta).is_empty());

        assert!(common_warnings(&Meta::default()).is_empty());
    }
}

//! YAML document loading

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_yaml::Value;
use thiserror::Error;

use crate::domain::Meta;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Reads and deserializes a YAML document
pub fn load_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_yaml::from_str(&content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a YAML document as an untyped value
pub fn load_value(path: &Path) -> Result<Value, LoadError> {
    load_yaml(path)
}

/// The `meta` block of an untyped document; malformed blocks read as empty
pub fn meta_of(document: &Value) -> Meta {
    document
        .get("meta")
        .cloned()
        .and_then(|meta| serde_yaml::from_value(meta).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TaskDocument, WbsDocument};
    use tempfile::TempDir;

    #[test]
    fn load_typed_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("document.yaml");
        fs::write(
            &path,
            "meta: {title: Plan, doc_type: wbs}\nwbs_elements:\n  - {id: T1, wbs_code: \"1\", type: task}\n",
        )
        .unwrap();

        let document: WbsDocument = load_yaml(&path).unwrap();
        assert_eq!(document.meta.title.as_deref(), Some("Plan"));
        assert_eq!(document.wbs_elements.len(), 1);

        let value = load_value(&path).unwrap();
        assert_eq!(meta_of(&value).doc_type.as_deref(), Some("wbs"));
    }

    #[test]
    fn meta_of_tolerates_missing_or_malformed_meta() {
        let value: Value = serde_yaml::from_str("title: no meta").unwrap();
        assert_eq!(meta_of(&value), Meta::default());

        let value: Value = serde_yaml::from_str("meta: 42").unwrap();
        assert_eq!(meta_of(&value), Meta::default());
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = TempDir::new().unwrap();
        let result: Result<TaskDocument, _> = load_yaml(&dir.path().join("missing.yaml"));

        assert!(matches!(result, Err(LoadError::Read { .. })));
    }

    #[test]
    fn malformed_yaml_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.yaml");
        fs::write(&path, "meta: [unclosed\n").unwrap();

        let result = load_value(&path);
        assert!(matches!(result, Err(LoadError::Parse { .. })));
        assert!(result.unwrap_err().to_string().contains("broken.yaml"));
    }
}

//! Typed view of `package.json`
//!
//! Only the `python` section matters to nopy; `name` and `version` are kept for
//! messages and every other top-level key is carried along untouched.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::ManifestError;
use std::path::Path;

/// Interpreter used when the manifest names none
pub const DEFAULT_EXEC_PATH: &str = "python";

/// Module search path used when the manifest names none
pub const DEFAULT_PATH: &str = ".";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub python: PythonConfig,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The `python` section of the manifest.
///
/// `execPath` and `path` accept a single string or a list and are always held
/// as lists; `execPath` lists candidates tried in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PythonConfig {
    #[serde(deserialize_with = "one_or_many")]
    pub exec_path: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub path: Vec<String>,
    pub dependencies: IndexMap<String, String>,
    pub dev_dependencies: IndexMap<String, String>,
}

impl Default for PythonConfig {
    fn default() -> Self {
        Self {
            exec_path: vec![DEFAULT_EXEC_PATH.to_string()],
            path: vec![DEFAULT_PATH.to_string()],
            dependencies: IndexMap::new(),
            dev_dependencies: IndexMap::new(),
        }
    }
}

impl Manifest {
    /// Parse manifest text; `path` is only used for error messages.
    pub fn parse(text: &str, path: &Path) -> Result<Self, ManifestError> {
        serde_json::from_str(text).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Manifest {
        match Manifest::parse(text, Path::new("package.json")) {
            Ok(manifest) => manifest,
            Err(e) => panic!("manifest should parse: {e}"),
        }
    }

    #[test]
    fn test_missing_python_section_uses_defaults() {
        let manifest = parse(r#"{"name": "demo", "version": "1.0.0"}"#);
        assert_eq!(manifest.name.as_deref(), Some("demo"));
        assert_eq!(manifest.python.exec_path, vec!["python"]);
        assert_eq!(manifest.python.path, vec!["."]);
        assert!(manifest.python.dependencies.is_empty());
        assert!(manifest.python.dev_dependencies.is_empty());
    }

    #[test]
    fn test_user_values_win_over_defaults() {
        let manifest = parse(
            r#"{
                "python": {
                    "execPath": ["python3", "python"],
                    "path": "src",
                    "dependencies": {"requests": ">=2.0", "attrs": "==23.1.0"}
                }
            }"#,
        );
        assert_eq!(manifest.python.exec_path, vec!["python3", "python"]);
        assert_eq!(manifest.python.path, vec!["src"]);
        let names: Vec<&str> = manifest
            .python
            .dependencies
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(names, vec!["requests", "attrs"]);
        assert!(manifest.python.dev_dependencies.is_empty());
    }

    #[test]
    fn test_null_python_section() {
        let manifest = parse(r#"{"python": null}"#);
        assert_eq!(manifest.python, PythonConfig::default());
    }

    #[test]
    fn test_other_keys_preserved() {
        let manifest = parse(r#"{"name": "demo", "scripts": {"test": "nopy -m pytest"}}"#);
        assert!(manifest.extra.contains_key("scripts"));
    }

    #[test]
    fn test_invalid_json_reports_parse_error() {
        let result = Manifest::parse("{ not json", Path::new("/pkg/package.json"));
        assert!(matches!(result, Err(ManifestError::Parse { .. })));
    }
}

//! Input sources for family records.
//!
//! The [`GraphSource`] trait is the seam between the hand-authored record
//! format and the build. [`YamlFileSource`] reads the YAML layout used by the
//! family-tree project: a top-level mapping from node key to a flat mapping
//! of attribute name to scalar value.

use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::error::CoreError;
use crate::graph::{RawGraph, Record};

/// Supplies the raw keyed records for one build.
pub trait GraphSource {
    fn load(&self) -> Result<RawGraph, CoreError>;
}

/// Reads records from a YAML file.
#[derive(Debug, Clone)]
pub struct YamlFileSource {
    path: PathBuf,
}

impl YamlFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        YamlFileSource { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GraphSource for YamlFileSource {
    fn load(&self) -> Result<RawGraph, CoreError> {
        let origin = self.path.display().to_string();
        let text = std::fs::read_to_string(&self.path).map_err(|e| CoreError::Load {
            path: origin.clone(),
            reason: e.to_string(),
        })?;
        let graph = parse_yaml(&text, &origin)?;
        tracing::info!("loaded {} node records from {}", graph.len(), origin);
        Ok(graph)
    }
}

/// Parses YAML text into raw records. `origin` only labels errors.
///
/// Strings are kept verbatim, numbers and booleans use their textual form and
/// `null` means the attribute is absent. Anything nested is rejected.
pub fn parse_yaml(text: &str, origin: &str) -> Result<RawGraph, CoreError> {
    let load_error = |reason: String| CoreError::Load {
        path: origin.to_string(),
        reason,
    };

    let document: Value = serde_yaml::from_str(text).map_err(|e| load_error(e.to_string()))?;
    let entries = match document {
        Value::Mapping(entries) => entries,
        Value::Null => return Ok(RawGraph::new()),
        _ => return Err(load_error("top level is not a mapping".to_string())),
    };

    let mut graph = RawGraph::with_capacity(entries.len());
    for (key, body) in entries {
        let key = scalar_text(&key)
            .ok_or_else(|| load_error(format!("node key {:?} is not a scalar", key)))?;
        let mut record = Record::new();
        match body {
            Value::Mapping(attributes) => {
                for (name, value) in attributes {
                    let name = scalar_text(&name).ok_or_else(|| {
                        load_error(format!("node '{}' has a non-scalar attribute name", key))
                    })?;
                    if value.is_null() {
                        continue;
                    }
                    let value = scalar_text(&value).ok_or_else(|| {
                        load_error(format!(
                            "node '{}' attribute '{}' is not a scalar value",
                            key, name
                        ))
                    })?;
                    record.insert(name, value);
                }
            }
            Value::Null => {}
            _ => {
                return Err(load_error(format!("node '{}' is not a mapping", key)));
            }
        }
        if graph.insert(key.clone(), record).is_some() {
            return Err(load_error(format!("duplicate node key '{}'", key)));
        }
    }
    Ok(graph)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

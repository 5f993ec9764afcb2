//! Pedigree document and per-individual extraction.
//!
//! A pedigree as saved by the drawing tool looks like
//! `{"JSON_version": "1.0", "GG": [{"id": 0, "prop": {...}}, ...], ...}`.
//! Only nodes carrying a non-empty property bag describe individuals;
//! relationship and childhub nodes are skipped.

use std::path::Path;

use phenoped_common::{PedigreeConfig, PhenopedError, Result};
use serde_json::{Map, Value};

/// Top-level key carrying the schema version.
pub const VERSION_KEY: &str = "JSON_version";

/// Read access to a pedigree and its individuals.
pub trait Pedigree {
    /// The raw document.
    fn data(&self) -> &Value;

    /// One property bag per individual, in document order.
    fn extract_patient_properties(&self) -> Result<Vec<Map<String, Value>>>;

    /// The declared schema version, if any. A non-string tag is an error.
    fn version(&self) -> Result<Option<&str>> {
        match self.data().get(VERSION_KEY) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(v)) => Ok(Some(v.as_str())),
            Some(other) => Err(PhenopedError::MalformedPedigree(format!(
                "{VERSION_KEY} must be a string, found {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PedigreeDocument {
    data: Value,
    nodes_key: String,
    properties_key: String,
}

impl PedigreeDocument {
    /// Wrap a document using the default `GG` / `prop` layout.
    pub fn new(data: Value) -> Self {
        Self::with_config(data, &PedigreeConfig::default())
    }

    pub fn with_config(data: Value, config: &PedigreeConfig) -> Self {
        Self::with_keys(data, &config.nodes_key, &config.properties_key)
    }

    pub fn with_keys(data: Value, nodes_key: &str, properties_key: &str) -> Self {
        Self {
            data,
            nodes_key: nodes_key.to_string(),
            properties_key: properties_key.to_string(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn from_file(path: impl AsRef<Path>, config: &PedigreeConfig) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::with_config(serde_json::from_str(&content)?, config))
    }
}

impl Pedigree for PedigreeDocument {
    fn data(&self) -> &Value {
        &self.data
    }

    fn extract_patient_properties(&self) -> Result<Vec<Map<String, Value>>> {
        let nodes = self
            .data
            .get(&self.nodes_key)
            .and_then(Value::as_array)
            .ok_or_else(|| {
                PhenopedError::MalformedPedigree(format!(
                    "missing \"{}\" node array",
                    self.nodes_key
                ))
            })?;

        let mut extracted = Vec::new();
        for (idx, node) in nodes.iter().enumerate() {
            let Some(node) = node.as_object() else {
                tracing::debug!("Pedigree node {} is not an object, skipping", idx);
                continue;
            };
            match node.get(&self.properties_key).and_then(Value::as_object) {
                Some(props) if !props.is_empty() => extracted.push(props.clone()),
                _ => tracing::debug!("Pedigree node {} has no properties, skipping", idx),
            }
        }
        Ok(extracted)
    }
}

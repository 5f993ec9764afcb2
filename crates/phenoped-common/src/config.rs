//! Configuration loading for PhenoPed.
//! Reads phenoped.toml from the current directory or the path in the PHENOPED_CONFIG env var.
//! Every section is optional; a missing file yields the defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{PhenopedError, Result};

/// Env var that overrides the config file location.
pub const CONFIG_ENV_VAR: &str = "PHENOPED_CONFIG";

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "phenoped.toml";

/// Complete converter configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhenopedConfig {
    /// Layout of the incoming pedigree JSON
    #[serde(default)]
    pub pedigree: PedigreeConfig,

    /// Conversion behaviour
    #[serde(default)]
    pub processor: ProcessorConfig,

    /// Where the OMIM / HPO term tables come from
    #[serde(default)]
    pub vocabularies: VocabulariesConfig,
}

// ── Pedigree layout ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PedigreeConfig {
    /// Top-level key holding the array of pedigree nodes
    #[serde(default = "default_nodes_key")]
    pub nodes_key: String,

    /// Per-node key holding the individual's property bag
    #[serde(default = "default_properties_key")]
    pub properties_key: String,

    /// Schema version the converter was written against
    #[serde(default = "default_expected_version")]
    pub expected_version: String,
}

fn default_nodes_key() -> String { "GG".to_string() }
fn default_properties_key() -> String { "prop".to_string() }
fn default_expected_version() -> String { "1.0".to_string() }

impl Default for PedigreeConfig {
    fn default() -> Self {
        Self {
            nodes_key: default_nodes_key(),
            properties_key: default_properties_key(),
            expected_version: default_expected_version(),
        }
    }
}

// ── Processor ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Report phenotype ids that the HPO vocabulary does not know.
    /// Never changes the converted output.
    #[serde(default)]
    pub check_feature_terms: bool,
}

// ── Vocabularies ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VocabulariesConfig {
    #[serde(default)]
    pub omim: VocabularySource,
    #[serde(default)]
    pub hpo: VocabularySource,
}

/// A term table on disk or behind a URL. `path` wins when both are set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VocabularySource {
    pub path: Option<String>,
    pub url: Option<String>,
}

impl VocabularySource {
    pub fn is_configured(&self) -> bool {
        self.path.is_some() || self.url.is_some()
    }
}

// ── Loading ──────────────────────────────────────────────────────────────────

impl PhenopedConfig {
    /// Load configuration from phenoped.toml.
    /// Checks PHENOPED_CONFIG first, then the current directory; falls back to defaults.
    pub fn load() -> Result<Self> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) => Self::from_path(&path),
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_path(DEFAULT_CONFIG_FILE)
            }
            Err(_) => {
                tracing::debug!("No {} found, using default configuration", DEFAULT_CONFIG_FILE);
                Ok(Self::default())
            }
        }
    }

    /// Load from an explicit file, picking the format from its extension.
    pub fn from_path(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            return Err(PhenopedError::Config(format!("Config file not found: {path}")));
        }
        let content = std::fs::read_to_string(path)?;
        let config = match Path::new(path).extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&content)?,
            Some("json") => Self::from_json(&content)?,
            _ => Self::from_toml(&content)?,
        };
        tracing::info!("Configuration loaded from {}", path);
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = PhenopedConfig::default();
        assert_eq!(config.pedigree.nodes_key, "GG");
        assert_eq!(config.pedigree.properties_key, "prop");
        assert_eq!(config.pedigree.expected_version, "1.0");
        assert!(!config.processor.check_feature_terms);
        assert!(!config.vocabularies.omim.is_configured());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PhenopedConfig::from_toml(
            "[processor]\ncheck_feature_terms = true\n\n[vocabularies.omim]\npath = \"omim.tsv\"\n",
        )
        .unwrap();
        assert!(config.processor.check_feature_terms);
        assert_eq!(config.vocabularies.omim.path.as_deref(), Some("omim.tsv"));
        assert_eq!(config.pedigree.nodes_key, "GG");
        assert!(!config.vocabularies.hpo.is_configured());
    }

    #[test]
    fn test_yaml_and_json_loaders() {
        let yaml = PhenopedConfig::from_yaml("pedigree:\n  nodes_key: members\n").unwrap();
        assert_eq!(yaml.pedigree.nodes_key, "members");
        assert_eq!(yaml.pedigree.properties_key, "prop");

        let json =
            PhenopedConfig::from_json(r#"{"vocabularies":{"hpo":{"url":"http://x/hpo.tsv"}}}"#)
                .unwrap();
        assert_eq!(json.vocabularies.hpo.url.as_deref(), Some("http://x/hpo.tsv"));
    }

    #[test]
    fn test_from_path_picks_format_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "processor:\n  check_feature_terms: true").unwrap();
        let config = PhenopedConfig::from_path(file.path().to_str().unwrap()).unwrap();
        assert!(config.processor.check_feature_terms);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = PhenopedConfig::from_path("/definitely/not/here/phenoped.toml").unwrap_err();
        assert!(matches!(err, PhenopedError::Config(_)));
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        assert!(PhenopedConfig::from_toml("[pedigree\nnodes_key = 1").is_err());
    }
}

//! YAML configuration for the searchkit tools.
//!
//! One file configures the stages the command-line tools run. All sections are
//! optional and default to the per-crate defaults. Search credentials and the
//! summarizer belong to the HTTP server, which reads its own `ServerConfig`;
//! unknown sections here are rejected rather than ignored.
//!
//! ```yaml
//! version: "1.0"
//!
//! wordvec:
//!   text_path: ./models/Word2VecModel.vec
//!   binary_path: ./models/model.bin
//!
//! semantic:
//!   mode: onnx
//!   model_path: ./models/all-MiniLM-L6-v2/onnx/model.onnx
//!   tokenizer_path: ./models/all-MiniLM-L6-v2/tokenizer.json
//!
//! cluster:
//!   n_clusters: 3
//!   seed: 0
//! ```
//!
//! The tools read `searchkit.yaml` from the working directory, or the file named
//! by `SEARCHKIT_CONFIG`. Model paths can be overridden with
//! `SEARCHKIT_WORDVEC_TEXT_PATH`, `SEARCHKIT_WORDVEC_BINARY_PATH`,
//! `SEARCHKIT_SENTENCE_MODEL_PATH` and `SEARCHKIT_SENTENCE_TOKENIZER_PATH`.

use std::fs;
use std::path::{Path, PathBuf};

use cluster::ClusterConfig;
use semantic::SemanticConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use wordvec::WordVecConfig;

pub const DEFAULT_CONFIG_PATH: &str = "searchkit.yaml";
pub const CONFIG_PATH_ENV: &str = "SEARCHKIT_CONFIG";

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level configuration for the command-line tools.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct SearchkitConfig {
    /// Configuration format version
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub wordvec: WordVecConfig,

    #[serde(default)]
    pub semantic: SemanticConfig,

    #[serde(default)]
    pub cluster: ClusterConfig,
}

impl Default for SearchkitConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            wordvec: WordVecConfig::default(),
            semantic: SemanticConfig::default(),
            cluster: ClusterConfig::default(),
        }
    }
}

impl SearchkitConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: SearchkitConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads the config file if present (defaults otherwise), then applies
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigLoadError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// [`load`](Self::load) with an explicit environment lookup.
    pub fn load_with<F>(lookup: F) -> Result<Self, ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = lookup(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut config = if path.is_file() {
            tracing::debug!(path = %path.display(), "config_file_loaded");
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Applies the model path overrides. Empty values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
        };
        if let Some(p) = path("SEARCHKIT_WORDVEC_TEXT_PATH") {
            self.wordvec.text_path = p;
        }
        if let Some(p) = path("SEARCHKIT_WORDVEC_BINARY_PATH") {
            self.wordvec.binary_path = p;
        }
        if let Some(p) = path("SEARCHKIT_SENTENCE_MODEL_PATH") {
            self.semantic.model_path = p;
        }
        if let Some(p) = path("SEARCHKIT_SENTENCE_TOKENIZER_PATH") {
            self.semantic.tokenizer_path = Some(p);
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => {}
            v => return Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }

        if self.cluster.n_clusters == 0 {
            return Err(ConfigLoadError::Validation(
                "cluster.n_clusters must be greater than 0".into(),
            ));
        }
        if self.cluster.max_iterations == 0 {
            return Err(ConfigLoadError::Validation(
                "cluster.max_iterations must be greater than 0".into(),
            ));
        }
        if !matches!(self.semantic.mode.as_str(), "onnx" | "fast") {
            return Err(ConfigLoadError::Validation(format!(
                "semantic.mode must be \"onnx\" or \"fast\", got {:?}",
                self.semantic.mode
            )));
        }
        Ok(())
    }
}

fn default_version() -> String {
    "1.0".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_valid_yaml() {
        let yaml = r#"
version: "1.0"
cluster:
  n_clusters: 5
  seed: 42
semantic:
  mode: fast
"#;
        let config = SearchkitConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.cluster.n_clusters, 5);
        assert_eq!(config.cluster.seed, 42);
        assert_eq!(config.semantic.mode, "fast");
        assert_eq!(config.wordvec, WordVecConfig::default());
    }

    #[test]
    fn test_default_config() {
        let config = SearchkitConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cluster.n_clusters, 3);
    }

    #[test]
    fn zero_clusters_rejected() {
        let err = SearchkitConfig::from_yaml("cluster:\n  n_clusters: 0\n").unwrap_err();
        assert!(matches!(err, ConfigLoadError::Validation(_)));
    }

    #[test]
    fn server_sections_are_rejected_not_ignored() {
        for yaml in [
            "search:\n  api_key: secret\n",
            "summarize:\n  model: ./models/summarizer\n",
        ] {
            let err = SearchkitConfig::from_yaml(yaml).unwrap_err();
            assert!(matches!(err, ConfigLoadError::YamlParse(_)), "{yaml}");
        }
    }

    #[test]
    fn unknown_semantic_mode_rejected() {
        let err = SearchkitConfig::from_yaml("semantic:\n  mode: turbo\n").unwrap_err();
        assert!(matches!(err, ConfigLoadError::Validation(_)));
    }

    #[test]
    fn unknown_version_rejected() {
        let err = SearchkitConfig::from_yaml("version: \"7\"\n").unwrap_err();
        assert!(matches!(err, ConfigLoadError::UnsupportedVersion(_)));
    }

    #[test]
    fn env_overrides_model_paths() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("SEARCHKIT_CONFIG", "/definitely/not/here.yaml"),
            ("SEARCHKIT_WORDVEC_TEXT_PATH", "/data/vectors.vec"),
            ("SEARCHKIT_SENTENCE_TOKENIZER_PATH", "/data/tokenizer.json"),
        ]);
        let config = SearchkitConfig::load_with(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.wordvec.text_path, PathBuf::from("/data/vectors.vec"));
        assert_eq!(
            config.semantic.tokenizer_path,
            Some(PathBuf::from("/data/tokenizer.json"))
        );
        assert_eq!(config.wordvec.binary_path, WordVecConfig::default().binary_path);
    }

    #[test]
    fn config_file_named_by_env() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "cluster:\n  n_clusters: 4").unwrap();
        let path = file.path().to_string_lossy().into_owned();

        let config = SearchkitConfig::load_with(|k| {
            (k == CONFIG_PATH_ENV).then(|| path.clone())
        })
        .unwrap();
        assert_eq!(config.cluster.n_clusters, 4);
    }
}

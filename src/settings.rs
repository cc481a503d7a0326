//! User settings from `~/.simscope/config.toml`
//!
//! Every field has a default, so a missing file or a partial file is fine.
//! Command-line flags override whatever is loaded here.

use crate::comparison::{CompareConfig, KeywordConfig, DEFAULT_THRESHOLD};
use crate::embeddings::Metric;
use crate::history::DEFAULT_CAPACITY;
use crate::paths;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub model: String,
    pub metric: Metric,
    pub lowercase: bool,
    pub strip_punctuation: bool,
    /// Decision threshold for match labels
    pub threshold: f32,
    pub history_capacity: usize,
    pub keywords: KeywordConfig,
}

impl Default for Settings {
    fn default() -> Self {
        let compare = CompareConfig::default();
        Self {
            model: compare.model,
            metric: compare.metric,
            lowercase: compare.lowercase,
            strip_punctuation: compare.strip_punctuation,
            threshold: DEFAULT_THRESHOLD,
            history_capacity: DEFAULT_CAPACITY,
            keywords: compare.keywords,
        }
    }
}

impl Settings {
    /// Load from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Load from `path`, or defaults when it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// The per-comparison part of the settings
    pub fn compare_config(&self) -> CompareConfig {
        CompareConfig {
            model: self.model.clone(),
            metric: self.metric,
            lowercase: self.lowercase,
            strip_punctuation: self.strip_punctuation,
            keywords: self.keywords.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.threshold, 0.75);
        assert_eq!(settings.history_capacity, 50);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "metric = \"dot-product\"\nthreshold = 0.6\n\n[keywords]\ntop_k = 5\n",
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.metric, Metric::DotProduct);
        assert_eq!(settings.threshold, 0.6);
        assert_eq!(settings.keywords.top_k, 5);
        assert!(settings.keywords.enabled);
        assert_eq!(settings.model, "all-minilm-l6-v2");
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut settings = Settings::default();
        settings.model = "all-mpnet-base-v2".to_string();
        settings.keywords.enabled = false;
        settings.save_to(&path).unwrap();

        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_compare_config_projection() {
        let mut settings = Settings::default();
        settings.strip_punctuation = true;
        let config = settings.compare_config();
        assert!(config.strip_punctuation);
        assert_eq!(config.model, settings.model);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "threshold = \"high\"").unwrap();
        assert!(Settings::load_from(&path).is_err());
    }
}

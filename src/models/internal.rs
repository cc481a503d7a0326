//! Lock file format and parsing. Not exposed beyond `models`.

use crate::paths;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// A downloaded model with provenance information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockedModel {
    /// When this model was downloaded (RFC 3339)
    pub downloaded: String,

    /// Source URL for the ONNX model file
    pub source_model: String,

    /// Source URL for the tokenizer file
    pub source_tokenizer: String,

    pub sha256_model: String,
    pub sha256_tokenizer: String,

    /// Total size in bytes
    pub size_bytes: u64,

    /// Embedding dimensions (from registry)
    pub dimensions: usize,
}

/// The models.lock file, one TOML section per model.
///
/// ```toml
/// [all-minilm-l6-v2]
/// downloaded = "2026-10-18T09:30:00+00:00"
/// source_model = "https://huggingface.co/..."
/// source_tokenizer = "https://huggingface.co/..."
/// sha256_model = "abc123..."
/// sha256_tokenizer = "def456..."
/// size_bytes = 23000000
/// dimensions = 384
/// ```
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ModelLock {
    #[serde(flatten)]
    models: BTreeMap<String, LockedModel>,
}

impl ModelLock {
    /// Load the lock file, or return empty if it doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::models::lock_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read lock file: {:?}", path))?;

        toml::from_str(&content).with_context(|| "Failed to parse models.lock")
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&paths::models::lock_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let header = "# simscope model lock file\n\
                      # Auto-generated - do not edit manually\n\
                      # Re-download with: simscope model add <name>\n\n";

        let content = toml::to_string_pretty(&self)?;

        fs::write(path, format!("{}{}", header, content))
            .with_context(|| format!("Failed to write lock file: {:?}", path))?;

        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&LockedModel> {
        self.models.get(name)
    }

    /// Insert or update a locked model.
    pub fn insert(&mut self, name: &str, model: LockedModel) {
        self.models.insert(name.to_string(), model);
    }

    pub fn list(&self) -> Vec<&str> {
        self.models.keys().map(|s| s.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LockedModel {
        LockedModel {
            downloaded: "2026-10-18T09:30:00+00:00".to_string(),
            source_model: "https://huggingface.co/model_quantized.onnx".to_string(),
            source_tokenizer: "https://huggingface.co/tokenizer.json".to_string(),
            sha256_model: "abc123def456".to_string(),
            sha256_tokenizer: "789abc012def".to_string(),
            size_bytes: 23_000_000,
            dimensions: 384,
        }
    }

    #[test]
    fn test_model_lock_operations() {
        let mut lock = ModelLock::default();
        assert!(lock.is_empty());

        lock.insert("all-minilm-l6-v2", sample());
        assert!(lock.get("all-minilm-l6-v2").is_some());
        assert!(lock.get("all-mpnet-base-v2").is_none());
        assert_eq!(lock.list(), vec!["all-minilm-l6-v2"]);
    }

    #[test]
    fn test_model_lock_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("models.lock");

        assert!(ModelLock::load_from(&path).unwrap().is_empty());

        let mut lock = ModelLock::default();
        lock.insert("all-minilm-l6-v2", sample());
        lock.save_to(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# simscope model lock file"));
        assert!(content.contains("[all-minilm-l6-v2]"));

        let parsed = ModelLock::load_from(&path).unwrap();
        let model = parsed.get("all-minilm-l6-v2").unwrap();
        assert_eq!(model.dimensions, 384);
        assert_eq!(model.sha256_model, "abc123def456");
    }
}

//! Model registry for embedding models
//!
//! The registry is compiled into the binary and lists every model identifier
//! the comparison engine accepts.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;

const REGISTRY_TOML: &str = include_str!("../../resources/models/registry.toml");

/// How a model produces vectors
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Transformer exported to ONNX, mean pooled
    Onnx,
    /// Offline feature hashing
    Hashing,
}

/// Model definition from registry
#[derive(Debug, Deserialize, Clone)]
pub struct ModelDefinition {
    /// Short name (registry key), filled in after parsing
    #[serde(skip)]
    pub name: String,
    pub hf_id: String,
    pub description: String,
    pub backend: Backend,
    pub dimensions: usize,
    /// Tokenizer truncation length (ignored by the hashing backend)
    #[serde(default)]
    pub max_tokens: usize,
    #[serde(default)]
    pub download_quantized: Option<String>,
    #[serde(default)]
    pub download_tokenizer: Option<String>,
    #[serde(default)]
    pub size_int8: Option<String>,
}

/// Model registry (from resources/models/registry.toml)
#[derive(Debug, Deserialize)]
pub struct ModelRegistry {
    pub models: BTreeMap<String, ModelDefinition>,
    pub default: DefaultConfig,
}

/// Default configuration
#[derive(Debug, Deserialize)]
pub struct DefaultConfig {
    pub model: String,
}

impl ModelRegistry {
    /// Load the built-in model registry
    pub fn load() -> Result<Self> {
        Self::parse(REGISTRY_TOML)
    }

    /// Parse a registry document
    pub fn parse(content: &str) -> Result<Self> {
        let mut registry: ModelRegistry =
            toml::from_str(content).context("Failed to parse model registry TOML")?;

        for (name, def) in registry.models.iter_mut() {
            def.name = name.clone();
        }

        Ok(registry)
    }

    /// Get model definition by short name or HuggingFace id (case-insensitive)
    pub fn get_model(&self, id: &str) -> Result<&ModelDefinition> {
        let wanted = id.trim().to_lowercase();
        self.models
            .values()
            .find(|def| def.name == wanted || def.hf_id.to_lowercase() == wanted)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Model '{}' not found in registry (available: {})",
                    id,
                    self.list_models().join(", ")
                )
            })
    }

    /// Definition of the default model
    pub fn default_model(&self) -> Result<&ModelDefinition> {
        self.get_model(&self.default.model)
    }

    /// List available models
    pub fn list_models(&self) -> Vec<&str> {
        self.models.keys().map(|k| k.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_registry() {
        let registry = ModelRegistry::load().expect("Failed to load registry");
        assert!(registry.models.contains_key("all-minilm-l6-v2"));
        assert!(registry.models.contains_key("all-mpnet-base-v2"));
        assert!(registry.models.contains_key("hashing-bow-384"));
    }

    #[test]
    fn test_get_model_by_short_name_and_hf_id() {
        let registry = ModelRegistry::load().unwrap();
        let model = registry.get_model("all-minilm-l6-v2").unwrap();
        assert_eq!(model.dimensions, 384);
        assert_eq!(model.backend, Backend::Onnx);
        assert_eq!(model.name, "all-minilm-l6-v2");

        let same = registry
            .get_model("sentence-transformers/all-MiniLM-L6-v2")
            .unwrap();
        assert_eq!(same.name, model.name);
    }

    #[test]
    fn test_models_have_different_dimensions() {
        let registry = ModelRegistry::load().unwrap();
        let mini = registry.get_model("all-minilm-l6-v2").unwrap();
        let mpnet = registry.get_model("all-mpnet-base-v2").unwrap();
        assert_ne!(mini.dimensions, mpnet.dimensions);
    }

    #[test]
    fn test_unknown_model() {
        let registry = ModelRegistry::load().unwrap();
        let err = registry.get_model("not-a-model").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_default_model_resolves() {
        let registry = ModelRegistry::load().unwrap();
        assert_eq!(registry.default_model().unwrap().name, "all-minilm-l6-v2");
    }
}

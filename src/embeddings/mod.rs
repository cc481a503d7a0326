//! Embeddings module - Generate semantic embeddings for text
//!
//! Provides trait-based abstraction for embedding generation with an ONNX
//! backend and an offline hashing backend. Models are chosen by registry
//! identifier.

mod hashing;
pub mod models;
mod onnx;
mod similarity;

pub use hashing::HashingEmbedder;
pub use models::{Backend, ModelDefinition, ModelRegistry};
pub use onnx::OnnxEmbedder;
pub use similarity::{
    cosine_similarity, dot, euclidean_distance, euclidean_to_similarity, norm, normalize,
    similarity, similarity_by_name, Metric,
};

use anyhow::Result;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

/// Fixed-dimension embedding vector
pub type Vector = Vec<f32>;

/// Trait for embedding generation engines
///
/// Requires Send so a loaded engine can sit behind a shared handle.
pub trait EmbeddingEngine: Send {
    /// Generate embedding for a single text, optionally L2-normalized
    fn encode(&mut self, text: &str, normalize: bool) -> Result<Vector>;

    /// Generate embeddings for multiple texts
    fn encode_batch(&mut self, texts: &[String], normalize: bool) -> Result<Vec<Vector>> {
        texts.iter().map(|t| self.encode(t, normalize)).collect()
    }

    /// Get embedding dimension (e.g., 384 for all-MiniLM-L6-v2)
    fn dimension(&self) -> usize;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Cloneable handle to one loaded engine
///
/// Encoding and keyphrase extraction for a model share the same weights, so
/// the engine sits behind a mutex and each call locks it for its duration.
#[derive(Clone)]
pub struct SharedEmbedder {
    inner: Arc<Mutex<Box<dyn EmbeddingEngine>>>,
    dimension: usize,
    model_name: String,
}

impl SharedEmbedder {
    pub fn new(engine: Box<dyn EmbeddingEngine>) -> Self {
        let dimension = engine.dimension();
        let model_name = engine.model_name().to_string();
        Self {
            inner: Arc::new(Mutex::new(engine)),
            dimension,
            model_name,
        }
    }

    /// True when both handles point at the same loaded engine
    pub fn same_engine(&self, other: &SharedEmbedder) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl EmbeddingEngine for SharedEmbedder {
    fn encode(&mut self, text: &str, normalize: bool) -> Result<Vector> {
        self.inner.lock().encode(text, normalize)
    }

    fn encode_batch(&mut self, texts: &[String], normalize: bool) -> Result<Vec<Vector>> {
        self.inner.lock().encode_batch(texts, normalize)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Factory function to create an embedder for a registry identifier
///
/// Accepts a short name (`all-minilm-l6-v2`) or HuggingFace id
/// (`sentence-transformers/all-MiniLM-L6-v2`).
pub fn create_embedder(model_id: &str) -> Result<Box<dyn EmbeddingEngine>> {
    let registry = ModelRegistry::load()?;
    let model_def = registry.get_model(model_id)?;
    create_embedder_from_definition(model_def)
}

/// Create embedder from a model definition
pub fn create_embedder_from_definition(
    model_def: &ModelDefinition,
) -> Result<Box<dyn EmbeddingEngine>> {
    info!(model = %model_def.name, backend = ?model_def.backend, "loading embedding model");
    match model_def.backend {
        Backend::Hashing => Ok(Box::new(HashingEmbedder::new(
            &model_def.name,
            model_def.dimensions,
        ))),
        Backend::Onnx => create_onnx_embedder(model_def),
    }
}

/// Create ONNX embedder from model definition
fn create_onnx_embedder(model_def: &ModelDefinition) -> Result<Box<dyn EmbeddingEngine>> {
    let model_dir = crate::models::resolve_model_path(&model_def.name)?;

    let model_path = crate::models::onnx_file(&model_dir);
    let tokenizer_path = model_dir.join("tokenizer.json");

    Ok(Box::new(OnnxEmbedder::new_from_paths(
        &model_path,
        &tokenizer_path,
        &model_def.name,
        model_def.dimensions,
        model_def.max_tokens,
    )?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_hashing_embedder() {
        let mut embedder = create_embedder("hashing-bow-384").unwrap();
        assert_eq!(embedder.dimension(), 384);
        assert_eq!(embedder.model_name(), "hashing-bow-384");
        assert_eq!(embedder.encode("hello", true).unwrap().len(), 384);
    }

    #[test]
    fn test_create_unknown_model_fails() {
        assert!(create_embedder("bogus-model").is_err());
    }

    #[test]
    fn test_shared_embedder_clones_share_engine() {
        let shared = SharedEmbedder::new(Box::new(HashingEmbedder::new("hashing-bow-384", 64)));
        let mut clone = shared.clone();
        assert!(shared.same_engine(&clone));
        assert_eq!(clone.dimension(), 64);
        assert_eq!(clone.encode("a b", true).unwrap().len(), 64);
    }
}

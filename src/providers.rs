//! Memoised model handles
//!
//! Loading a model is slow, so each identifier is loaded at most once per
//! cache. The first `get_or_load` constructs and stores the handle, later calls
//! with the same model return the stored one. Identifiers are static for the
//! session, so nothing is ever invalidated.

use crate::comparison::{self, CompareConfig, ComparisonRecord};
use crate::embeddings::{
    create_embedder_from_definition, EmbeddingEngine, ModelDefinition, ModelRegistry,
    SharedEmbedder,
};
use crate::error::{EngineError, EngineResult};
use crate::keyphrase::KeyBert;
use anyhow::Result;
use std::collections::HashMap;
use tracing::debug;

/// An embedder plus a keyphrase extractor running on the same weights
#[derive(Clone)]
pub struct ModelHandle {
    pub embedder: SharedEmbedder,
    pub keyphrases: KeyBert<SharedEmbedder>,
}

impl ModelHandle {
    pub fn new(engine: Box<dyn EmbeddingEngine>) -> Self {
        let embedder = SharedEmbedder::new(engine);
        Self {
            keyphrases: KeyBert::new(embedder.clone()),
            embedder,
        }
    }

    pub fn model_name(&self) -> &str {
        self.embedder.model_name()
    }

    /// Run the comparison orchestrator on this model
    pub fn compare(
        &self,
        scraped_raw: &str,
        query_raw: &str,
        config: &CompareConfig,
    ) -> EngineResult<ComparisonRecord> {
        let mut embedder = self.embedder.clone();
        let mut extractor = self.keyphrases.clone();
        comparison::compare(scraped_raw, query_raw, config, &mut embedder, &mut extractor)
    }
}

type Loader = Box<dyn FnMut(&ModelDefinition) -> Result<Box<dyn EmbeddingEngine>>>;

pub struct ProviderCache {
    registry: ModelRegistry,
    handles: HashMap<String, ModelHandle>,
    loader: Loader,
}

impl ProviderCache {
    /// Cache over the built-in registry, loading engines from disk
    pub fn new() -> Result<Self> {
        Ok(Self::with_loader(
            ModelRegistry::load()?,
            create_embedder_from_definition,
        ))
    }

    /// Cache with a custom engine constructor
    pub fn with_loader<F>(registry: ModelRegistry, loader: F) -> Self
    where
        F: FnMut(&ModelDefinition) -> Result<Box<dyn EmbeddingEngine>> + 'static,
    {
        Self {
            registry,
            handles: HashMap::new(),
            loader: Box::new(loader),
        }
    }

    /// Handle for `model_id` (short name or HuggingFace id), loading on first use.
    pub fn get_or_load(&mut self, model_id: &str) -> EngineResult<ModelHandle> {
        let def = self
            .registry
            .get_model(model_id)
            .map_err(|e| EngineError::InvalidConfig(format!("{:#}", e)))?;

        if let Some(handle) = self.handles.get(&def.name) {
            debug!(model = %def.name, "reusing loaded model");
            return Ok(handle.clone());
        }

        let engine = (self.loader)(def).map_err(|e| EngineError::embedding(&def.name, e))?;
        let handle = ModelHandle::new(engine);
        self.handles.insert(def.name.clone(), handle.clone());
        Ok(handle)
    }

    pub fn is_loaded(&self, model_id: &str) -> bool {
        self.registry
            .get_model(model_id)
            .map(|def| self.handles.contains_key(&def.name))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::HashingEmbedder;
    use crate::error::ProviderKind;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting_cache(loads: Rc<Cell<usize>>) -> ProviderCache {
        ProviderCache::with_loader(
            ModelRegistry::load().unwrap(),
            move |def| {
                loads.set(loads.get() + 1);
                Ok(Box::new(HashingEmbedder::new(&def.name, def.dimensions)))
            },
        )
    }

    #[test]
    fn test_load_is_memoised_per_model() {
        let loads = Rc::new(Cell::new(0));
        let mut cache = counting_cache(loads.clone());

        let a = cache.get_or_load("all-minilm-l6-v2").unwrap();
        let b = cache
            .get_or_load("sentence-transformers/all-MiniLM-L6-v2")
            .unwrap();
        assert_eq!(loads.get(), 1);
        assert!(a.embedder.same_engine(&b.embedder));

        let c = cache.get_or_load("all-mpnet-base-v2").unwrap();
        assert_eq!(loads.get(), 2);
        assert_eq!(c.embedder.dimension(), 768);
        assert!(cache.is_loaded("all-mpnet-base-v2"));
    }

    #[test]
    fn test_unknown_model_is_config_error() {
        let mut cache = counting_cache(Rc::new(Cell::new(0)));
        assert!(matches!(
            cache.get_or_load("bogus"),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_load_failure_is_provider_failure_and_not_cached() {
        let attempts = Rc::new(Cell::new(0));
        let counter = attempts.clone();
        let mut cache = ProviderCache::with_loader(
            ModelRegistry::load().unwrap(),
            move |_| {
                counter.set(counter.get() + 1);
                anyhow::bail!("weights missing")
            },
        );

        for _ in 0..2 {
            match cache.get_or_load("all-minilm-l6-v2") {
                Err(EngineError::ProviderFailure {
                    provider, model_id, ..
                }) => {
                    assert_eq!(provider, ProviderKind::Embedding);
                    assert_eq!(model_id, "all-minilm-l6-v2");
                }
                _ => panic!("expected ProviderFailure"),
            }
        }
        assert_eq!(attempts.get(), 2);
        assert!(!cache.is_loaded("all-minilm-l6-v2"));
    }
}

//! Typed failures raised by the comparison engine
//!
//! Provider implementations speak `anyhow`; everything that crosses the engine
//! boundary is folded into [`EngineError`] so the presentation layer can decide
//! how to surface it.

use std::fmt;
use thiserror::Error;

/// Which external collaborator failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Embedding,
    Keyphrase,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Embedding => write!(f, "embedding provider"),
            ProviderKind::Keyphrase => write!(f, "keyphrase provider"),
        }
    }
}

/// Which side of a comparison an input belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSide {
    Scraped,
    Query,
    Both,
}

impl fmt::Display for InputSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSide::Scraped => write!(f, "scraped text"),
            InputSide::Query => write!(f, "query text"),
            InputSide::Both => write!(f, "scraped and query texts"),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    /// One or both raw texts were empty or whitespace-only.
    #[error("Missing input: {which} must not be empty")]
    MissingInput { which: InputSide },

    /// A metric identifier outside the supported set.
    #[error("Unknown metric '{0}' (expected one of: Cosine, Dot product, Euclidean→similarity)")]
    UnknownMetric(String),

    /// Too few vectors to fit a 2D projection.
    #[error("Insufficient data for projection: need at least {needed} vectors, got {found}")]
    InsufficientData { needed: usize, found: usize },

    /// The embedding or keyphrase provider raised.
    #[error("{provider} failed for model '{model_id}': {source:#}")]
    ProviderFailure {
        provider: ProviderKind,
        model_id: String,
        #[source]
        source: anyhow::Error,
    },

    /// Configuration outside the allowed ranges.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Vectors of different length were combined.
    #[error("Vector dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
}

impl EngineError {
    pub(crate) fn embedding(model_id: &str, source: anyhow::Error) -> Self {
        EngineError::ProviderFailure {
            provider: ProviderKind::Embedding,
            model_id: model_id.to_string(),
            source,
        }
    }

    pub(crate) fn keyphrase(model_id: &str, source: anyhow::Error) -> Self {
        EngineError::ProviderFailure {
            provider: ProviderKind::Keyphrase,
            model_id: model_id.to_string(),
            source,
        }
    }

    /// Expected empty states the UI recovers from without aborting
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::MissingInput { .. } | EngineError::InsufficientData { .. }
        )
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_failure_names_provider_and_model() {
        let err = EngineError::embedding("all-minilm-l6-v2", anyhow::anyhow!("out of memory"));
        let msg = err.to_string();
        assert!(msg.contains("embedding provider"));
        assert!(msg.contains("all-minilm-l6-v2"));
        assert!(msg.contains("out of memory"));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_recoverable_kinds() {
        assert!(EngineError::MissingInput {
            which: InputSide::Scraped
        }
        .is_recoverable());
        assert!(EngineError::InsufficientData {
            needed: 3,
            found: 2
        }
        .is_recoverable());
        assert!(!EngineError::UnknownMetric("Bogus".into()).is_recoverable());
    }
}

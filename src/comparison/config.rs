//! Per-comparison options

use crate::embeddings::Metric;
use crate::error::{EngineError, EngineResult};
use crate::keyphrase::validate_ngram_range;
use serde::{Deserialize, Serialize};

/// Allowed keyphrase counts
pub const TOP_K_RANGE: std::ops::RangeInclusive<usize> = 3..=20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    pub enabled: bool,
    pub top_k: usize,
    pub ngram_min: usize,
    pub ngram_max: usize,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            top_k: 8,
            ngram_min: 1,
            ngram_max: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// Registry short name or HuggingFace id
    pub model: String,
    pub metric: Metric,
    pub lowercase: bool,
    pub strip_punctuation: bool,
    pub keywords: KeywordConfig,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            model: "all-minilm-l6-v2".to_string(),
            metric: Metric::Cosine,
            lowercase: true,
            strip_punctuation: false,
            keywords: KeywordConfig::default(),
        }
    }
}

impl CompareConfig {
    /// Check ranges. Keyword bounds are only enforced when extraction is on.
    pub fn validate(&self) -> EngineResult<()> {
        if self.model.trim().is_empty() {
            return Err(EngineError::InvalidConfig(
                "model identifier must not be empty".to_string(),
            ));
        }

        if self.keywords.enabled {
            if !TOP_K_RANGE.contains(&self.keywords.top_k) {
                return Err(EngineError::InvalidConfig(format!(
                    "top_k {} must be within {}..={}",
                    self.keywords.top_k,
                    TOP_K_RANGE.start(),
                    TOP_K_RANGE.end()
                )));
            }
            validate_ngram_range(self.keywords.ngram_min, self.keywords.ngram_max)?;
        }

        Ok(())
    }
}

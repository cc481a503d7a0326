//! The immutable result of one comparison

use super::classify::{classify, Classification};
use crate::embeddings::{Metric, Vector};
use crate::keyphrase::KeyPhrase;
use chrono::{DateTime, Local};
use serde::Serialize;

/// Keyword-only comparison, present as a whole or not at all
#[derive(Debug, Clone, Serialize)]
pub struct KeywordComparison {
    pub similarity: f32,
    pub scraped_vector: Vector,
    pub query_vector: Vector,
    /// Text that was embedded for each side
    pub scraped_surrogate: String,
    pub query_surrogate: String,
    /// No phrases were found and the preprocessed text stood in
    pub scraped_fallback: bool,
    pub query_fallback: bool,
}

impl KeywordComparison {
    /// Either side fell back to its full text
    pub fn used_fallback(&self) -> bool {
        self.scraped_fallback || self.query_fallback
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonRecord {
    pub timestamp: DateTime<Local>,
    /// Registry name of the model that produced the vectors
    pub model: String,
    pub metric: Metric,

    pub scraped_raw: String,
    pub query_raw: String,
    pub scraped: String,
    pub query: String,

    pub full_similarity: f32,
    pub scraped_vector: Vector,
    pub query_vector: Vector,

    /// `None` when keyword extraction was disabled
    pub keywords: Option<KeywordComparison>,
    /// Empty when disabled or when nothing was extracted
    pub scraped_phrases: Vec<KeyPhrase>,
    pub query_phrases: Vec<KeyPhrase>,
}

impl ComparisonRecord {
    pub fn keyword_similarity(&self) -> Option<f32> {
        self.keywords.as_ref().map(|k| k.similarity)
    }

    /// Keyword-only minus full-sentence similarity
    pub fn keyword_delta(&self) -> Option<f32> {
        self.keyword_similarity().map(|k| k - self.full_similarity)
    }

    pub fn full_classification(&self, threshold: f32) -> Classification {
        Classification::from_score(self.full_similarity, threshold)
    }

    pub fn keyword_classification(&self, threshold: f32) -> Option<Classification> {
        classify(self.keyword_similarity(), threshold)
    }

    /// Wall-clock time as shown in history listings
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }

    pub fn dimension(&self) -> usize {
        self.scraped_vector.len()
    }
}

//! Keyphrase salience - reduce a text to its most representative phrases
//!
//! Ranking is delegated to a [`KeyphraseExtractor`]; this module fixes the
//! request parameters, enforces the output guarantees (bounded, non-empty
//! phrases, descending score) and builds the keyword-only surrogate text.

mod candidates;
mod keybert;
mod stop_words;

pub use candidates::{candidate_phrases, tokenize};
pub use keybert::KeyBert;
pub use stop_words::is_stop_word;

use crate::error::{EngineError, EngineResult};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Diversity coefficient for MMR reranking (not user-configurable)
pub const DIVERSITY: f32 = 0.5;

/// Joins phrases into the keyword-only surrogate text
pub const SURROGATE_DELIMITER: &str = " ; ";

/// Allowed n-gram lengths
pub const NGRAM_LIMITS: (usize, usize) = (1, 3);

/// A ranked phrase; `score` is provider-defined relevance, not bounded to [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyPhrase {
    pub phrase: String,
    pub score: f32,
}

/// Keyphrase provider contract
pub trait KeyphraseExtractor {
    /// Ranked `(phrase, score)` list, at most `top_n` long
    fn extract(
        &mut self,
        text: &str,
        ngram_range: (usize, usize),
        top_n: usize,
        diversity: f32,
    ) -> Result<Vec<KeyPhrase>>;

    /// Model backing the extractor, for error context
    fn model_name(&self) -> &str;
}

/// Extract up to `top_k` keyphrases from `text`.
///
/// Fewer are returned when the text has too few distinct candidates, and an
/// empty list is a valid result.
pub fn extract_keyphrases(
    extractor: &mut dyn KeyphraseExtractor,
    text: &str,
    top_k: usize,
    ngram_min: usize,
    ngram_max: usize,
) -> EngineResult<Vec<KeyPhrase>> {
    validate_ngram_range(ngram_min, ngram_max)?;

    let mut phrases = extractor
        .extract(text, (ngram_min, ngram_max), top_k, DIVERSITY)
        .map_err(|e| EngineError::keyphrase(extractor.model_name(), e))?;

    phrases.retain(|p| !p.phrase.trim().is_empty());
    phrases.sort_by(|a, b| b.score.total_cmp(&a.score));
    phrases.truncate(top_k);

    debug!(count = phrases.len(), top_k, "extracted keyphrases");
    Ok(phrases)
}

pub(crate) fn validate_ngram_range(ngram_min: usize, ngram_max: usize) -> EngineResult<()> {
    let (lo, hi) = NGRAM_LIMITS;
    if ngram_min < lo || ngram_max > hi || ngram_min > ngram_max {
        return Err(EngineError::InvalidConfig(format!(
            "n-gram range ({}, {}) must satisfy {} <= min <= max <= {}",
            ngram_min, ngram_max, lo, hi
        )));
    }
    Ok(())
}

/// Text that is re-embedded for keyword-only similarity
#[derive(Debug, Clone, PartialEq)]
pub struct Surrogate {
    pub text: String,
    /// No phrases were extracted, so `text` is the preprocessed input itself
    pub used_fallback: bool,
}

/// Join phrases with `" ; "`, or fall back to `fallback` when there are none.
///
/// The fallback makes keyword similarity degenerate to full-sentence
/// similarity for that side; `used_fallback` records when it happened.
pub fn build_surrogate(phrases: &[KeyPhrase], fallback: &str) -> Surrogate {
    if phrases.is_empty() {
        return Surrogate {
            text: fallback.to_string(),
            used_fallback: true,
        };
    }

    let text = phrases
        .iter()
        .map(|p| p.phrase.as_str())
        .collect::<Vec<_>>()
        .join(SURROGATE_DELIMITER);

    Surrogate {
        text,
        used_fallback: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Returns a canned list regardless of input
    struct Canned(Vec<KeyPhrase>);

    impl KeyphraseExtractor for Canned {
        fn extract(&mut self, _: &str, _: (usize, usize), _: usize, _: f32) -> Result<Vec<KeyPhrase>> {
            Ok(self.0.clone())
        }

        fn model_name(&self) -> &str {
            "canned"
        }
    }

    struct Failing;

    impl KeyphraseExtractor for Failing {
        fn extract(&mut self, _: &str, _: (usize, usize), _: usize, _: f32) -> Result<Vec<KeyPhrase>> {
            anyhow::bail!("model exploded")
        }

        fn model_name(&self) -> &str {
            "failing-model"
        }
    }

    fn kp(phrase: &str, score: f32) -> KeyPhrase {
        KeyPhrase {
            phrase: phrase.to_string(),
            score,
        }
    }

    #[test]
    fn test_output_is_sorted_bounded_and_non_empty() {
        let mut ex = Canned(vec![
            kp("low", 0.1),
            kp("", 0.9),
            kp("high", 0.8),
            kp("mid", 0.5),
            kp("  ", 0.7),
        ]);
        let phrases = extract_keyphrases(&mut ex, "text", 2, 1, 2).unwrap();
        assert_eq!(phrases, vec![kp("high", 0.8), kp("mid", 0.5)]);
    }

    #[test]
    fn test_ties_keep_provider_order() {
        let mut ex = Canned(vec![kp("first", 0.5), kp("second", 0.5), kp("third", 0.5)]);
        let phrases = extract_keyphrases(&mut ex, "text", 3, 1, 1).unwrap();
        let names: Vec<&str> = phrases.iter().map(|p| p.phrase.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_invalid_ngram_range() {
        let mut ex = Canned(vec![]);
        for (lo, hi) in [(0, 1), (2, 1), (1, 4)] {
            let err = extract_keyphrases(&mut ex, "text", 3, lo, hi).unwrap_err();
            assert!(matches!(err, EngineError::InvalidConfig(_)));
        }
    }

    #[test]
    fn test_provider_failure_is_typed() {
        let err = extract_keyphrases(&mut Failing, "text", 3, 1, 1).unwrap_err();
        match err {
            EngineError::ProviderFailure {
                provider, model_id, ..
            } => {
                assert_eq!(provider, crate::error::ProviderKind::Keyphrase);
                assert_eq!(model_id, "failing-model");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_surrogate_joins_phrases() {
        let s = build_surrogate(&[kp("cat", 0.6), kp("mat", 0.4)], "the cat sat on the mat");
        assert_eq!(s.text, "cat ; mat");
        assert!(!s.used_fallback);
    }

    #[test]
    fn test_surrogate_falls_back_to_input() {
        let s = build_surrogate(&[], "the");
        assert_eq!(s.text, "the");
        assert!(s.used_fallback);
    }
}

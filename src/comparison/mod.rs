//! Comparison orchestrator
//!
//! Turns two raw texts and a [`CompareConfig`] into a [`ComparisonRecord`]:
//! preprocess, embed, score, then optionally repeat on keyword-only surrogates.
//! Nothing here touches history; the caller decides what to keep.

mod classify;
mod config;
mod record;

pub use classify::{classify, Classification, BORDERLINE_BAND, DEFAULT_THRESHOLD};
pub use config::{CompareConfig, KeywordConfig, TOP_K_RANGE};
pub use record::{ComparisonRecord, KeywordComparison};

use crate::embeddings::{similarity, EmbeddingEngine, Metric, Vector};
use crate::error::{EngineError, EngineResult, InputSide};
use crate::keyphrase::{build_surrogate, extract_keyphrases, KeyphraseExtractor};
use crate::preprocess::preprocess;
use tracing::{debug, info};

/// Compare two raw texts.
///
/// Both vectors of each pair come from `embedder` with unit normalisation, so
/// scores are computed with `already_unit = true`. With keyword extraction
/// enabled, each side's keyphrases are joined into a surrogate text that is
/// embedded and scored the same way.
pub fn compare(
    scraped_raw: &str,
    query_raw: &str,
    config: &CompareConfig,
    embedder: &mut dyn EmbeddingEngine,
    extractor: &mut dyn KeyphraseExtractor,
) -> EngineResult<ComparisonRecord> {
    check_inputs(scraped_raw, query_raw)?;
    config.validate()?;

    let scraped = preprocess(scraped_raw, config.lowercase, config.strip_punctuation);
    let query = preprocess(query_raw, config.lowercase, config.strip_punctuation);

    let scraped_vector = encode(embedder, &scraped)?;
    let query_vector = encode(embedder, &query)?;
    let full_similarity = score(&scraped_vector, &query_vector, config.metric)?;

    let mut scraped_phrases = Vec::new();
    let mut query_phrases = Vec::new();
    let mut keywords = None;

    if config.keywords.enabled {
        let kw = &config.keywords;
        scraped_phrases =
            extract_keyphrases(extractor, &scraped, kw.top_k, kw.ngram_min, kw.ngram_max)?;
        query_phrases =
            extract_keyphrases(extractor, &query, kw.top_k, kw.ngram_min, kw.ngram_max)?;

        let scraped_surrogate = build_surrogate(&scraped_phrases, &scraped);
        let query_surrogate = build_surrogate(&query_phrases, &query);
        if scraped_surrogate.used_fallback || query_surrogate.used_fallback {
            debug!(
                scraped = scraped_surrogate.used_fallback,
                query = query_surrogate.used_fallback,
                "no keyphrases found, keyword similarity uses full text"
            );
        }

        let scraped_kw_vector = encode(embedder, &scraped_surrogate.text)?;
        let query_kw_vector = encode(embedder, &query_surrogate.text)?;
        let kw_similarity = score(&scraped_kw_vector, &query_kw_vector, config.metric)?;

        keywords = Some(KeywordComparison {
            similarity: kw_similarity,
            scraped_vector: scraped_kw_vector,
            query_vector: query_kw_vector,
            scraped_surrogate: scraped_surrogate.text,
            query_surrogate: query_surrogate.text,
            scraped_fallback: scraped_surrogate.used_fallback,
            query_fallback: query_surrogate.used_fallback,
        });
    }

    info!(
        model = embedder.model_name(),
        metric = %config.metric,
        full = full_similarity,
        keyword = ?keywords.as_ref().map(|k| k.similarity),
        "comparison complete"
    );

    Ok(ComparisonRecord {
        timestamp: chrono::Local::now(),
        model: embedder.model_name().to_string(),
        metric: config.metric,
        scraped_raw: scraped_raw.to_string(),
        query_raw: query_raw.to_string(),
        scraped,
        query,
        full_similarity,
        scraped_vector,
        query_vector,
        keywords,
        scraped_phrases,
        query_phrases,
    })
}

/// Reject empty or whitespace-only input, naming the offending side
pub fn check_inputs(scraped_raw: &str, query_raw: &str) -> EngineResult<()> {
    let which = match (scraped_raw.trim().is_empty(), query_raw.trim().is_empty()) {
        (false, false) => return Ok(()),
        (true, true) => InputSide::Both,
        (true, false) => InputSide::Scraped,
        (false, true) => InputSide::Query,
    };
    Err(EngineError::MissingInput { which })
}

fn encode(embedder: &mut dyn EmbeddingEngine, text: &str) -> EngineResult<Vector> {
    embedder
        .encode(text, true)
        .map_err(|e| EngineError::embedding(embedder.model_name(), e))
}

fn score(a: &[f32], b: &[f32], metric: Metric) -> EngineResult<f32> {
    if a.len() != b.len() {
        return Err(EngineError::DimensionMismatch {
            expected: a.len(),
            found: b.len(),
        });
    }
    Ok(similarity(a, b, metric, true))
}

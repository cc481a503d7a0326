//! Embedding-ranked keyphrase extraction with Maximal Marginal Relevance
//!
//! Each candidate phrase is embedded with the same model as the document and
//! scored by cosine similarity to it. Selection then trades relevance against
//! redundancy: `mmr = (1 - diversity) * relevance - diversity * max_sim_to_selected`.

use super::candidates::candidate_phrases;
use super::{KeyPhrase, KeyphraseExtractor};
use crate::embeddings::{dot, EmbeddingEngine, Vector};
use anyhow::{Context, Result};
use tracing::debug;

#[derive(Clone)]
pub struct KeyBert<E: EmbeddingEngine> {
    embedder: E,
}

impl<E: EmbeddingEngine> KeyBert<E> {
    pub fn new(embedder: E) -> Self {
        Self { embedder }
    }
}

impl<E: EmbeddingEngine> KeyphraseExtractor for KeyBert<E> {
    fn extract(
        &mut self,
        text: &str,
        ngram_range: (usize, usize),
        top_n: usize,
        diversity: f32,
    ) -> Result<Vec<KeyPhrase>> {
        let candidates = candidate_phrases(text, ngram_range.0, ngram_range.1);
        if candidates.is_empty() || top_n == 0 {
            debug!(text_len = text.len(), "no keyphrase candidates");
            return Ok(Vec::new());
        }

        let doc = self
            .embedder
            .encode(text, true)
            .context("Failed to embed document for keyphrase ranking")?;
        let candidate_vectors = self
            .embedder
            .encode_batch(&candidates, true)
            .context("Failed to embed keyphrase candidates")?;

        let selected = mmr(&doc, &candidate_vectors, top_n, diversity);

        let mut phrases: Vec<KeyPhrase> = selected
            .into_iter()
            .map(|(idx, relevance)| KeyPhrase {
                phrase: candidates[idx].clone(),
                score: round4(relevance),
            })
            .collect();

        // Stable: equal scores keep selection order
        phrases.sort_by(|a, b| b.score.total_cmp(&a.score));

        Ok(phrases)
    }

    fn model_name(&self) -> &str {
        self.embedder.model_name()
    }
}

/// Maximal Marginal Relevance over unit vectors
///
/// Returns `(candidate index, relevance to doc)` in selection order.
fn mmr(doc: &[f32], candidates: &[Vector], top_n: usize, diversity: f32) -> Vec<(usize, f32)> {
    let relevance: Vec<f32> = candidates.iter().map(|c| dot(c, doc)).collect();

    let Some(first) = argmax(relevance.iter().copied().enumerate()) else {
        return Vec::new();
    };

    let mut selected = vec![first];
    let mut remaining: Vec<usize> = (0..candidates.len()).filter(|&i| i != first).collect();

    let rounds = top_n.saturating_sub(1).min(candidates.len() - 1);
    for _ in 0..rounds {
        let scored = remaining.iter().enumerate().map(|(pos, &idx)| {
            let redundancy = selected
                .iter()
                .map(|&s| dot(&candidates[idx], &candidates[s]))
                .fold(f32::NEG_INFINITY, f32::max);
            let score = (1.0 - diversity) * relevance[idx] - diversity * redundancy;
            (pos, score)
        });

        let Some(pos) = argmax(scored) else {
            break;
        };
        selected.push(remaining.remove(pos));
    }

    selected.into_iter().map(|i| (i, relevance[i])).collect()
}

/// Index of the first maximum
fn argmax(values: impl Iterator<Item = (usize, f32)>) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, v) in values {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

fn round4(x: f32) -> f32 {
    (x * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::{normalize, HashingEmbedder};

    #[test]
    fn test_mmr_zero_diversity_is_pure_relevance() {
        let doc = normalize(&[1.0, 0.0, 0.0]);
        let candidates = vec![
            normalize(&[0.2, 1.0, 0.0]),
            normalize(&[1.0, 0.1, 0.0]),
            normalize(&[1.0, 0.5, 0.0]),
        ];
        let picked: Vec<usize> = mmr(&doc, &candidates, 3, 0.0)
            .into_iter()
            .map(|(i, _)| i)
            .collect();
        assert_eq!(picked, vec![1, 2, 0]);
    }

    #[test]
    fn test_mmr_high_diversity_avoids_duplicates() {
        let doc = normalize(&[1.0, 1.0, 0.0]);
        let candidates = vec![
            normalize(&[1.0, 0.9, 0.0]),
            normalize(&[1.0, 0.9, 0.01]), // near-duplicate of 0
            normalize(&[0.0, 1.0, 0.0]),
        ];
        let picked: Vec<usize> = mmr(&doc, &candidates, 2, 0.9)
            .into_iter()
            .map(|(i, _)| i)
            .collect();
        assert_eq!(picked[0], 0);
        assert_eq!(picked[1], 2);
    }

    #[test]
    fn test_mmr_caps_at_candidate_count() {
        let doc = vec![1.0, 0.0];
        let candidates = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        assert_eq!(mmr(&doc, &candidates, 10, 0.5).len(), 2);
        assert!(mmr(&doc, &[], 3, 0.5).is_empty());
    }

    #[test]
    fn test_extract_sorted_and_bounded() {
        let mut kb = KeyBert::new(HashingEmbedder::new("hashing-bow-384", 384));
        let text = "signal drivers trace hierarchy signals view eclipse ide modules nets";
        let phrases = kb.extract(text, (1, 2), 5, 0.5).unwrap();

        assert!(!phrases.is_empty());
        assert!(phrases.len() <= 5);
        assert!(phrases.iter().all(|p| !p.phrase.is_empty()));
        assert!(phrases.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_extract_stop_word_only_text_is_empty() {
        let mut kb = KeyBert::new(HashingEmbedder::new("hashing-bow-384", 384));
        assert!(kb.extract("the", (1, 1), 8, 0.5).unwrap().is_empty());
    }

    #[test]
    fn test_round4() {
        assert_eq!(round4(0.123456), 0.1235);
    }
}

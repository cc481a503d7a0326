//! Offline feature-hashing embedder
//!
//! Bag of words hashed into a fixed number of buckets with FNV-1a. Purely
//! lexical, so "cat" and "kitten" share nothing, but it needs no model files
//! and is fully deterministic.

use super::similarity::normalize;
use super::EmbeddingEngine;
use anyhow::Result;

pub struct HashingEmbedder {
    dimension: usize,
    model_name: String,
}

impl HashingEmbedder {
    pub fn new(model_name: &str, dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
            model_name: model_name.to_string(),
        }
    }

    fn accumulate(&self, token: &str, vector: &mut [f32]) {
        if token.is_empty() {
            return;
        }
        let weight = 1.0 + (token.chars().count() as f32).ln();
        let idx = (fnv1a_hash(token.as_bytes()) % self.dimension as u64) as usize;
        vector[idx] += weight;
    }
}

impl EmbeddingEngine for HashingEmbedder {
    fn encode(&mut self, text: &str, normalize_output: bool) -> Result<Vec<f32>> {
        let mut vector = vec![0.0; self.dimension];
        let lowered = text.to_lowercase();
        for token in lowered.split(|c: char| !c.is_alphanumeric()) {
            self.accumulate(token, &mut vector);
        }

        if normalize_output {
            Ok(normalize(&vector))
        } else {
            Ok(vector)
        }
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

fn fnv1a_hash(bytes: &[u8]) -> u64 {
    let mut hash = 0xcbf29ce484222325_u64;
    for byte in bytes {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x00000100000001b3_u64);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::cosine_similarity;
    use approx::assert_relative_eq;

    #[test]
    fn encode_is_deterministic() {
        let mut embedder = HashingEmbedder::new("hashing-bow-384", 384);
        let a = embedder.encode("Hello world, hello!", true).unwrap();
        let b = embedder.encode("Hello world, hello!", true).unwrap();
        assert_eq!(a.len(), 384);
        assert_eq!(a, b);
    }

    #[test]
    fn normalized_output_has_unit_norm() {
        let mut embedder = HashingEmbedder::new("hashing-bow-384", 384);
        let v = embedder.encode("The cat sat on the mat", true).unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert_relative_eq!(norm, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn shared_words_raise_similarity() {
        let mut embedder = HashingEmbedder::new("hashing-bow-384", 384);
        let a = embedder.encode("the cat sat on the mat", true).unwrap();
        let b = embedder.encode("a cat is sitting on a mat", true).unwrap();
        let c = embedder.encode("quarterly revenue forecast", true).unwrap();
        assert!(cosine_similarity(&a, &b) > cosine_similarity(&a, &c));
    }

    #[test]
    fn empty_text_is_zero_vector() {
        let mut embedder = HashingEmbedder::new("hashing-bow-384", 384);
        let v = embedder.encode("", true).unwrap();
        assert!(v.iter().all(|value| *value == 0.0));
    }
}

//! Similarity and distance metrics for embeddings

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported similarity metrics
///
/// Closed set: any other identifier is rejected with [`EngineError::UnknownMetric`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    /// Dot product of unit-normalised vectors, in [-1, 1]
    Cosine,
    /// Raw dot product, no normalisation forced
    DotProduct,
    /// `1 / (1 + euclidean_distance)`, in (0, 1]
    ///
    /// A display convenience that is monotone in distance. It is not a proper
    /// similarity metric and is not comparable with the other two scales.
    Euclidean,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Cosine, Metric::DotProduct, Metric::Euclidean];

    /// Label shown to the user (matches the identifiers accepted by `from_str`)
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Cosine => "Cosine",
            Metric::DotProduct => "Dot product",
            Metric::Euclidean => "Euclidean→similarity",
        }
    }

    fn score(&self, a: &[f32], b: &[f32], already_unit: bool) -> f32 {
        match self {
            Metric::Cosine => {
                if already_unit {
                    dot(a, b)
                } else {
                    dot(&normalize(a), &normalize(b))
                }
            }
            Metric::DotProduct => dot(a, b),
            Metric::Euclidean => euclidean_to_similarity(a, b),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Metric {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cosine" => Ok(Metric::Cosine),
            "dot product" | "dot-product" | "dot" => Ok(Metric::DotProduct),
            "euclidean→similarity" | "euclidean->similarity" | "euclidean" => {
                Ok(Metric::Euclidean)
            }
            _ => Err(EngineError::UnknownMetric(s.to_string())),
        }
    }
}

/// Compute the similarity of two vectors under `metric`.
///
/// With `already_unit` the caller guarantees both inputs have norm 1 and
/// cosine skips its normalisation step. Dot product and the Euclidean mapping
/// always use the vectors as given.
///
/// # Panics
/// Panics if vectors have different dimensions
pub fn similarity(a: &[f32], b: &[f32], metric: Metric, already_unit: bool) -> f32 {
    metric.score(a, b, already_unit)
}

/// Resolve a metric by name and score the pair in one step
pub fn similarity_by_name(
    a: &[f32],
    b: &[f32],
    metric: &str,
    already_unit: bool,
) -> Result<f32, EngineError> {
    let metric = Metric::from_str(metric)?;
    Ok(similarity(a, b, metric, already_unit))
}

/// L2 norm of a vector
pub fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// L2 normalize a vector
///
/// A zero vector is returned unchanged.
pub fn normalize(v: &[f32]) -> Vec<f32> {
    let n = norm(v);
    if n == 0.0 {
        return v.to_vec();
    }
    v.iter().map(|x| x / n).collect()
}

/// Dot product of two vectors
///
/// # Panics
/// Panics if vectors have different dimensions
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(
        a.len(),
        b.len(),
        "Vectors must have same dimension: {} vs {}",
        a.len(),
        b.len()
    );

    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Compute cosine similarity between two embedding vectors
///
/// Returns a value between -1.0 and 1.0, where:
/// - 1.0 = identical direction
/// - 0.0 = orthogonal vectors
/// - -1.0 = opposite vectors
///
/// # Panics
/// Panics if vectors have different dimensions
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot_product = dot(a, b);
    let magnitude_a = norm(a);
    let magnitude_b = norm(b);

    // Handle zero magnitude case
    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}

/// Compute Euclidean distance between two embedding vectors
///
/// Returns the L2 distance (always >= 0.0)
///
/// # Panics
/// Panics if vectors have different dimensions
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    distance_f64(a, b) as f32
}

/// Largest f32 strictly below 1.0
const BELOW_ONE: f32 = 1.0 - f32::EPSILON / 2.0;

/// Map Euclidean distance to (0, 1] via `1 / (1 + d)`
///
/// The distance is accumulated in f64, so distinct inputs always have a
/// positive distance. The score is still an f32, and distances below about
/// 3e-8 all land on the largest f32 under 1.0. Exactly 1.0 is reserved for
/// identical vectors.
pub fn euclidean_to_similarity(a: &[f32], b: &[f32]) -> f32 {
    let d = distance_f64(a, b);
    if d == 0.0 {
        return 1.0;
    }
    ((1.0 / (1.0 + d)) as f32).min(BELOW_ONE)
}

fn distance_f64(a: &[f32], b: &[f32]) -> f64 {
    assert_eq!(
        a.len(),
        b.len(),
        "Vectors must have same dimension: {} vs {}",
        a.len(),
        b.len()
    );

    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| (f64::from(x) - f64::from(y)).powi(2))
        .sum::<f64>()
        .sqrt()
}

//! Per-pair vector views: the angle between two embeddings and the
//! dimensions that contribute most to their cosine.

use crate::embeddings::{dot, normalize};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Angle {
    /// Cosine of the unit vectors, clamped to [-1, 1]
    pub cosine: f32,
    pub degrees: f32,
}

/// Angle between two vectors after unit normalisation
///
/// # Panics
/// Panics if vectors have different dimensions
pub fn angle_between(a: &[f32], b: &[f32]) -> Angle {
    let cosine = dot(&normalize(a), &normalize(b)).clamp(-1.0, 1.0);
    Angle {
        cosine,
        degrees: cosine.acos().to_degrees(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Contribution {
    pub dimension: usize,
    /// Element-wise product of the unit vectors at `dimension`
    pub value: f32,
}

/// The `n` element-wise products with the largest magnitude.
///
/// Positive values pull the cosine up, negative ones pull it down. Output is
/// ordered ascending by value, so opposing dimensions come first.
///
/// # Panics
/// Panics if vectors have different dimensions
pub fn top_contributions(a: &[f32], b: &[f32], n: usize) -> Vec<Contribution> {
    assert_eq!(
        a.len(),
        b.len(),
        "Vectors must have same dimension: {} vs {}",
        a.len(),
        b.len()
    );

    let ua = normalize(a);
    let ub = normalize(b);
    let mut contributions: Vec<Contribution> = ua
        .iter()
        .zip(ub.iter())
        .enumerate()
        .map(|(dimension, (x, y))| Contribution {
            dimension,
            value: x * y,
        })
        .collect();

    contributions.sort_by(|p, q| q.value.abs().total_cmp(&p.value.abs()));
    contributions.truncate(n);
    contributions.sort_by(|p, q| p.value.total_cmp(&q.value));
    contributions
}

//! 2D principal-component projection for the history map
//!
//! Rows are L2-normalised and centred, then the two leading eigenvectors of
//! the n×n Gram matrix are found by power iteration with deflation. Since
//! history holds at most a few hundred vectors while embeddings have hundreds
//! of dimensions, working in sample space keeps the solve small.
//!
//! Every call fits from scratch. The solver's start vector comes from a fixed
//! seed, so identical input (same vectors, same order) gives identical output.

use crate::embeddings::normalize;
use crate::error::{EngineError, EngineResult};
use fastrand::Rng;
use ndarray::{Array1, Array2, Axis};
use serde::Serialize;
use tracing::debug;

/// Fewer points make a 2D variance-maximising projection degenerate
pub const MIN_POINTS: usize = 3;

const SEED: u64 = 0;
const MAX_ITERATIONS: usize = 1_000;
const TOLERANCE: f64 = 1e-10;
/// Eigenvalues below this are treated as zero variance
const EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Projection {
    /// One coordinate per input vector, in input order
    pub points: Vec<Point2>,
    /// Share of total variance captured by PC1 and PC2
    pub explained_variance_ratio: [f32; 2],
}

/// Project vectors to 2D coordinates.
///
/// Fails with [`EngineError::InsufficientData`] below [`MIN_POINTS`] inputs and
/// with [`EngineError::DimensionMismatch`] when lengths differ.
pub fn project<V: AsRef<[f32]>>(vectors: &[V]) -> EngineResult<Vec<Point2>> {
    fit_projection(vectors).map(|p| p.points)
}

/// Project and report explained variance
pub fn fit_projection<V: AsRef<[f32]>>(vectors: &[V]) -> EngineResult<Projection> {
    if vectors.len() < MIN_POINTS {
        return Err(EngineError::InsufficientData {
            needed: MIN_POINTS,
            found: vectors.len(),
        });
    }

    let x = normalized_matrix(vectors)?;
    let n = x.nrows();

    let mean = x.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(x.ncols()));
    let centered = &x - &mean;
    let mut gram = centered.dot(&centered.t());
    let total_variance: f64 = gram.diag().sum();

    let mut rng = Rng::with_seed(SEED);
    let mut coords = [vec![0.0f64; n], vec![0.0f64; n]];
    let mut ratios = [0.0f32; 2];

    for (k, axis_coords) in coords.iter_mut().enumerate() {
        let Some((eigenvalue, mut u)) = leading_eigenpair(&gram, &mut rng) else {
            debug!(component = k, "no remaining variance");
            break;
        };

        // Orientation: largest-magnitude loading in feature space is positive
        let loading = centered.t().dot(&u);
        let pivot = loading
            .iter()
            .copied()
            .fold(0.0f64, |best, v| if v.abs() > best.abs() { v } else { best });
        if pivot < 0.0 {
            u.mapv_inplace(|v| -v);
        }

        let scale = eigenvalue.sqrt();
        for (c, ui) in axis_coords.iter_mut().zip(u.iter()) {
            *c = scale * ui;
        }

        if total_variance > EPSILON {
            ratios[k] = (eigenvalue / total_variance) as f32;
        }

        // Deflate
        gram.scaled_add(-eigenvalue, &outer(&u));
    }

    debug!(points = n, dims = x.ncols(), ?ratios, "fitted history projection");

    let points = coords[0]
        .iter()
        .zip(coords[1].iter())
        .map(|(&x, &y)| Point2 {
            x: x as f32,
            y: y as f32,
        })
        .collect();

    Ok(Projection {
        points,
        explained_variance_ratio: ratios,
    })
}

/// Stack rows after per-row L2 normalisation
fn normalized_matrix<V: AsRef<[f32]>>(vectors: &[V]) -> EngineResult<Array2<f64>> {
    let dim = vectors[0].as_ref().len();
    let mut x = Array2::<f64>::zeros((vectors.len(), dim));

    for (i, v) in vectors.iter().enumerate() {
        let v = v.as_ref();
        if v.len() != dim {
            return Err(EngineError::DimensionMismatch {
                expected: dim,
                found: v.len(),
            });
        }
        for (j, value) in normalize(v).into_iter().enumerate() {
            x[[i, j]] = value as f64;
        }
    }

    Ok(x)
}

/// Dominant eigenvalue and unit eigenvector of a symmetric PSD matrix
fn leading_eigenpair(matrix: &Array2<f64>, rng: &mut Rng) -> Option<(f64, Array1<f64>)> {
    let n = matrix.nrows();
    let mut u: Array1<f64> = (0..n).map(|_| rng.f64() - 0.5).collect();
    let start_norm = u.dot(&u).sqrt();
    if start_norm < EPSILON {
        return None;
    }
    u /= start_norm;

    for _ in 0..MAX_ITERATIONS {
        let w = matrix.dot(&u);
        let w_norm = w.dot(&w).sqrt();
        if w_norm < EPSILON {
            return None;
        }
        let next = w / w_norm;
        let delta = (&next - &u).mapv(|v| v * v).sum().sqrt();
        u = next;
        if delta < TOLERANCE {
            break;
        }
    }

    // Rayleigh quotient
    let eigenvalue = u.dot(&matrix.dot(&u));
    if eigenvalue < EPSILON {
        return None;
    }
    Some((eigenvalue, u))
}

fn outer(u: &Array1<f64>) -> Array2<f64> {
    let n = u.len();
    Array2::from_shape_fn((n, n), |(i, j)| u[i] * u[j])
}

//! Metric multidimensional scaling via SMACOF.
//!
//! Recovers 3D coordinates whose pairwise distances match a distogram. Each
//! restart begins from uniform random coordinates and repeatedly applies the
//! Guttman transform; the restart with the lowest raw stress is returned.
//! Restarts are independent and run on the rayon pool, each with its own seed
//! drawn up front so the result does not depend on thread scheduling.
use crate::config::MdsConfig;
use crate::error::{CoreError, Result};
use ndarray::{Array2, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::debug;

const N_COMPONENTS: usize = 3;
// stand-in for coincident points when forming the distance ratio
const ZERO_DISTANCE: f64 = 1e-5;

/// A single SMACOF run.
#[derive(Debug, Clone)]
pub struct Embedding {
    pub points: Array2<f64>,
    pub stress: f64,
    pub iterations: usize,
}

/// Reconstruct `[n, 3]` coordinates from an `[n, n]` distogram.
///
/// The orientation of the output is arbitrary; use
/// [`align_points`](super::align_points) before comparing it with a reference.
pub fn reconstruct_points(distogram: ArrayView2<f32>, config: &MdsConfig) -> Result<Array2<f64>> {
    Ok(reconstruct_embedding(distogram, config)?.points)
}

/// Same as [`reconstruct_points`] but also reports the winning stress.
pub fn reconstruct_embedding(distogram: ArrayView2<f32>, config: &MdsConfig) -> Result<Embedding> {
    let (rows, cols) = distogram.dim();
    if rows != cols || rows == 0 {
        return Err(CoreError::Validation(format!(
            "distogram must be a non-empty square matrix, got {rows}x{cols}"
        )));
    }
    if distogram.iter().any(|d| !d.is_finite() || *d < 0.0) {
        return Err(CoreError::Validation(
            "distogram entries must be finite and non-negative".into(),
        ));
    }
    if config.n_init == 0 {
        return Err(CoreError::Validation("mds.n_init must be at least 1".into()));
    }

    let dissimilarities = distogram.mapv(f64::from);
    let mut rng = match config.random_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let seeds: Vec<u64> = (0..config.n_init).map(|_| rng.gen()).collect();

    let best = seeds
        .par_iter()
        .map(|&seed| smacof_single(&dissimilarities, config.max_iter, config.eps, seed))
        .collect::<Vec<_>>()
        .into_iter()
        .min_by(|a, b| a.stress.total_cmp(&b.stress))
        .ok_or_else(|| CoreError::Validation("no MDS restarts were run".into()))?;

    debug!(
        residues = rows,
        restarts = config.n_init,
        stress = best.stress,
        iterations = best.iterations,
        "mds reconstruction finished"
    );
    Ok(best)
}

fn pairwise_distances(points: &Array2<f64>) -> Array2<f64> {
    let diff = &points.view().insert_axis(Axis(1)) - &points.view().insert_axis(Axis(0));
    diff.mapv(|d| d * d).sum_axis(Axis(2)).mapv(f64::sqrt)
}

fn smacof_single(dissimilarities: &Array2<f64>, max_iter: usize, eps: f64, seed: u64) -> Embedding {
    let n = dissimilarities.nrows();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut points = Array2::from_shape_simple_fn((n, N_COMPONENTS), || rng.gen::<f64>());

    let mut stress = f64::INFINITY;
    let mut previous: Option<f64> = None;
    let mut iterations = 0;

    for it in 0..max_iter {
        iterations = it + 1;
        let distances = pairwise_distances(&points);
        stress = (&distances - dissimilarities).mapv(|r| r * r).sum() / 2.0;

        // Guttman transform: X <- B(X) X / n
        let mut b = Array2::<f64>::zeros((n, n));
        for i in 0..n {
            let mut row_sum = 0.0;
            for j in 0..n {
                if i == j {
                    continue;
                }
                let d = distances[[i, j]];
                let ratio = dissimilarities[[i, j]] / if d == 0.0 { ZERO_DISTANCE } else { d };
                b[[i, j]] = -ratio;
                row_sum += ratio;
            }
            b[[i, i]] = row_sum;
        }
        points = b.dot(&points) / n as f64;

        let norm: f64 = points.rows().into_iter().map(|r| r.dot(&r).sqrt()).sum();
        if norm == 0.0 {
            break;
        }
        let relative = stress / norm;
        if let Some(prev) = previous {
            if prev - relative < eps {
                break;
            }
        }
        previous = Some(relative);
    }

    Embedding {
        points,
        stress,
        iterations,
    }
}

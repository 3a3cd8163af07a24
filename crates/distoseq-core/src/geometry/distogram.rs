use crate::error::{CoreError, Result};
use ndarray::{Array2, ArrayView2, Axis};

/// Pairwise Euclidean distances between residues.
///
/// Returns `None` unless `1 < coords.len() <= max_size`: single residues carry no
/// pairwise signal and very large structures are excluded from conditioning.
pub fn distogram(coords: &[[f32; 3]], max_size: usize) -> Option<Array2<f32>> {
    let n = coords.len();
    if n <= 1 || n > max_size {
        return None;
    }
    let points = Array2::from_shape_fn((n, 3), |(i, k)| coords[i][k]);
    // [n, 1, 3] - [1, n, 3] -> [n, n, 3]
    let diff = &points.view().insert_axis(Axis(1)) - &points.view().insert_axis(Axis(0));
    Some(diff.mapv(|d| d * d).sum_axis(Axis(2)).mapv(f32::sqrt))
}

/// 1 where two distinct residues are closer than `threshold`, else 0.
///
/// A residue is never in contact with itself, so the diagonal is always 0.
pub fn contact_map(coords: &[[f32; 3]], max_size: usize, threshold: f32) -> Option<Array2<u8>> {
    distogram(coords, max_size).map(|distances| {
        let mut contacts = distances.mapv(|d| u8::from(d < threshold));
        contacts.diag_mut().fill(0);
        contacts
    })
}

/// `exp(-decay_rate * distance)`: 1 on the diagonal, decaying towards 0 with distance.
pub fn soft_contact_map(
    coords: &[[f32; 3]],
    max_size: usize,
    decay_rate: f32,
) -> Option<Array2<f32>> {
    distogram(coords, max_size).map(|distances| distances.mapv(|d| (-decay_rate * d).exp()))
}

/// Invert [`soft_contact_map`]: `-ln(value) / decay_rate`, then symmetrize.
///
/// Rejects a zero or non-finite `decay_rate` and any entry that is not a positive
/// finite number, since those would produce infinite or NaN distances.
pub fn distogram_from_soft_contact_map(
    soft_map: ArrayView2<f32>,
    decay_rate: f32,
) -> Result<Array2<f32>> {
    if !decay_rate.is_finite() || decay_rate == 0.0 {
        return Err(CoreError::Domain {
            operation: "distogram_from_soft_contact_map",
            reason: format!("decay rate must be finite and non-zero, got {decay_rate}"),
        });
    }
    if let Some(((i, j), value)) = soft_map
        .indexed_iter()
        .find(|(_, v)| !v.is_finite() || **v <= 0.0)
    {
        return Err(CoreError::Domain {
            operation: "distogram_from_soft_contact_map",
            reason: format!("contact value at ({i}, {j}) is {value}"),
        });
    }
    if soft_map.nrows() != soft_map.ncols() {
        return Err(CoreError::Validation(format!(
            "soft contact map must be square, got {:?}",
            soft_map.shape()
        )));
    }
    let distances = soft_map.mapv(|v| -v.ln() / decay_rate);
    Ok((&distances + &distances.t()) / 2.0)
}

/// Slice the `[start, end)` block out of a distogram, clipping `end` to its size.
pub fn window_block(distogram: &Array2<f32>, start: usize, end: usize) -> ArrayView2<'_, f32> {
    let end = end.min(distogram.nrows());
    let start = start.min(end);
    distogram.slice(ndarray::s![start..end, start..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];

    fn helix(n: usize) -> Vec<[f32; 3]> {
        (0..n)
            .map(|i| {
                let t = i as f32 * 100f32.to_radians();
                [2.3 * t.cos(), 2.3 * t.sin(), 1.5 * i as f32]
            })
            .collect()
    }

    #[test]
    fn test_triangle_distogram() {
        let d = distogram(&TRIANGLE, 250).unwrap();
        let sqrt2 = 2f32.sqrt();
        let expected = [[0.0, 1.0, 1.0], [1.0, 0.0, sqrt2], [1.0, sqrt2, 0.0]];
        for i in 0..3 {
            for j in 0..3 {
                assert!((d[[i, j]] - expected[i][j]).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_triangle_contact_map() {
        let cm = contact_map(&TRIANGLE, 250, 8.0).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(cm[[i, j]], u8::from(i != j));
            }
        }
    }

    #[test]
    fn test_contact_map_excludes_self_contacts() {
        let coords = helix(12);
        let cm = contact_map(&coords, 250, 8.0).unwrap();
        assert!(cm.diag().iter().all(|&c| c == 0));
        assert_eq!(cm, cm.t());
        // consecutive residues always sit inside the threshold
        for i in 0..11 {
            assert_eq!(cm[[i, i + 1]], 1);
        }
    }

    #[test]
    fn test_distogram_properties() {
        for n in [2usize, 7, 40] {
            let d = distogram(&helix(n), 250).unwrap();
            assert_eq!(d.dim(), (n, n));
            for i in 0..n {
                assert_eq!(d[[i, i]], 0.0);
                for j in 0..n {
                    assert!(d[[i, j]] >= 0.0);
                    assert_eq!(d[[i, j]], d[[j, i]]);
                }
            }
        }
    }

    #[test]
    fn test_distogram_undefined_sizes() {
        assert!(distogram(&[], 250).is_none());
        assert!(distogram(&[[1.0, 2.0, 3.0]], 250).is_none());
        assert!(distogram(&helix(251), 250).is_none());
        assert!(distogram(&helix(250), 250).is_some());
        assert!(contact_map(&helix(1), 250, 8.0).is_none());
        assert!(soft_contact_map(&helix(300), 250, 0.5).is_none());
    }

    #[test]
    fn test_soft_contact_round_trip() {
        let coords = helix(20);
        let d = distogram(&coords, 250).unwrap();
        let soft = soft_contact_map(&coords, 250, 0.5).unwrap();
        let recovered = distogram_from_soft_contact_map(soft.view(), 0.5).unwrap();
        for (a, b) in d.iter().zip(recovered.iter()) {
            assert!((a - b).abs() < 1e-3, "{a} vs {b}");
        }
        assert_eq!(recovered, recovered.t());
    }

    #[test]
    fn test_soft_contact_is_monotone() {
        let coords = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [5.0, 0.0, 0.0]];
        let soft = soft_contact_map(&coords, 250, 0.5).unwrap();
        assert_eq!(soft[[0, 0]], 1.0);
        assert!(soft[[0, 1]] > soft[[0, 2]]);
    }

    #[test]
    fn test_inversion_domain_errors() {
        let soft = soft_contact_map(&TRIANGLE, 250, 0.5).unwrap();
        assert!(matches!(
            distogram_from_soft_contact_map(soft.view(), 0.0),
            Err(CoreError::Domain { .. })
        ));
        let mut with_zero = soft.clone();
        with_zero[[0, 1]] = 0.0;
        assert!(matches!(
            distogram_from_soft_contact_map(with_zero.view(), 0.5),
            Err(CoreError::Domain { .. })
        ));
        let mut with_nan = soft;
        with_nan[[2, 1]] = f32::NAN;
        assert!(distogram_from_soft_contact_map(with_nan.view(), 0.5).is_err());
    }

    #[test]
    fn test_window_block() {
        let d = distogram(&helix(10), 250).unwrap();
        let block = window_block(&d, 2, 6);
        assert_eq!(block.dim(), (4, 4));
        assert_eq!(block[[0, 3]], d[[2, 5]]);
        assert_eq!(window_block(&d, 8, 20).dim(), (2, 2));
    }
}

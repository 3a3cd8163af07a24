//! Rigid superposition of two point clouds (Kabsch).
use crate::error::{CoreError, Result};
use nalgebra::{Matrix3, Vector3};
use ndarray::{Array2, ArrayView2};

/// Rotation and translation mapping a predicted point set onto a reference.
#[derive(Debug, Clone)]
pub struct Superposition {
    /// Proper rotation (determinant +1), applied to column vectors.
    pub rotation: Matrix3<f64>,
    pub translation: Vector3<f64>,
    /// The predicted points after the transform.
    pub aligned: Array2<f64>,
}

impl Superposition {
    /// Apply the fitted transform to any `[n, 3]` point set.
    pub fn apply(&self, points: ArrayView2<f64>) -> Result<Array2<f64>> {
        let vectors = to_vectors(points)?;
        Ok(from_vectors(vectors.iter().map(|p| self.rotation * p + self.translation)))
    }
}

fn to_vectors(points: ArrayView2<f64>) -> Result<Vec<Vector3<f64>>> {
    if points.ncols() != 3 {
        return Err(CoreError::Validation(format!(
            "expected [n, 3] points, got {:?}",
            points.shape()
        )));
    }
    Ok(points
        .rows()
        .into_iter()
        .map(|r| Vector3::new(r[0], r[1], r[2]))
        .collect())
}

fn from_vectors(vectors: impl ExactSizeIterator<Item = Vector3<f64>>) -> Array2<f64> {
    let n = vectors.len();
    let flat: Vec<f64> = vectors.flat_map(|v| [v.x, v.y, v.z]).collect();
    Array2::from_shape_vec((n, 3), flat).unwrap_or_else(|_| Array2::zeros((n, 3)))
}

fn centroid(points: &[Vector3<f64>]) -> Vector3<f64> {
    points.iter().sum::<Vector3<f64>>() / points.len() as f64
}

/// Superimpose `predicted` onto `ground_truth`.
///
/// Both sets are centered on their own centroid, the cross-covariance
/// `H = Pᵀ Q` is decomposed as `U S Vᵀ` and the rotation is `V Uᵀ`. When that
/// rotation is a reflection the last singular direction is flipped. The rotated
/// points are then moved onto the ground-truth centroid.
pub fn align_points(
    predicted: ArrayView2<f64>,
    ground_truth: ArrayView2<f64>,
) -> Result<Superposition> {
    let p = to_vectors(predicted)?;
    let q = to_vectors(ground_truth)?;
    if p.len() != q.len() {
        return Err(CoreError::PointCountMismatch {
            predicted: p.len(),
            ground_truth: q.len(),
        });
    }
    if p.is_empty() {
        return Err(CoreError::Validation("cannot align empty point sets".into()));
    }

    let center_p = centroid(&p);
    let center_q = centroid(&q);

    let mut h = Matrix3::zeros();
    for (pi, qi) in p.iter().zip(q.iter()) {
        h += (pi - center_p) * (qi - center_q).transpose();
    }

    let svd = h.svd(true, true);
    let u = svd.u.ok_or(CoreError::Decomposition("U"))?;
    let mut v_t = svd.v_t.ok_or(CoreError::Decomposition("V^T"))?;

    let mut rotation = v_t.transpose() * u.transpose();
    if rotation.determinant() < 0.0 {
        v_t.row_mut(2).neg_mut();
        rotation = v_t.transpose() * u.transpose();
    }

    let translation = center_q - rotation * center_p;
    let aligned = from_vectors(p.iter().map(|pi| rotation * (pi - center_p) + center_q));

    Ok(Superposition {
        rotation,
        translation,
        aligned,
    })
}

/// Root-mean-square deviation between two equally sized point sets, without alignment.
pub fn rmsd(a: ArrayView2<f64>, b: ArrayView2<f64>) -> Result<f64> {
    if a.dim() != b.dim() {
        return Err(CoreError::PointCountMismatch {
            predicted: a.nrows(),
            ground_truth: b.nrows(),
        });
    }
    if a.nrows() == 0 {
        return Err(CoreError::Validation("rmsd of empty point sets".into()));
    }
    let squared: f64 = (&a - &b).mapv(|d| d * d).sum();
    Ok((squared / a.nrows() as f64).sqrt())
}

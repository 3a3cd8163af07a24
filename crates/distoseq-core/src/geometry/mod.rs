//! Geometry Engine
//!
//! Pure functions turning per-residue coordinates into pairwise descriptors and
//! back:
//!
//! - [`distogram`], [`contact_map`], [`soft_contact_map`]: coordinate -> matrix transforms.
//!   These return `None` when the structure is too small or too large.
//! - [`distogram_from_soft_contact_map`]: the inverse of the soft contact transform.
//! - [`reconstruct_points`]: SMACOF multidimensional scaling, distogram -> 3D points.
//! - [`align_points`]: Kabsch superposition of a reconstruction onto a reference.
mod distogram;
mod mds;
mod superpose;

pub use distogram::{
    contact_map, distogram, distogram_from_soft_contact_map, soft_contact_map, window_block,
};
pub use mds::{reconstruct_embedding, reconstruct_points, Embedding};
pub use superpose::{align_points, rmsd, Superposition};

use ndarray::Array2;

/// Convert `[x, y, z]` coordinates into an `[n, 3]` f64 array for the MDS and alignment code.
pub fn coords_to_array(coords: &[[f32; 3]]) -> Array2<f64> {
    Array2::from_shape_fn((coords.len(), 3), |(i, k)| f64::from(coords[i][k]))
}

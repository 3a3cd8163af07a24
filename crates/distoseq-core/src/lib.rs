//! # distoseq-core
//!
//! Geometry and data preparation for distance-conditioned protein sequence models.
//!
//! __distoseq-core__ provides functionality for:
//! * Turning per-residue coordinates into distograms and hard or soft contact maps
//! * Reconstructing 3D points from a distogram (SMACOF) and superimposing them on a reference
//! * Encoding sequences into padded residue codes with validity masks
//! * Choosing augmentation windows and building next-residue training examples
//!
//! Everything here is plain `ndarray`; tensors and models live in `distoseq-models`.
//!
mod config;
mod encoding;
mod error;
mod featurize;
pub mod geometry;
mod record;
mod residue;
mod window;

pub use self::config::{
    CoreConfig, EncodingConfig, GeometryConfig, MdsConfig, SizeConfig, TruncationPolicy,
};
pub use self::encoding::{encode_sequence, EncodedSequence};
pub use self::error::{CoreError, Result};
pub use self::featurize::{build_example, normalize_distances, TrainingExample};
pub use self::record::{parse_records, read_records, ProteinRecord};
pub use self::residue::{
    aa1_to_code, code_to_aa1, AminoAcid, NON_STANDARD_AMINO_ACIDS, PAD_CODE, STANDARD_AMINO_ACIDS,
    UNKNOWN_CODE, VOCAB_SIZE,
};
pub use self::window::{select_window, Mode, Window};

use thiserror::Error;

/// Errors raised by the geometry and encoding layers.
///
/// A distogram that cannot be defined (too few or too many residues) is not an
/// error: those functions return `None`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Sequence of length {length} exceeds the configured maximum of {max_len}")]
    SequenceTooLong { length: usize, max_len: usize },

    #[error("Record has {coords} coordinates but its sequence has {residues} residues")]
    CoordinateMismatch { coords: usize, residues: usize },

    #[error("Point sets differ in size: {predicted} vs {ground_truth}")]
    PointCountMismatch { predicted: usize, ground_truth: usize },

    #[error("Value outside the domain of {operation}: {reason}")]
    Domain {
        operation: &'static str,
        reason: String,
    },

    #[error("Singular value decomposition failed: {0}")]
    Decomposition(&'static str),

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Malformed record on line {line}: {source}")]
    Record {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, CoreError>;

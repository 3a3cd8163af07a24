//! Sequence -> fixed-length numeric arrays.
use crate::config::TruncationPolicy;
use crate::error::{CoreError, Result};
use crate::residue::{aa1_to_code, PAD_CODE};
use ndarray::Array1;
use tracing::warn;

/// A right-padded sequence with its validity mask.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedSequence {
    /// Residue codes, `PAD_CODE` beyond `length`.
    pub codes: Array1<u32>,
    /// 1.0 for residues, 0.0 for padding.
    pub mask: Array1<f32>,
    /// Number of valid positions.
    pub length: usize,
}

impl EncodedSequence {
    pub fn max_len(&self) -> usize {
        self.codes.len()
    }

    /// Index of the last valid residue, `None` for an empty sequence.
    pub fn last_valid_index(&self) -> Option<usize> {
        self.length.checked_sub(1)
    }
}

/// Encode `sequence` into `max_len` codes plus a mask.
///
/// Over-long sequences are truncated (with a warning) or rejected depending on `policy`.
pub fn encode_sequence(
    sequence: &str,
    max_len: usize,
    policy: TruncationPolicy,
) -> Result<EncodedSequence> {
    let residues: Vec<char> = sequence.chars().collect();
    let length = if residues.len() > max_len {
        match policy {
            TruncationPolicy::Reject => {
                return Err(CoreError::SequenceTooLong {
                    length: residues.len(),
                    max_len,
                })
            }
            TruncationPolicy::Truncate => {
                warn!(
                    length = residues.len(),
                    max_len, "truncating sequence to the padded length"
                );
                max_len
            }
        }
    } else {
        residues.len()
    };

    let mut codes = Array1::from_elem(max_len, PAD_CODE);
    let mut mask = Array1::zeros(max_len);
    for (idx, residue) in residues.iter().take(length).enumerate() {
        codes[idx] = aa1_to_code(*residue);
        mask[idx] = 1.0;
    }

    Ok(EncodedSequence {
        codes,
        mask,
        length,
    })
}

//! Training example construction for next-residue prediction.
//!
//! For a record and a window the last valid residue of the window becomes the
//! target: its code is recorded as ground truth and zeroed in the input. The
//! conditioning signal is the distogram row of that residue restricted to the
//! window, min-max normalized and zero padded to the model input length.
use crate::config::CoreConfig;
use crate::encoding::encode_sequence;
use crate::error::{CoreError, Result};
use crate::geometry::{distogram, window_block};
use crate::record::ProteinRecord;
use crate::residue::PAD_CODE;
use crate::window::Window;
use ndarray::{s, Array1, ArrayView1};

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExample {
    /// Padded residue codes with the target position set to `PAD_CODE`.
    pub sequence: Array1<u32>,
    /// Distances from the target residue to every residue of the window, zero padded.
    pub distances: Array1<f32>,
    pub mask: Array1<f32>,
    pub target_index: usize,
    /// Residue code the model should predict.
    pub target: u32,
    pub window: Window,
}

/// Min-max scale into `[0, 1]`. A constant row scales to zeros.
pub fn normalize_distances(row: ArrayView1<f32>) -> Array1<f32> {
    let min = row.iter().copied().fold(f32::INFINITY, f32::min);
    let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let span = max - min;
    if !span.is_finite() || span <= 0.0 {
        return Array1::zeros(row.len());
    }
    row.mapv(|d| (d - min) / span)
}

/// Build one example from `record` restricted to `window`.
///
/// Returns `Ok(None)` when the record cannot condition the model: it has no
/// coordinates, its distogram is undefined, or the window is empty.
pub fn build_example(
    record: &ProteinRecord,
    window: Window,
    config: &CoreConfig,
    normalize: bool,
) -> Result<Option<TrainingExample>> {
    record.validate()?;
    if window.end > record.len() || window.start > window.end {
        return Err(CoreError::Validation(format!(
            "window {}..{} does not fit a sequence of {} residues",
            window.start,
            window.end,
            record.len()
        )));
    }
    let Some(coords) = record.coords.as_deref() else {
        return Ok(None);
    };
    let Some(full) = distogram(coords, config.sizes.max_size) else {
        return Ok(None);
    };

    let max_len = config.sizes.max_training_size;
    let sub_sequence = window.slice_sequence(&record.sequence);
    let encoded = encode_sequence(&sub_sequence, max_len, config.encoding.truncation)?;
    let Some(target_index) = encoded.last_valid_index() else {
        return Ok(None);
    };

    let mut sequence = encoded.codes;
    let target = sequence[target_index];
    sequence[target_index] = PAD_CODE;

    let block = window_block(&full, window.start, window.end);
    let row = block.row(target_index);
    let row = row.slice(s![..encoded.length]);
    let row = if normalize {
        normalize_distances(row)
    } else {
        row.to_owned()
    };
    let mut distances = Array1::zeros(max_len);
    distances.slice_mut(s![..row.len()]).assign(&row);

    Ok(Some(TrainingExample {
        sequence,
        distances,
        mask: encoded.mask,
        target_index,
        target,
        window,
    }))
}

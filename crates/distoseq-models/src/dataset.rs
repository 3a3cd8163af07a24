//! Record filtering and the train/test split.
use distoseq_core::{ProteinRecord, SizeConfig};
use tracing::{info, warn};

/// Keep records the distogram strategy can learn from.
///
/// Dropped: sequences shorter than `min_size`, records without coordinates,
/// records whose coordinates do not line up with the sequence, and structures
/// larger than `max_size` (their distogram is undefined).
pub fn prepare_records(records: Vec<ProteinRecord>, sizes: &SizeConfig) -> Vec<ProteinRecord> {
    let total = records.len();
    let mut too_short = 0;
    let mut no_coords = 0;
    let mut too_large = 0;
    let mut invalid = 0;

    let kept: Vec<ProteinRecord> = records
        .into_iter()
        .filter(|record| {
            if record.len() < sizes.min_size {
                too_short += 1;
                return false;
            }
            if record.coords.is_none() {
                no_coords += 1;
                return false;
            }
            if let Err(e) = record.validate() {
                warn!(record = record.label(), error = %e, "skipping record");
                invalid += 1;
                return false;
            }
            if record.len() > sizes.max_size {
                too_large += 1;
                return false;
            }
            true
        })
        .collect();

    if no_coords > 0 {
        warn!(count = no_coords, "skipping records without coordinates");
    }
    info!(
        total,
        kept = kept.len(),
        too_short,
        no_coords,
        too_large,
        invalid,
        "prepared records"
    );
    kept
}

/// Split without shuffling: the last `ceil(test_fraction * n)` items form the test set.
pub fn train_test_split<T: Clone>(items: &[T], test_fraction: f64) -> (Vec<T>, Vec<T>) {
    let n = items.len();
    let n_test = ((test_fraction * n as f64).ceil() as usize).min(n);
    let (train, test) = items.split_at(n - n_test);
    (train.to_vec(), test.to_vec())
}

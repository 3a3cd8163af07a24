//! distoseq-models
//!
//! Candle models conditioned on distograms, the strategies that feed them and
//! the training loop.
//!
//! ```shell
//! cargo run -p distoseq-cli -- train --records records.jsonl --output runs
//! cargo run -p distoseq-cli --features metal -- train --records records.jsonl --output runs
//! ```
use candle_core::utils::{cuda_is_available, metal_is_available};
use candle_core::{Device, Result};

pub use batch::{Batch, ModelInputs};
pub use checkpoint::{
    checkpoint_dir, load_checkpoint, read_metadata, save_checkpoint, CheckpointMetadata,
    LoadedCheckpoint,
};
pub use config::{DistoseqConfig, TrainerConfig};
pub use dataset::{prepare_records, train_test_split};
pub use distogram_to_sequence::{
    DistogramToSequence, DistogramToSequenceConfig, DistogramToSequenceStrategy,
};
pub use error::TrainingError;
pub use outputs::ModelOutput;
pub use strategy::{Strategy, StrategyKind};
pub use trainer::{BestLossTracker, EpochSummary, Trainer, TrainingReport};

pub mod batch;
pub mod checkpoint;
pub mod config;
pub mod dataset;
pub mod distogram_to_sequence;
pub mod error;
pub mod outputs;
pub mod strategy;
pub mod trainer;

pub fn device(cpu: bool) -> Result<Device> {
    if cpu {
        Ok(Device::Cpu)
    } else if cuda_is_available() {
        Ok(Device::new_cuda(0)?)
    } else if metal_is_available() {
        Ok(Device::new_metal(0)?)
    } else {
        #[cfg(all(target_os = "macos", target_arch = "aarch64"))]
        {
            tracing::info!("Running on CPU, to run on GPU(metal), build with `--features metal`");
        }
        #[cfg(not(all(target_os = "macos", target_arch = "aarch64")))]
        {
            tracing::info!("Running on CPU, to run on GPU, build with `--features cuda`");
        }
        Ok(Device::Cpu)
    }
}

//! Run configuration.
//!
//! The JSON layout is flat at the top level:
//!
//! ```json
//! {
//!   "sizes": { "min_size": 10, "max_size": 250, "max_training_size": 250 },
//!   "geometry": { "contact_threshold": 8.0, "soft_decay_rate": 0.5, "mds": { "n_init": 1000 } },
//!   "encoding": { "truncation": "truncate" },
//!   "model": { "hidden_size": 360, "num_layers": 6, "num_heads": 6 },
//!   "trainer": { "epochs": 10, "batch_size": 32, "learning_rate": 0.001 }
//! }
//! ```
//!
//! Every field is optional.
use crate::distogram_to_sequence::DistogramToSequenceConfig;
use anyhow::{Context, Result};
use distoseq_core::CoreConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    /// AdamW decoupled weight decay. Zero makes the optimizer plain Adam.
    pub weight_decay: f64,
    /// Log the epoch's running sample-weighted loss every `log_every` batches.
    pub log_every: usize,
    /// Fraction of records held out, taken from the end of the input order.
    pub test_fraction: f64,
    /// Seeds shuffling and window sampling. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            epochs: 10,
            batch_size: 32,
            learning_rate: 1e-3,
            weight_decay: 0.0,
            log_every: 100,
            test_fraction: 0.2,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistoseqConfig {
    #[serde(flatten)]
    pub core: CoreConfig,
    pub model: DistogramToSequenceConfig,
    pub trainer: TrainerConfig,
}

impl DistoseqConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.core.validate()?;
        self.model.validate()?;
        let trainer = &self.trainer;
        anyhow::ensure!(trainer.batch_size > 0, "trainer.batch_size must be at least 1");
        anyhow::ensure!(trainer.log_every > 0, "trainer.log_every must be at least 1");
        anyhow::ensure!(
            trainer.learning_rate.is_finite() && trainer.learning_rate > 0.0,
            "trainer.learning_rate must be positive"
        );
        anyhow::ensure!(
            (0.0..1.0).contains(&trainer.test_fraction),
            "trainer.test_fraction must be in [0, 1), got {}",
            trainer.test_fraction
        );
        Ok(())
    }
}

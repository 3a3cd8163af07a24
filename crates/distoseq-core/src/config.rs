//! Configuration shared by the geometry, encoding and windowing layers.
//!
//! A single [`CoreConfig`] is built once (usually from a JSON file) and passed by
//! reference to everything that needs size bounds or geometry constants. Every
//! field has a default so partial JSON documents are accepted.
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// Bounds on residue counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeConfig {
    /// Shortest augmentation window, and shortest record kept for training.
    pub min_size: usize,
    /// Longest augmentation window, and the largest structure a distogram is defined for.
    pub max_size: usize,
    /// Padded length of every model input, and the evaluation window.
    pub max_training_size: usize,
}

impl Default for SizeConfig {
    fn default() -> Self {
        Self {
            min_size: 10,
            max_size: 250,
            max_training_size: 250,
        }
    }
}

/// Multidimensional scaling (SMACOF) settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MdsConfig {
    /// Number of random restarts; the lowest-stress embedding wins.
    pub n_init: usize,
    /// Iteration cap per restart.
    pub max_iter: usize,
    /// Relative stress improvement below which a restart is considered converged.
    pub eps: f64,
    pub random_seed: Option<u64>,
}

impl Default for MdsConfig {
    fn default() -> Self {
        Self {
            n_init: 1000,
            max_iter: 30000,
            eps: 1e-3,
            random_seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Distance (Angstrom) under which two residues are in contact.
    pub contact_threshold: f32,
    pub soft_decay_rate: f32,
    pub mds: MdsConfig,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            contact_threshold: 8.0,
            soft_decay_rate: 0.5,
            mds: MdsConfig::default(),
        }
    }
}

/// What to do with a sequence longer than the padded length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncationPolicy {
    /// Keep the first `max_len` residues and log a warning.
    #[default]
    Truncate,
    /// Fail with [`CoreError::SequenceTooLong`].
    Reject,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    pub truncation: TruncationPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub sizes: SizeConfig,
    pub geometry: GeometryConfig,
    pub encoding: EncodingConfig,
}

impl CoreConfig {
    pub fn validate(&self) -> Result<()> {
        let sizes = &self.sizes;
        if sizes.min_size == 0 {
            return Err(CoreError::Validation("min_size must be at least 1".into()));
        }
        if sizes.min_size > sizes.max_size {
            return Err(CoreError::Validation(format!(
                "min_size ({}) is larger than max_size ({})",
                sizes.min_size, sizes.max_size
            )));
        }
        if sizes.max_training_size == 0 {
            return Err(CoreError::Validation(
                "max_training_size must be at least 1".into(),
            ));
        }
        let decay = self.geometry.soft_decay_rate;
        if !decay.is_finite() || decay <= 0.0 {
            return Err(CoreError::Validation(format!(
                "soft_decay_rate must be a positive finite number, got {decay}"
            )));
        }
        if self.geometry.mds.n_init == 0 || self.geometry.mds.max_iter == 0 {
            return Err(CoreError::Validation(
                "mds.n_init and mds.max_iter must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

use distoseq_core::VOCAB_SIZE;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistogramToSequenceConfig {
    pub hidden_size: usize,
    pub num_layers: usize,
    pub num_heads: usize,
    /// Padding + 20 standard residues + unknown.
    pub vocab_size: usize,
    /// Min-max scale each distance row before it becomes an attention query.
    pub normalize_distances: bool,
}

impl Default for DistogramToSequenceConfig {
    fn default() -> Self {
        Self {
            hidden_size: 360,
            num_layers: 6,
            num_heads: 6,
            vocab_size: VOCAB_SIZE,
            normalize_distances: true,
        }
    }
}

impl DistogramToSequenceConfig {
    pub fn head_dim(&self) -> usize {
        self.hidden_size / self.num_heads
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.num_heads > 0, "model.num_heads must be at least 1");
        anyhow::ensure!(
            self.hidden_size > 0 && self.hidden_size % self.num_heads == 0,
            "model.hidden_size ({}) must be a positive multiple of model.num_heads ({})",
            self.hidden_size,
            self.num_heads
        );
        anyhow::ensure!(self.num_layers > 0, "model.num_layers must be at least 1");
        anyhow::ensure!(
            self.vocab_size >= VOCAB_SIZE,
            "model.vocab_size must cover the {VOCAB_SIZE} residue codes"
        );
        Ok(())
    }
}

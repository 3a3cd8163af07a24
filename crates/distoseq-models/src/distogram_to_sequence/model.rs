//! Distance-conditioned next-residue prediction.
//!
//! The distance row of the target residue, turned into a proximity weight, is the
//! attention query of every layer. The padded sequence (residue codes broadcast
//! across the hidden width) is the key/value stream of the first layer, and each
//! later layer attends over the previous layer's output. The hidden state at the
//! target position is projected to residue logits.
use super::attention::{key_padding_bias, MaskedAttention};
use super::config::DistogramToSequenceConfig;
use crate::batch::ModelInputs;
use crate::outputs::ModelOutput;
use candle_core::{DType, Module, Result, Tensor, D};
use candle_nn::{linear, ops::log_softmax, ops::softmax_last_dim, Linear, VarBuilder};
use distoseq_core::code_to_aa1;

#[derive(Debug)]
pub struct DistogramToSequence {
    layers: Vec<MaskedAttention>,
    linear: Linear,
    config: DistogramToSequenceConfig,
}

impl DistogramToSequence {
    pub fn load(vb: VarBuilder, config: &DistogramToSequenceConfig) -> Result<Self> {
        let layers = (0..config.num_layers)
            .map(|i| MaskedAttention::load(vb.pp("attention_layers"), config, i))
            .collect::<Result<Vec<_>>>()?;
        let linear = linear(config.hidden_size, config.vocab_size, vb.pp("linear"))?;
        Ok(Self {
            layers,
            linear,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &DistogramToSequenceConfig {
        &self.config
    }

    // [batch, len] -> [batch, len, hidden]
    fn expand_hidden(&self, x: &Tensor) -> Result<Tensor> {
        let (batch_size, seq_len) = x.dims2()?;
        x.unsqueeze(D::Minus1)?
            .broadcast_as((batch_size, seq_len, self.config.hidden_size))?
            .contiguous()
    }

    /// Index of the last valid position per row, `mask.sum() - 1`, as u32.
    pub fn target_indices(mask: &Tensor) -> Result<Tensor> {
        (mask.sum(D::Minus1)? - 1.0)?.to_dtype(DType::U32)
    }

    pub fn forward(&self, inputs: &ModelInputs) -> Result<ModelOutput> {
        let mask = &inputs.mask;
        let weights = inputs.distances.affine(-1.0, 1.0)?.mul(mask)?;
        let key_bias = key_padding_bias(mask)?;
        let target = Self::target_indices(mask)?;

        let query = self.expand_hidden(&weights)?;
        let mut x = self.expand_hidden(&inputs.sequence)?;
        for layer in self.layers.iter() {
            x = layer.forward(&query, &x, &key_bias)?;
        }

        let (batch_size, _, hidden) = x.dims3()?;
        let index = target
            .reshape((batch_size, 1, 1))?
            .broadcast_as((batch_size, 1, hidden))?
            .contiguous()?;
        let hidden_at_target = x.gather(&index, 1)?.squeeze(1)?;

        let logits = self.linear.forward(&hidden_at_target)?;
        let probabilities = softmax_last_dim(&logits)?;
        Ok(ModelOutput {
            logits,
            probabilities,
        })
    }

    /// Mean cross-entropy of `logits` against one-hot `ground_truth`.
    pub fn compute_loss(&self, output: &ModelOutput, ground_truth: &Tensor) -> Result<Tensor> {
        log_softmax(&output.logits, D::Minus1)?
            .mul(ground_truth)?
            .sum(D::Minus1)?
            .mean_all()?
            .neg()
    }

    /// Most probable residue letter for every example in the batch.
    pub fn predict(&self, inputs: &ModelInputs) -> Result<Vec<char>> {
        let output = self.forward(inputs)?;
        let codes = output.probabilities.argmax(D::Minus1)?.to_vec1::<u32>()?;
        Ok(codes.into_iter().map(code_to_aa1).collect())
    }
}

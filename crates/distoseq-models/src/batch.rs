//! Stack training examples into batch tensors.
use candle_core::{Device, Result, Tensor};
use candle_nn::encoding::one_hot;
use distoseq_core::TrainingExample;
use itertools::MultiUnzip;

/// Per-example sequence, distances, mask and target, column by column.
type Columns = (Vec<Vec<f32>>, Vec<Vec<f32>>, Vec<Vec<f32>>, Vec<u32>);

/// Model inputs, each `[batch, max_len]` f32.
#[derive(Debug, Clone)]
pub struct ModelInputs {
    /// Residue codes as floats, target position zeroed.
    pub sequence: Tensor,
    pub distances: Tensor,
    pub mask: Tensor,
}

#[derive(Debug, Clone)]
pub struct Batch {
    pub inputs: ModelInputs,
    /// Target residue codes, `[batch]` u32.
    pub targets: Tensor,
    /// One-hot of `targets`, `[batch, vocab]` f32.
    pub ground_truth: Tensor,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.targets.dims1().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All examples must share the same padded length.
    pub fn collate(
        examples: &[TrainingExample],
        vocab_size: usize,
        device: &Device,
    ) -> Result<Self> {
        let batch_size = examples.len();
        let max_len = examples.first().map_or(0, |e| e.sequence.len());
        if let Some(bad) = examples.iter().find(|e| e.sequence.len() != max_len) {
            candle_core::bail!(
                "examples differ in padded length: {} vs {}",
                bad.sequence.len(),
                max_len
            );
        }

        let (sequence, distances, mask, targets): Columns = examples
            .iter()
            .map(|e| {
                (
                    e.sequence.iter().map(|&code| code as f32).collect::<Vec<f32>>(),
                    e.distances.to_vec(),
                    e.mask.to_vec(),
                    e.target,
                )
            })
            .multiunzip();
        let flatten = |rows: Vec<Vec<f32>>| rows.into_iter().flatten().collect::<Vec<f32>>();

        let shape = (batch_size, max_len);
        let inputs = ModelInputs {
            sequence: Tensor::from_vec(flatten(sequence), shape, device)?,
            distances: Tensor::from_vec(flatten(distances), shape, device)?,
            mask: Tensor::from_vec(flatten(mask), shape, device)?,
        };
        let targets = Tensor::from_vec(targets, batch_size, device)?;
        let ground_truth = one_hot(targets.clone(), vocab_size, 1f32, 0f32)?;
        Ok(Self {
            inputs,
            targets,
            ground_truth,
        })
    }
}

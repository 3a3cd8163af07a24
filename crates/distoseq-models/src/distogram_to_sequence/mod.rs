//! Predict the last residue of a window from its distances to the rest of the window.
mod attention;
mod config;
mod model;

pub use attention::{key_padding_bias, MaskedAttention};
pub use config::DistogramToSequenceConfig;
pub use model::DistogramToSequence;

use crate::batch::ModelInputs;
use crate::outputs::ModelOutput;
use crate::strategy::Strategy;
use candle_core::Tensor;
use candle_nn::VarBuilder;
use distoseq_core::{
    build_example, select_window, CoreConfig, Mode, ProteinRecord, TrainingExample,
};
use rand::RngCore;

/// [`DistogramToSequence`] together with the data policy that feeds it.
#[derive(Debug)]
pub struct DistogramToSequenceStrategy {
    model: DistogramToSequence,
    core: CoreConfig,
}

impl DistogramToSequenceStrategy {
    pub fn load(
        vb: VarBuilder,
        core: &CoreConfig,
        config: &DistogramToSequenceConfig,
    ) -> candle_core::Result<Self> {
        Ok(Self {
            model: DistogramToSequence::load(vb, config)?,
            core: core.clone(),
        })
    }
}

impl Strategy for DistogramToSequenceStrategy {
    fn name(&self) -> &'static str {
        "DistogramToSequence"
    }

    fn vocab_size(&self) -> usize {
        self.model.config().vocab_size
    }

    fn load_inputs_and_ground_truth(
        &self,
        record: &ProteinRecord,
        mode: Mode,
        rng: &mut dyn RngCore,
    ) -> distoseq_core::Result<Option<TrainingExample>> {
        let window = select_window(record.len(), mode, &self.core.sizes, rng);
        build_example(
            record,
            window,
            &self.core,
            self.model.config().normalize_distances,
        )
    }

    fn forward(&self, inputs: &ModelInputs) -> candle_core::Result<ModelOutput> {
        self.model.forward(inputs)
    }

    fn compute_loss(
        &self,
        output: &ModelOutput,
        ground_truth: &Tensor,
    ) -> candle_core::Result<Tensor> {
        self.model.compute_loss(output, ground_truth)
    }

    fn predict(&self, inputs: &ModelInputs) -> candle_core::Result<Vec<char>> {
        self.model.predict(inputs)
    }
}

//! Training strategies.
//!
//! A strategy owns a network plus the policy that turns a record into one
//! training example. The trainer only talks to `dyn Strategy`, so adding a
//! strategy means adding a [`StrategyKind`] variant and its `build` arm.
use crate::batch::ModelInputs;
use crate::config::DistoseqConfig;
use crate::distogram_to_sequence::DistogramToSequenceStrategy;
use crate::error::TrainingError;
use crate::outputs::ModelOutput;
use candle_core::Tensor;
use candle_nn::VarBuilder;
use clap::ValueEnum;
use distoseq_core::{Mode, ProteinRecord, TrainingExample};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

pub trait Strategy: Send + Sync {
    /// Name used for checkpoint directories.
    fn name(&self) -> &'static str;

    fn vocab_size(&self) -> usize;

    /// Build the example for `record`, or `None` when the record cannot be used.
    ///
    /// `mode` picks a random window (training) or the fixed evaluation window.
    fn load_inputs_and_ground_truth(
        &self,
        record: &ProteinRecord,
        mode: Mode,
        rng: &mut dyn RngCore,
    ) -> distoseq_core::Result<Option<TrainingExample>>;

    fn forward(&self, inputs: &ModelInputs) -> candle_core::Result<ModelOutput>;

    /// Scalar loss for a batch.
    fn compute_loss(
        &self,
        output: &ModelOutput,
        ground_truth: &Tensor,
    ) -> candle_core::Result<Tensor>;

    fn predict(&self, inputs: &ModelInputs) -> candle_core::Result<Vec<char>>;
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    #[default]
    DistogramToSequence,
}

impl StrategyKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::DistogramToSequence => "DistogramToSequence",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, TrainingError> {
        Self::iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| TrainingError::UnknownStrategy(name.to_string()))
    }

    /// Create the strategy, registering its parameters in `vb`.
    pub fn build(
        &self,
        vb: VarBuilder,
        config: &DistoseqConfig,
    ) -> candle_core::Result<Box<dyn Strategy>> {
        match self {
            Self::DistogramToSequence => Ok(Box::new(DistogramToSequenceStrategy::load(
                vb,
                &config.core,
                &config.model,
            )?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};
    use candle_nn::VarMap;
    use distoseq_core::{CoreConfig, ProteinRecord};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_names_round_trip() {
        for kind in StrategyKind::iter() {
            assert_eq!(StrategyKind::from_name(kind.name()).unwrap(), kind);
        }
        assert!(matches!(
            StrategyKind::from_name("SequenceToDistogram"),
            Err(TrainingError::UnknownStrategy(_))
        ));
        let json = serde_json::to_string(&StrategyKind::DistogramToSequence).unwrap();
        assert_eq!(json, "\"distogram-to-sequence\"");
    }

    #[test]
    fn test_build_and_load_example() -> anyhow::Result<()> {
        let mut config = DistoseqConfig::default();
        config.model.hidden_size = 6;
        config.model.num_heads = 2;
        config.model.num_layers = 1;
        config.core = CoreConfig::default();
        config.core.sizes.max_training_size = 16;

        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let strategy = StrategyKind::DistogramToSequence.build(vb, &config)?;
        assert_eq!(strategy.name(), "DistogramToSequence");

        let coords = (0..12).map(|i| [3.8 * i as f32, 0.0, 0.0]).collect();
        let record = ProteinRecord::new("ACDEFGHIKLMN", Some(coords));
        let mut rng = StdRng::seed_from_u64(0);
        let example = strategy
            .load_inputs_and_ground_truth(&record, Mode::Eval, &mut rng)?
            .unwrap();
        assert_eq!(example.target_index, 11);
        assert_eq!(example.sequence.len(), 16);
        Ok(())
    }
}

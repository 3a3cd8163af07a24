//! Epoch loop with best-by-test-loss checkpointing.
//!
//! Each epoch shuffles the training records, builds batches (examples are
//! constructed in parallel, each from its own seeded generator), steps the
//! optimizer once per batch and then scores the test set with fixed windows.
//! Losses are sample weighted so a short final batch counts for what it holds.
use crate::batch::Batch;
use crate::checkpoint::{checkpoint_dir, save_checkpoint, CheckpointMetadata};
use crate::config::DistoseqConfig;
use crate::error::TrainingError;
use crate::strategy::{Strategy, StrategyKind};
use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{AdamW, Optimizer, ParamsAdamW, VarBuilder, VarMap};
use chrono::{Local, NaiveDate};
use distoseq_core::{Mode, ProteinRecord, TrainingExample};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Tracks the lowest test loss seen so far.
#[derive(Debug, Clone)]
pub struct BestLossTracker {
    best: f32,
}

impl Default for BestLossTracker {
    fn default() -> Self {
        Self {
            best: f32::INFINITY,
        }
    }
}

impl BestLossTracker {
    /// Record `loss`; true when it is a strict improvement.
    pub fn observe(&mut self, loss: f32) -> bool {
        if loss < self.best {
            self.best = loss;
            true
        } else {
            false
        }
    }

    pub fn best(&self) -> Option<f32> {
        self.best.is_finite().then_some(self.best)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EpochSummary {
    /// 1-based.
    pub epoch: usize,
    pub train_loss: f32,
    pub test_loss: f32,
    /// Weights file written after this epoch, if the test loss improved.
    pub checkpoint: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct TrainingReport {
    pub epochs: Vec<EpochSummary>,
    pub best_test_loss: Option<f32>,
    pub checkpoint_dir: Option<PathBuf>,
}

/// Scalar value of `loss`, or `NumericInstability` when it is NaN or infinite.
fn finite_loss(loss: &Tensor, epoch: usize, batch: usize) -> Result<f32> {
    let value = loss.to_scalar::<f32>()?;
    if !value.is_finite() {
        return Err(TrainingError::NumericInstability {
            epoch,
            batch,
            loss: value,
        }
        .into());
    }
    Ok(value)
}

pub struct Trainer {
    kind: StrategyKind,
    strategy: Box<dyn Strategy>,
    varmap: VarMap,
    optimizer: AdamW,
    config: DistoseqConfig,
    device: Device,
    output_dir: PathBuf,
    date: NaiveDate,
    rng: StdRng,
}

impl Trainer {
    pub fn new(
        kind: StrategyKind,
        config: DistoseqConfig,
        device: Device,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        config.validate()?;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let strategy = kind.build(vb, &config)?;

        let params = ParamsAdamW {
            lr: config.trainer.learning_rate,
            weight_decay: config.trainer.weight_decay,
            ..Default::default()
        };
        let optimizer = AdamW::new(varmap.all_vars(), params)?;

        let rng = match config.trainer.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let trainable: usize = varmap.all_vars().iter().map(|v| v.elem_count()).sum();
        info!(
            strategy = strategy.name(),
            parameters = trainable,
            device = ?device,
            "initialized trainer"
        );

        Ok(Self {
            kind,
            strategy,
            varmap,
            optimizer,
            config,
            device,
            output_dir: output_dir.into(),
            date: Local::now().date_naive(),
            rng,
        })
    }

    /// Override the date used in the checkpoint path.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    pub fn strategy(&self) -> &dyn Strategy {
        self.strategy.as_ref()
    }

    pub fn varmap(&self) -> &VarMap {
        &self.varmap
    }

    pub fn checkpoint_dir(&self) -> PathBuf {
        checkpoint_dir(&self.output_dir, self.kind, self.date)
    }

    /// Build examples for `records` in parallel, one seed per record.
    fn build_examples(
        &self,
        records: &[&ProteinRecord],
        mode: Mode,
        seeds: &[u64],
    ) -> Result<Vec<TrainingExample>> {
        let strategy = self.strategy.as_ref();
        let examples = records
            .par_iter()
            .zip(seeds.par_iter())
            .map(|(record, &seed)| {
                let mut rng = StdRng::seed_from_u64(seed);
                strategy.load_inputs_and_ground_truth(record, mode, &mut rng)
            })
            .collect::<distoseq_core::Result<Vec<_>>>()?;
        Ok(examples.into_iter().flatten().collect())
    }

    fn collate(&self, examples: &[TrainingExample]) -> Result<Batch> {
        Ok(Batch::collate(
            examples,
            self.strategy.vocab_size(),
            &self.device,
        )?)
    }

    /// One pass over `records` with optimizer steps. Returns the sample-weighted mean loss.
    pub fn train_epoch(&mut self, epoch: usize, records: &[ProteinRecord]) -> Result<f32> {
        let mut order: Vec<&ProteinRecord> = records.iter().collect();
        order.shuffle(&mut self.rng);

        let batch_size = self.config.trainer.batch_size;
        let log_every = self.config.trainer.log_every;
        let mut total_loss = 0.0f64;
        let mut total_samples = 0usize;

        for (batch_idx, chunk) in order.chunks(batch_size).enumerate() {
            let seeds: Vec<u64> = (0..chunk.len()).map(|_| self.rng.gen()).collect();
            let examples = self.build_examples(chunk, Mode::Train, &seeds)?;
            if examples.is_empty() {
                continue;
            }
            let batch = self.collate(&examples)?;
            let output = self.strategy.forward(&batch.inputs)?;
            let loss = self.strategy.compute_loss(&output, &batch.ground_truth)?;
            let value = finite_loss(&loss, epoch, batch_idx + 1)?;
            self.optimizer.backward_step(&loss)?;

            total_loss += f64::from(value) * examples.len() as f64;
            total_samples += examples.len();
            if (batch_idx + 1) % log_every == 0 {
                let running = (total_loss / total_samples as f64) as f32;
                info!(epoch, batch = batch_idx + 1, loss = running, "training");
            }
        }

        if total_samples == 0 {
            return Err(TrainingError::EmptyDataset("training").into());
        }
        Ok((total_loss / total_samples as f64) as f32)
    }

    /// Sample-weighted mean loss over `records` with evaluation windows and no updates.
    pub fn evaluate(&self, epoch: usize, records: &[ProteinRecord]) -> Result<f32> {
        let batch_size = self.config.trainer.batch_size;
        let order: Vec<&ProteinRecord> = records.iter().collect();
        let mut total_loss = 0.0f64;
        let mut total_samples = 0usize;

        for (batch_idx, chunk) in order.chunks(batch_size).enumerate() {
            // evaluation windows are fixed, the seeds are never consumed
            let seeds = vec![0u64; chunk.len()];
            let examples = self.build_examples(chunk, Mode::Eval, &seeds)?;
            if examples.is_empty() {
                continue;
            }
            let batch = self.collate(&examples)?;
            let output = self.strategy.forward(&batch.inputs)?;
            let loss = self.strategy.compute_loss(&output, &batch.ground_truth)?;
            let loss = finite_loss(&loss, epoch, batch_idx + 1)?;
            total_loss += f64::from(loss) * examples.len() as f64;
            total_samples += examples.len();
        }

        if total_samples == 0 {
            return Err(TrainingError::EmptyDataset("test").into());
        }
        Ok((total_loss / total_samples as f64) as f32)
    }

    fn save(&self, dir: &Path, epoch: usize, test_loss: f32) -> Result<PathBuf> {
        let metadata = CheckpointMetadata {
            strategy: self.kind,
            date: self.date.format("%Y%m%d").to_string(),
            epoch,
            test_loss,
            config: self.config.clone(),
        };
        save_checkpoint(&self.varmap, dir, &metadata)
    }

    /// Train for the configured number of epochs, checkpointing whenever the test loss improves.
    pub fn fit(
        &mut self,
        train: &[ProteinRecord],
        test: &[ProteinRecord],
    ) -> Result<TrainingReport> {
        if train.is_empty() {
            return Err(TrainingError::EmptyDataset("training").into());
        }
        if test.is_empty() {
            return Err(TrainingError::EmptyDataset("test").into());
        }
        info!(
            train = train.len(),
            test = test.len(),
            epochs = self.config.trainer.epochs,
            "starting training"
        );

        let dir = self.checkpoint_dir();
        let mut tracker = BestLossTracker::default();
        let mut report = TrainingReport::default();

        for epoch in 1..=self.config.trainer.epochs {
            let train_loss = self
                .train_epoch(epoch, train)
                .with_context(|| format!("training epoch {epoch}"))?;
            let test_loss = self
                .evaluate(epoch, test)
                .with_context(|| format!("evaluating epoch {epoch}"))?;
            info!(epoch, train_loss, test_loss, "epoch finished");

            let checkpoint = if tracker.observe(test_loss) {
                Some(self.save(&dir, epoch, test_loss)?)
            } else {
                debug!(epoch, test_loss, best = ?tracker.best(), "test loss did not improve");
                None
            };
            report.epochs.push(EpochSummary {
                epoch,
                train_loss,
                test_loss,
                checkpoint,
            });
        }

        report.best_test_loss = tracker.best();
        if report.best_test_loss.is_some() {
            report.checkpoint_dir = Some(dir);
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkpoint_only_on_improvement() {
        let mut tracker = BestLossTracker::default();
        let saved: Vec<bool> = [0.9, 0.7, 0.8]
            .into_iter()
            .map(|loss| tracker.observe(loss))
            .collect();
        assert_eq!(saved, vec![true, true, false]);
        assert_eq!(tracker.best(), Some(0.7));
    }

    #[test]
    fn test_equal_loss_is_not_an_improvement() {
        let mut tracker = BestLossTracker::default();
        assert_eq!(tracker.best(), None);
        assert!(tracker.observe(0.5));
        assert!(!tracker.observe(0.5));
    }

    #[test]
    fn test_non_finite_loss_never_improves() {
        let mut tracker = BestLossTracker::default();
        assert!(!tracker.observe(f32::NAN));
        assert!(tracker.observe(1.0));
        assert!(!tracker.observe(f32::NAN));
    }
}

//! Best-model checkpoints.
//!
//! Layout: `<output_dir>/models/<StrategyName>/<YYYYMMDD>/` holding
//! `best_model.safetensors` (the full `VarMap`) and `metadata.json`.
use crate::config::DistoseqConfig;
use crate::strategy::{Strategy, StrategyKind};
use anyhow::{Context, Result};
use candle_core::{DType, Device};
use candle_nn::{VarBuilder, VarMap};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const WEIGHTS_FILE: &str = "best_model.safetensors";
pub const METADATA_FILE: &str = "metadata.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    pub strategy: StrategyKind,
    /// `YYYYMMDD`, matching the directory name.
    pub date: String,
    /// 1-based epoch that produced the weights.
    pub epoch: usize,
    pub test_loss: f32,
    pub config: DistoseqConfig,
}

pub fn checkpoint_dir(output_dir: &Path, strategy: StrategyKind, date: NaiveDate) -> PathBuf {
    output_dir
        .join("models")
        .join(strategy.name())
        .join(date.format("%Y%m%d").to_string())
}

/// Write the weights and metadata into `dir`, replacing a previous checkpoint.
pub fn save_checkpoint(
    varmap: &VarMap,
    dir: &Path,
    metadata: &CheckpointMetadata,
) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let weights = dir.join(WEIGHTS_FILE);
    varmap
        .save(&weights)
        .with_context(|| format!("writing {}", weights.display()))?;
    let metadata_path = dir.join(METADATA_FILE);
    fs::write(&metadata_path, serde_json::to_string_pretty(metadata)?)
        .with_context(|| format!("writing {}", metadata_path.display()))?;
    info!(
        path = %weights.display(),
        epoch = metadata.epoch,
        test_loss = metadata.test_loss,
        "saved checkpoint"
    );
    Ok(weights)
}

pub fn read_metadata(dir: &Path) -> Result<CheckpointMetadata> {
    let path = dir.join(METADATA_FILE);
    let contents =
        fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

/// A strategy restored from disk.
pub struct LoadedCheckpoint {
    pub strategy: Box<dyn Strategy>,
    pub varmap: VarMap,
    pub metadata: CheckpointMetadata,
}

/// Rebuild the strategy recorded in `dir` and load its weights.
pub fn load_checkpoint(dir: &Path, device: &Device) -> Result<LoadedCheckpoint> {
    let metadata = read_metadata(dir)?;
    let mut varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
    let strategy = metadata.strategy.build(vb, &metadata.config)?;
    let weights = dir.join(WEIGHTS_FILE);
    varmap
        .load(&weights)
        .with_context(|| format!("loading {}", weights.display()))?;
    Ok(LoadedCheckpoint {
        strategy,
        varmap,
        metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkpoint_dir_layout() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let dir = checkpoint_dir(Path::new("/tmp/run"), StrategyKind::DistogramToSequence, date);
        assert_eq!(
            dir,
            PathBuf::from("/tmp/run/models/DistogramToSequence/20240307")
        );
    }

    #[test]
    fn test_metadata_round_trip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let metadata = CheckpointMetadata {
            strategy: StrategyKind::DistogramToSequence,
            date: "20240307".into(),
            epoch: 2,
            test_loss: 0.7,
            config: DistoseqConfig::default(),
        };
        fs::write(
            dir.path().join(METADATA_FILE),
            serde_json::to_string(&metadata)?,
        )?;
        assert_eq!(read_metadata(dir.path())?, metadata);
        Ok(())
    }
}

pub mod distogram;
pub mod reconstruct;
pub mod train;

use anyhow::{Context, Result};
use distoseq_core::{read_records, ProteinRecord};
use distoseq_models::DistoseqConfig;
use serde::Serialize;
use std::path::Path;
use tracing::info;

pub fn load_config(path: Option<&Path>) -> Result<DistoseqConfig> {
    match path {
        Some(path) => DistoseqConfig::from_file(path),
        None => Ok(DistoseqConfig::default()),
    }
}

pub fn load_records(path: &Path) -> Result<Vec<ProteinRecord>> {
    let records =
        read_records(path).with_context(|| format!("reading records from {}", path.display()))?;
    info!(count = records.len(), path = %path.display(), "loaded records");
    Ok(records)
}

pub fn write_json<T: Serialize>(output: Option<&Path>, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

pub fn rows<T: Clone>(matrix: ndarray::ArrayView2<T>) -> Vec<Vec<T>> {
    matrix.rows().into_iter().map(|row| row.to_vec()).collect()
}

use super::{load_config, load_records, rows, write_json};
use crate::cli::RecordsArgs;
use anyhow::Result;
use distoseq_core::geometry::{
    align_points, coords_to_array, distogram, reconstruct_embedding, rmsd,
};
use ndarray::arr1;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Serialize)]
struct ReconstructionEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    accession: Option<String>,
    length: usize,
    stress: f64,
    iterations: usize,
    rmsd: f64,
    /// The embedding came out as the mirror image of the input.
    mirrored: bool,
    aligned: Vec<Vec<f64>>,
}

pub fn execute(
    input: RecordsArgs,
    output: Option<PathBuf>,
    n_init: Option<usize>,
    max_iter: Option<usize>,
    seed: Option<u64>,
) -> Result<()> {
    let mut config = load_config(input.config.as_deref())?;
    let mds = &mut config.core.geometry.mds;
    if let Some(n_init) = n_init {
        mds.n_init = n_init;
    }
    if let Some(max_iter) = max_iter {
        mds.max_iter = max_iter;
    }
    if seed.is_some() {
        mds.random_seed = seed;
    }
    config.validate()?;
    let mds = &config.core.geometry.mds;

    let mut entries = Vec::new();
    for record in load_records(&input.records)? {
        if let Err(e) = record.validate() {
            warn!(record = record.label(), error = %e, "skipping record");
            continue;
        }
        let Some(coords) = record.coords.as_deref() else {
            warn!(record = record.label(), "no coordinates");
            continue;
        };
        let Some(d) = distogram(coords, config.core.sizes.max_size) else {
            warn!(record = record.label(), residues = coords.len(), "distogram undefined");
            continue;
        };

        let truth = coords_to_array(coords);
        let embedding = reconstruct_embedding(d.view(), mds)?;
        // a rotation cannot undo a reflection, so score the mirror image as well
        let mirror = &embedding.points * &arr1(&[1.0, 1.0, -1.0]);
        let direct = align_points(embedding.points.view(), truth.view())?;
        let flipped = align_points(mirror.view(), truth.view())?;
        let direct_rmsd = rmsd(direct.aligned.view(), truth.view())?;
        let flipped_rmsd = rmsd(flipped.aligned.view(), truth.view())?;
        let (fit, score, mirrored) = if flipped_rmsd < direct_rmsd {
            (flipped, flipped_rmsd, true)
        } else {
            (direct, direct_rmsd, false)
        };

        info!(record = record.label(), rmsd = score, stress = embedding.stress, "reconstructed");
        entries.push(ReconstructionEntry {
            accession: record.accession.clone(),
            length: coords.len(),
            stress: embedding.stress,
            iterations: embedding.iterations,
            rmsd: score,
            mirrored,
            aligned: rows(fit.aligned.view()),
        });
    }
    write_json(output.as_deref(), &entries)
}

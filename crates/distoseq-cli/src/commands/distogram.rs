use super::{load_config, load_records, rows, write_json};
use crate::cli::RecordsArgs;
use anyhow::Result;
use distoseq_core::geometry::{contact_map, distogram, soft_contact_map};
use serde::Serialize;
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Serialize)]
struct DistogramEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    accession: Option<String>,
    length: usize,
    distogram: Vec<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    contact_map: Option<Vec<Vec<u8>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    soft_contact_map: Option<Vec<Vec<f32>>>,
}

pub fn execute(
    input: RecordsArgs,
    output: Option<PathBuf>,
    contacts: bool,
    soft: bool,
) -> Result<()> {
    let config = load_config(input.config.as_deref())?;
    let max_size = config.core.sizes.max_size;
    let geometry = &config.core.geometry;

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
        let Some(d) = distogram(coords, max_size) else {
            warn!(
                record = record.label(),
                residues = coords.len(),
                max_size,
                "distogram undefined for this size"
            );
            continue;
        };
        entries.push(DistogramEntry {
            accession: record.accession.clone(),
            length: coords.len(),
            distogram: rows(d.view()),
            contact_map: contacts
                .then(|| contact_map(coords, max_size, geometry.contact_threshold))
                .flatten()
                .map(|m| rows(m.view())),
            soft_contact_map: soft
                .then(|| soft_contact_map(coords, max_size, geometry.soft_decay_rate))
                .flatten()
                .map(|m| rows(m.view())),
        });
    }
    write_json(output.as_deref(), &entries)
}

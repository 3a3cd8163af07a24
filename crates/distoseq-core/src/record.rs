//! Input records: a sequence with optional per-residue coordinates.
//!
//! Records arrive already extracted (one alpha-carbon per residue). A record whose
//! structure could not be fetched or parsed upstream simply has `coords: null`.
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProteinRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accession: Option<String>,
    pub sequence: String,
    #[serde(default)]
    pub coords: Option<Vec<[f32; 3]>>,
}

impl ProteinRecord {
    pub fn new(sequence: impl Into<String>, coords: Option<Vec<[f32; 3]>>) -> Self {
        Self {
            accession: None,
            sequence: sequence.into(),
            coords,
        }
    }

    pub fn len(&self) -> usize {
        self.sequence.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Label used in log messages.
    pub fn label(&self) -> &str {
        self.accession.as_deref().unwrap_or("<unnamed>")
    }

    /// Coordinates must be index-aligned with the sequence when present.
    pub fn validate(&self) -> Result<()> {
        match &self.coords {
            Some(coords) if coords.len() != self.len() => Err(CoreError::CoordinateMismatch {
                coords: coords.len(),
                residues: self.len(),
            }),
            _ => Ok(()),
        }
    }
}

/// Read records from a JSON array or from JSON Lines (one record per line).
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<ProteinRecord>> {
    let contents = fs::read_to_string(path)?;
    parse_records(&contents)
}

pub fn parse_records(contents: &str) -> Result<Vec<ProteinRecord>> {
    if contents.trim_start().starts_with('[') {
        return serde_json::from_str(contents)
            .map_err(|source| CoreError::Record { line: 1, source });
    }
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|source| CoreError::Record {
                line: idx + 1,
                source,
            })
        })
        .collect()
}

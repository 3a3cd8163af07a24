//! distoseq-test-data
//!
//! Fixture records embedded in the crate for use in tests.
//!
//! The fixtures are represented as `TestFile` objects which package the raw bytes
//! and create temporary files for programs to operate on.
use std::fs;
use tempfile::{Builder, NamedTempFile};

#[derive(Debug)]
/// Test File
///
/// Example usage:
///
/// ```ignore
/// // returns (filepath, _tempfile_handle).
/// // _handle ensures the tempfile remains in scope
/// use distoseq_test_data::TestFile;
/// let (records, _temp) = TestFile::records_small().create_temp().unwrap();
/// ```
pub struct TestFile {
    filebinary: &'static [u8],
    suffix: &'static str,
}

impl TestFile {
    /// Eight JSON Lines records: six with coordinates (15 to 40 residues, helices
    /// and strands), one without coordinates and one shorter than the default
    /// minimum size.
    pub fn records_small() -> Self {
        Self {
            filebinary: include_bytes!("../data/records/train_small.jsonl"),
            suffix: "jsonl",
        }
    }

    /// JSON array with a 3-residue right triangle and a 16-residue helix.
    pub fn structures_01() -> Self {
        Self {
            filebinary: include_bytes!("../data/records/structures.json"),
            suffix: "json",
        }
    }

    pub fn contents(&self) -> &'static str {
        std::str::from_utf8(self.filebinary).unwrap_or_default()
    }

    pub fn create_temp(&self) -> std::io::Result<(String, NamedTempFile)> {
        let temp = Builder::new()
            .suffix(&format!(".{}", self.suffix))
            .tempfile()?;

        fs::write(&temp, self.filebinary)?;
        let path = temp.path().to_string_lossy().into_owned();

        Ok((path, temp))
    }
}

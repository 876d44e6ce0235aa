//! Persisted feature table: fixed header, append-only rows.

mod csv;
mod writer;

use std::fs;
use std::path::Path;

use crate::error::{FeatureError, Result};
use crate::types::FeatureRecord;

pub use writer::{CreateMode, DatasetWriter, RecordSink};

const SCALAR_FEATURES: [&str; 8] = [
    "chroma_stft",
    "rms",
    "spectral_centroid",
    "spectral_bandwidth",
    "rolloff",
    "zero_crossing_rate",
    "harmony",
    "perceptr",
];

/// Ordered column names of a dataset, `filename` first and `label` last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<String>,
}

impl Schema {
    /// The canonical feature layout for `n_mfcc` coefficients.
    pub fn for_mfcc(n_mfcc: usize) -> Self {
        let mut columns = vec!["filename".to_string(), "length".to_string()];
        for feature in SCALAR_FEATURES {
            columns.push(format!("{}_mean", feature));
            columns.push(format!("{}_var", feature));
        }
        columns.push("tempo".to_string());
        for index in 1..=n_mfcc {
            columns.push(format!("mfcc{}_mean", index));
            columns.push(format!("mfcc{}_var", index));
        }
        columns.push("label".to_string());
        Self { columns }
    }

    pub fn from_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Columns produced by the extractor, i.e. everything but `filename`.
    pub fn feature_columns(&self) -> &[String] {
        self.columns.get(1..).unwrap_or(&[])
    }

    pub(crate) fn check_width(&self, actual: usize) -> Result<()> {
        if actual == self.len() {
            Ok(())
        } else {
            Err(FeatureError::SchemaMismatch {
                expected: self.len(),
                actual,
            })
        }
    }
}

/// A dataset read back from disk.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub schema: Schema,
    pub rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Parse every row back into a record under the stored header.
    pub fn records(&self) -> Result<Vec<FeatureRecord>> {
        self.rows
            .iter()
            .map(|row| FeatureRecord::from_row(&self.schema, row))
            .collect()
    }
}

/// Load a dataset written by [`DatasetWriter`].
pub fn read_dataset(path: &Path) -> Result<Dataset> {
    let text = fs::read_to_string(path).map_err(|err| FeatureError::io(path, err))?;
    let mut rows = csv::parse_rows(&text).into_iter();
    let header = rows.next().ok_or_else(|| {
        FeatureError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "dataset has no header"),
        )
    })?;
    Ok(Dataset {
        schema: Schema::from_columns(header),
        rows: rows.collect(),
    })
}

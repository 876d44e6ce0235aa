//! Core types for the feature extraction pipeline

use crate::dataset::Schema;
use crate::error::{FeatureError, Result};

/// Raw audio data representation (mono, f32 samples)
#[derive(Debug, Clone)]
pub struct AudioData {
    /// Audio samples, normalized to [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate in Hz (e.g., 22050)
    pub sample_rate: u32,
}

impl AudioData {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Mean and population variance of one frame-wise feature.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeanVar {
    pub mean: f64,
    pub var: f64,
}

/// One dataset row: file name, numeric features in column order, label.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    pub filename: String,
    pub values: Vec<f64>,
    pub label: String,
}

impl FeatureRecord {
    /// Number of cells the record occupies in a row.
    pub fn width(&self) -> usize {
        self.values.len() + 2
    }

    /// Render the record as the text cells of one row.
    pub fn to_cells(&self) -> Vec<String> {
        let mut cells = Vec::with_capacity(self.width());
        cells.push(self.filename.clone());
        cells.extend(self.values.iter().map(|value| format_value(*value)));
        cells.push(self.label.clone());
        cells
    }

    /// Parse a row previously written under `schema`.
    pub fn from_row(schema: &Schema, row: &[String]) -> Result<Self> {
        if row.len() != schema.len() {
            return Err(FeatureError::SchemaMismatch {
                expected: schema.len(),
                actual: row.len(),
            });
        }
        let last = row.len() - 1;
        let values = row[1..last]
            .iter()
            .zip(&schema.columns()[1..last])
            .map(|(cell, column)| {
                cell.trim().parse::<f64>().map_err(|err| {
                    FeatureError::computation(format!(
                        "column {} holds non-numeric value '{}': {}",
                        column, cell, err
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            filename: row[0].clone(),
            values,
            label: row[last].clone(),
        })
    }
}

fn format_value(value: f64) -> String {
    if value.is_finite() {
        format!("{}", value)
    } else if value.is_nan() {
        "NaN".to_string()
    } else if value > 0.0 {
        "inf".to_string()
    } else {
        "-inf".to_string()
    }
}

use aus::analysis;
use aus::analysis::mel::MelFilterbank;
use ndarray::Array2;

use crate::error::{FeatureError, Result};

pub(crate) const MEL_BANDS: usize = 128;
const MIN_FREQ: f64 = 0.0;
const AMIN: f64 = 1e-10;
const TOP_DB: f64 = 80.0;

pub(crate) struct MelBundle {
    /// Mel power spectrogram, `[frame, band]`.
    pub mel: Vec<Vec<f64>>,
    /// Power spectrogram, `[frame, bin]`.
    pub power: Array2<f64>,
}

pub(crate) fn compute_mel(
    magnitude: &Array2<f64>,
    freqs: &[f64],
    sample_rate: u32,
) -> Result<MelBundle> {
    let magnitude_rows = rows_of(magnitude);
    let power_rows = analysis::make_power_spectrogram(&magnitude_rows);
    let filterbank = MelFilterbank::new(
        MIN_FREQ,
        (sample_rate as f64) / 2.0,
        MEL_BANDS,
        &freqs.to_vec(),
        true,
    );
    let mel = analysis::mel::make_mel_spectrogram(&power_rows, &filterbank);
    if mel.is_empty() {
        return Err(FeatureError::computation("mel spectrogram has no frames"));
    }
    let power = array_from_rows(&power_rows)?;
    Ok(MelBundle { mel, power })
}

/// MFCCs as `[frame, coefficient]`.
pub(crate) fn mfcc(mel: &[Vec<f64>], n_mfcc: usize) -> Result<Array2<f64>> {
    // floor the mel energies so silent frames keep a finite log
    let floored: Vec<Vec<f64>> = mel
        .iter()
        .map(|frame| frame.iter().map(|v| v.max(AMIN)).collect())
        .collect();
    let coefficients = analysis::mel::mfcc_spectrogram(&floored, n_mfcc, None);
    array_from_rows(&coefficients)
}

/// Log-scaled mel spectrogram in dB, clipped `TOP_DB` below its peak.
pub(crate) fn mel_db(mel: &[Vec<f64>]) -> Result<Array2<f64>> {
    let mut db = array_from_rows(mel)?.mapv(|v| 10.0 * v.max(AMIN).log10());
    let peak = db.fold(f64::NEG_INFINITY, |acc, v| acc.max(*v));
    db.mapv_inplace(|v| v.max(peak - TOP_DB));
    Ok(db)
}

fn rows_of(matrix: &Array2<f64>) -> Vec<Vec<f64>> {
    matrix.outer_iter().map(|row| row.to_vec()).collect()
}

fn array_from_rows(data: &[Vec<f64>]) -> Result<Array2<f64>> {
    let rows = data.len();
    let cols = data.first().map(Vec::len).unwrap_or(0);
    let flat: Vec<f64> = data.iter().flat_map(|row| row.iter().copied()).collect();
    Array2::from_shape_vec((rows, cols), flat)
        .map_err(|err| FeatureError::computation(format!("ragged feature matrix: {}", err)))
}

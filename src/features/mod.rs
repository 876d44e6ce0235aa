//! Turns one audio file into one fixed-layout feature record.
//!
//! Every frame-wise transform shares the same centred STFT framing
//! (`N_FFT` window, `HOP_LENGTH` hop) at `TARGET_SAMPLE_RATE`, so the
//! reductions below all run over the same time axis.

mod hpss;
mod mel;
mod spectral;
mod statistics;
mod stft;
mod tempo;

use std::path::Path;

use aus::spectrum;
use ndarray::{Array1, Axis};
use tracing::debug;

use crate::audio::{decoder, resample};
use crate::config::ExtractorConfig;
use crate::error::{FeatureError, Result};
use crate::types::{AudioData, FeatureRecord, MeanVar};

use statistics::{column_mean_var, ensure_finite, mean_var};
pub use stft::{HOP_LENGTH, N_FFT};

/// Analysis rate; every clip is brought to it before feature extraction.
pub const TARGET_SAMPLE_RATE: u32 = 22_050;

/// Summary statistics for one clip, in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSummary {
    pub length: usize,
    pub chroma_stft: MeanVar,
    pub rms: MeanVar,
    pub spectral_centroid: MeanVar,
    pub spectral_bandwidth: MeanVar,
    pub rolloff: MeanVar,
    pub zero_crossing_rate: MeanVar,
    pub harmony: MeanVar,
    pub percussive: MeanVar,
    pub tempo: f64,
    pub mfcc: Vec<MeanVar>,
    /// Mean chroma per pitch class, C first.
    pub chroma_profile: [f64; 12],
}

impl FeatureSummary {
    /// Numeric values in dataset column order (between filename and label).
    pub fn values(&self) -> Vec<f64> {
        let mut values = Vec::with_capacity(18 + 2 * self.mfcc.len());
        values.push(self.length as f64);
        for stat in [
            self.chroma_stft,
            self.rms,
            self.spectral_centroid,
            self.spectral_bandwidth,
            self.rolloff,
            self.zero_crossing_rate,
            self.harmony,
            self.percussive,
        ] {
            values.push(stat.mean);
            values.push(stat.var);
        }
        values.push(self.tempo);
        for coefficient in &self.mfcc {
            values.push(coefficient.mean);
            values.push(coefficient.var);
        }
        values
    }

    /// Index of the strongest pitch class (0 = C ... 9 = A ... 11 = B).
    pub fn dominant_pitch_class(&self) -> usize {
        self.chroma_profile
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (idx, &value)| {
                if value > best.1 {
                    (idx, value)
                } else {
                    best
                }
            })
            .0
    }
}

/// Stateless mapping from audio to feature records.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    config: ExtractorConfig,
}

impl FeatureExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Decode `path` and build its dataset record.
    pub fn extract(&self, path: &Path) -> Result<FeatureRecord> {
        let audio = decoder::decode_audio(path)
            .map_err(|err| FeatureError::decode(path, format!("{:#}", err)))?;
        let seconds = audio.duration_secs();
        let summary = self.analyze(audio)?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        debug!(
            file = %path.display(),
            seconds,
            tempo = summary.tempo,
            "extracted features"
        );
        Ok(FeatureRecord {
            filename,
            values: summary.values(),
            label: self.config.label.clone(),
        })
    }

    /// Compute every summary statistic for an already decoded clip.
    pub fn analyze(&self, audio: AudioData) -> Result<FeatureSummary> {
        let audio = resample::to_rate(audio, TARGET_SAMPLE_RATE)
            .map_err(|err| FeatureError::computation(format!("{:#}", err)))?;
        let samples = &audio.samples;

        let spectrogram = stft::stft(samples)?;
        let magnitude = spectrogram.magnitude();
        let freqs: Vec<f64> = spectrum::rfftfreq(N_FFT, TARGET_SAMPLE_RATE);
        if freqs.len() != magnitude.ncols() {
            return Err(FeatureError::computation(format!(
                "frequency axis has {} bins, spectrum has {}",
                freqs.len(),
                magnitude.ncols()
            )));
        }

        let mel = mel::compute_mel(&magnitude, &freqs, TARGET_SAMPLE_RATE)?;
        let chroma = spectral::chroma(&mel.power, &freqs);
        let mfcc = mel::mfcc(&mel.mel, self.config.n_mfcc)?;
        ensure_finite(&mfcc, "mfcc")?;
        if mfcc.ncols() != self.config.n_mfcc {
            return Err(FeatureError::computation(format!(
                "expected {} MFCCs per frame, got {}",
                self.config.n_mfcc,
                mfcc.ncols()
            )));
        }

        let envelope = tempo::onset_envelope(&mel::mel_db(&mel.mel)?);
        let frame_rate = TARGET_SAMPLE_RATE as f64 / HOP_LENGTH as f64;
        let tempo = tempo::estimate_tempo(&envelope, frame_rate);

        let split = hpss::separate(&spectrogram, &magnitude, samples.len());

        let chroma_means = chroma
            .mean_axis(Axis(0))
            .ok_or_else(|| FeatureError::computation("chroma produced no frames"))?;
        let mut chroma_profile = [0.0; 12];
        for (slot, value) in chroma_profile.iter_mut().zip(chroma_means.iter()) {
            *slot = *value;
        }

        Ok(FeatureSummary {
            length: samples.len(),
            chroma_stft: mean_var(&chroma, "chroma")?,
            rms: mean_var(&spectral::rms(samples), "rms")?,
            spectral_centroid: mean_var(
                &spectral::spectral_centroid(&magnitude, &freqs),
                "spectral centroid",
            )?,
            spectral_bandwidth: mean_var(
                &spectral::spectral_bandwidth(&magnitude, &freqs),
                "spectral bandwidth",
            )?,
            rolloff: mean_var(&spectral::spectral_rolloff(&magnitude, &freqs), "rolloff")?,
            zero_crossing_rate: mean_var(
                &spectral::zero_crossing_rate(samples),
                "zero crossing rate",
            )?,
            harmony: mean_var(&Array1::from(split.harmonic), "harmonic component")?,
            percussive: mean_var(&Array1::from(split.percussive), "percussive component")?,
            tempo,
            mfcc: column_mean_var(&mfcc, "mfcc")?,
            chroma_profile,
        })
    }
}

use ndarray::{Array1, Array2, ArrayView1, Axis};

use super::stft::{centre_pad, frame_count, HOP_LENGTH, N_FFT};

pub(crate) const PITCH_CLASSES: usize = 12;
const ROLL_PERCENT: f64 = 0.85;
const MIN_CHROMA_FREQ: f64 = 32.70; // C1
const ZERO_THRESHOLD: f32 = 1e-10;
const EPSILON: f64 = 1e-12;

/// Per-frame energy folded onto the twelve pitch classes (C = 0 ... B = 11),
/// each frame scaled so its strongest class is 1.
pub(crate) fn chroma(power: &Array2<f64>, freqs: &[f64]) -> Array2<f64> {
    let classes: Vec<Option<usize>> = freqs.iter().map(|&f| pitch_class(f)).collect();
    let mut chroma = Array2::zeros((power.nrows(), PITCH_CLASSES));
    for (frame, mut out) in power.outer_iter().zip(chroma.outer_iter_mut()) {
        for (energy, class) in frame.iter().zip(&classes) {
            if let Some(class) = class {
                out[*class] += *energy;
            }
        }
        let peak = out.fold(0.0_f64, |acc, v| acc.max(*v));
        if peak > EPSILON {
            out.mapv_inplace(|v| v / peak);
        }
    }
    chroma
}

fn pitch_class(freq: f64) -> Option<usize> {
    if freq < MIN_CHROMA_FREQ {
        return None;
    }
    // semitones relative to A4, then shifted so C sits at index 0
    let semitones = (12.0 * (freq / 440.0).log2()).round() as i64;
    Some((semitones + 9).rem_euclid(PITCH_CLASSES as i64) as usize)
}

/// Root-mean-square energy of each centred frame.
pub(crate) fn rms(samples: &[f32]) -> Array1<f64> {
    let padded = centre_pad(samples);
    let frames = frame_count(samples.len());
    Array1::from_shape_fn(frames, |t| {
        let start = t * HOP_LENGTH;
        let sum: f64 = padded[start..start + N_FFT].iter().map(|x| x * x).sum();
        (sum / N_FFT as f64).sqrt()
    })
}

/// Fraction of sign changes per frame; the signal is edge-padded.
pub(crate) fn zero_crossing_rate(samples: &[f32]) -> Array1<f64> {
    let pad = N_FFT / 2;
    let first = samples.first().copied().unwrap_or(0.0);
    let last = samples.last().copied().unwrap_or(0.0);
    let signs: Vec<bool> = std::iter::repeat(first)
        .take(pad)
        .chain(samples.iter().copied())
        .chain(std::iter::repeat(last).take(pad))
        .map(|x| if x.abs() <= ZERO_THRESHOLD { false } else { x < 0.0 })
        .collect();
    let frames = frame_count(samples.len());
    Array1::from_shape_fn(frames, |t| {
        let frame = &signs[t * HOP_LENGTH..t * HOP_LENGTH + N_FFT];
        let crossings = frame.windows(2).filter(|pair| pair[0] != pair[1]).count();
        crossings as f64 / N_FFT as f64
    })
}

/// Magnitude-weighted mean frequency per frame.
pub(crate) fn spectral_centroid(magnitude: &Array2<f64>, freqs: &[f64]) -> Array1<f64> {
    magnitude.map_axis(Axis(1), |frame| centroid_of(frame, freqs))
}

/// Second-order spread around the centroid per frame.
pub(crate) fn spectral_bandwidth(magnitude: &Array2<f64>, freqs: &[f64]) -> Array1<f64> {
    magnitude.map_axis(Axis(1), |frame| {
        let total = frame.sum();
        if total <= EPSILON {
            return 0.0;
        }
        let centroid = centroid_of(frame, freqs);
        let spread: f64 = frame
            .iter()
            .zip(freqs)
            .map(|(m, f)| (m / total) * (f - centroid).powi(2))
            .sum();
        spread.sqrt()
    })
}

/// Frequency below which `ROLL_PERCENT` of each frame's energy lies.
pub(crate) fn spectral_rolloff(magnitude: &Array2<f64>, freqs: &[f64]) -> Array1<f64> {
    magnitude.map_axis(Axis(1), |frame| {
        let threshold = ROLL_PERCENT * frame.sum();
        let mut cumulative = 0.0;
        for (m, f) in frame.iter().zip(freqs) {
            cumulative += m;
            if cumulative >= threshold {
                return *f;
            }
        }
        freqs.last().copied().unwrap_or(0.0)
    })
}

fn centroid_of(frame: ArrayView1<f64>, freqs: &[f64]) -> f64 {
    let total = frame.sum();
    if total <= EPSILON {
        return 0.0;
    }
    frame.iter().zip(freqs).map(|(m, f)| m * f).sum::<f64>() / total
}

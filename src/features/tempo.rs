use ndarray::{Array1, Array2, Axis};

const START_BPM: f64 = 120.0;
const PRIOR_STD_OCTAVES: f64 = 1.0;
const MAX_BPM: f64 = 320.0;
const AUTOCORR_SECONDS: f64 = 8.0;
const EPSILON: f64 = 1e-10;
/// Frames averaged around each onset so beats falling between frames still line up.
const SMOOTHING_FRAMES: usize = 3;

/// Onset strength per frame: mean positive first difference of the dB
/// mel spectrogram across bands. Frame 0 has no predecessor and is zero.
pub(crate) fn onset_envelope(mel_db: &Array2<f64>) -> Array1<f64> {
    let frames = mel_db.nrows();
    let mut envelope = Array1::zeros(frames);
    for t in 1..frames {
        let current = mel_db.index_axis(Axis(0), t);
        let previous = mel_db.index_axis(Axis(0), t - 1);
        let flux: f64 = current
            .iter()
            .zip(previous.iter())
            .map(|(c, p)| (c - p).max(0.0))
            .sum();
        envelope[t] = flux / mel_db.ncols().max(1) as f64;
    }
    envelope
}

/// Estimate beats per minute from an onset envelope sampled at
/// `frame_rate` frames per second.
///
/// Autocorrelation peaks are weighted by a log-normal prior centred on
/// `START_BPM`; an envelope without rhythmic energy yields the prior centre.
pub(crate) fn estimate_tempo(envelope: &Array1<f64>, frame_rate: f64) -> f64 {
    let max_lag = ((AUTOCORR_SECONDS * frame_rate).round() as usize).min(envelope.len());
    let min_lag = ((60.0 * frame_rate / MAX_BPM).ceil() as usize).max(1);
    if max_lag <= min_lag {
        return START_BPM;
    }

    let smoothed = smooth(envelope, SMOOTHING_FRAMES);
    let mean = smoothed.mean().unwrap_or(0.0);
    let centred: Vec<f64> = smoothed.iter().map(|v| v - mean).collect();

    let mut best: Option<(f64, f64)> = None;
    for lag in min_lag..max_lag {
        let correlation: f64 = centred
            .iter()
            .zip(&centred[lag..])
            .map(|(a, b)| a * b)
            .sum();
        if correlation <= EPSILON {
            continue;
        }
        let bpm = 60.0 * frame_rate / lag as f64;
        let score = correlation * log_normal_prior(bpm);
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((bpm, score));
        }
    }

    best.map(|(bpm, _)| bpm).unwrap_or(START_BPM)
}

/// Centred moving average; the window shrinks at the edges.
fn smooth(values: &Array1<f64>, window: usize) -> Array1<f64> {
    if values.is_empty() || window < 2 {
        return values.clone();
    }
    let radius = window / 2;
    Array1::from_shape_fn(values.len(), |idx| {
        let start = idx.saturating_sub(radius);
        let end = (idx + radius + 1).min(values.len());
        values.slice(ndarray::s![start..end]).sum() / (end - start) as f64
    })
}

fn log_normal_prior(bpm: f64) -> f64 {
    let octaves = (bpm.log2() - START_BPM.log2()) / PRIOR_STD_OCTAVES;
    (-0.5 * octaves * octaves).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME_RATE: f64 = 22_050.0 / 512.0;

    fn click_track(bpm: f64, seconds: f64) -> Array1<f64> {
        let frames = (seconds * FRAME_RATE) as usize;
        let period = 60.0 * FRAME_RATE / bpm;
        Array1::from_shape_fn(frames, |t| {
            let phase = t as f64 % period;
            if phase < 1.0 {
                1.0
            } else {
                0.0
            }
        })
    }

    #[test]
    fn recovers_click_tempo() {
        let tempo = estimate_tempo(&click_track(120.0, 20.0), FRAME_RATE);
        assert!((tempo - 120.0).abs() < 5.0, "tempo {}", tempo);
    }

    #[test]
    fn recovers_off_grid_click_tempo() {
        // 140 BPM is 18.46 frames per beat, so single-frame clicks drift across frames
        let tempo = estimate_tempo(&click_track(140.0, 20.0), FRAME_RATE);
        assert!((tempo - 140.0).abs() < 5.0, "tempo {}", tempo);
    }

    #[test]
    fn smoothing_spreads_a_single_onset() {
        let spike = ndarray::array![0.0, 0.0, 3.0, 0.0, 0.0];
        assert_eq!(smooth(&spike, 3).to_vec(), vec![0.0, 1.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn flat_envelope_falls_back_to_prior_centre() {
        let flat = Array1::zeros(400);
        assert_eq!(estimate_tempo(&flat, FRAME_RATE), START_BPM);
    }

    #[test]
    fn onset_envelope_ignores_decreases() {
        let mel_db = ndarray::array![[0.0, 0.0], [10.0, -10.0], [0.0, 0.0]];
        let envelope = onset_envelope(&mel_db);
        assert_eq!(envelope.to_vec(), vec![0.0, 5.0, 5.0]);
    }
}

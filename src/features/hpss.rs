use ndarray::{Array2, Axis, Zip};

use super::stft::{istft, Spectrogram};

const KERNEL: usize = 31;
const MASK_POWER: i32 = 2;
const TINY: f64 = 1e-12;

pub(crate) struct HarmonicPercussive {
    pub harmonic: Vec<f64>,
    pub percussive: Vec<f64>,
}

/// Median-filtering harmonic/percussive separation with soft masks,
/// resynthesised back to `length` time-domain samples.
pub(crate) fn separate(
    spectrum: &Spectrogram,
    magnitude: &Array2<f64>,
    length: usize,
) -> HarmonicPercussive {
    // harmonic energy is smooth across time, percussive across frequency
    let harmonic_env = median_filter(magnitude, Axis(0));
    let percussive_env = median_filter(magnitude, Axis(1));

    let mut harmonic_mask = Array2::<f64>::zeros(magnitude.raw_dim());
    Zip::from(&mut harmonic_mask)
        .and(&harmonic_env)
        .and(&percussive_env)
        .for_each(|mask, &h, &p| {
            let h = h.powi(MASK_POWER);
            let p = p.powi(MASK_POWER);
            let total = h + p;
            *mask = if total > TINY { h / total } else { 0.0 };
        });

    let harmonic = Spectrogram {
        bins: Zip::from(&spectrum.bins)
            .and(&harmonic_mask)
            .map_collect(|&bin, &mask| bin * mask),
    };
    let percussive = Spectrogram {
        bins: Zip::from(&spectrum.bins)
            .and(&harmonic_mask)
            .map_collect(|&bin, &mask| bin * (1.0 - mask)),
    };

    HarmonicPercussive {
        harmonic: istft(&harmonic, length),
        percussive: istft(&percussive, length),
    }
}

/// Sliding median of width `KERNEL` along `axis`, clamping at the edges.
fn median_filter(input: &Array2<f64>, axis: Axis) -> Array2<f64> {
    let mut output = Array2::zeros(input.raw_dim());
    let half = KERNEL / 2;
    let mut scratch = Vec::with_capacity(KERNEL);
    for (lane_in, mut lane_out) in input.lanes(axis).into_iter().zip(output.lanes_mut(axis)) {
        let len = lane_in.len();
        for i in 0..len {
            scratch.clear();
            for offset in 0..KERNEL {
                let idx = (i + offset).saturating_sub(half).min(len - 1);
                scratch.push(lane_in[idx]);
            }
            let mid = scratch.len() / 2;
            let (_, median, _) = scratch.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
            lane_out[i] = *median;
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn median_filter_removes_isolated_spike_along_time() {
        let mut input = Array2::from_elem((40, 3), 1.0);
        input[[20, 1]] = 50.0;
        let smoothed = median_filter(&input, Axis(0));
        assert_eq!(smoothed[[20, 1]], 1.0);
    }

    #[test]
    fn median_filter_keeps_constant_lanes() {
        let input = Array2::from_shape_fn((5, 40), |(row, _)| row as f64);
        let smoothed = median_filter(&input, Axis(1));
        assert_eq!(smoothed, input);
    }
}

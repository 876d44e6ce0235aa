use aus::{generate_window, WindowType};
use ndarray::Array2;
use rustfft::{num_complex::Complex, FftPlanner};

use crate::error::{FeatureError, Result};

pub const N_FFT: usize = 2048;
pub const HOP_LENGTH: usize = 512;

/// Complex short-time spectrum laid out as `[frame, bin]`.
pub(crate) struct Spectrogram {
    pub bins: Array2<Complex<f64>>,
}

impl Spectrogram {
    pub fn frame_count(&self) -> usize {
        self.bins.nrows()
    }

    pub fn magnitude(&self) -> Array2<f64> {
        self.bins.mapv(|c| c.norm())
    }
}

/// Periodic Hann window of `size` samples.
pub(crate) fn hann_window(size: usize) -> Vec<f64> {
    // aus builds the symmetric form; one extra point then dropped makes it periodic
    let mut window = generate_window(WindowType::Hanning, size + 1);
    window.truncate(size);
    window
}

/// Number of centred frames produced for `len` samples.
pub(crate) fn frame_count(len: usize) -> usize {
    1 + len / HOP_LENGTH
}

/// Zero-pad by half a window on each side so frame `t` is centred on
/// sample `t * HOP_LENGTH`.
pub(crate) fn centre_pad(samples: &[f32]) -> Vec<f64> {
    let pad = N_FFT / 2;
    let mut padded = vec![0.0; samples.len() + 2 * pad];
    for (dst, &src) in padded[pad..pad + samples.len()].iter_mut().zip(samples) {
        *dst = src as f64;
    }
    padded
}

pub(crate) fn stft(samples: &[f32]) -> Result<Spectrogram> {
    if samples.len() < N_FFT {
        return Err(FeatureError::computation(format!(
            "clip of {} samples is shorter than the {}-sample analysis window",
            samples.len(),
            N_FFT
        )));
    }
    let padded = centre_pad(samples);
    let window = hann_window(N_FFT);
    let frames = frame_count(samples.len());
    let bins = N_FFT / 2 + 1;

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(N_FFT);
    let mut buffer = vec![Complex::new(0.0, 0.0); N_FFT];
    let mut spectrum = Array2::from_elem((frames, bins), Complex::new(0.0, 0.0));

    for (t, mut row) in spectrum.outer_iter_mut().enumerate() {
        let start = t * HOP_LENGTH;
        for (i, slot) in buffer.iter_mut().enumerate() {
            *slot = Complex::new(padded[start + i] * window[i], 0.0);
        }
        fft.process(&mut buffer);
        for (dst, src) in row.iter_mut().zip(&buffer[..bins]) {
            *dst = *src;
        }
    }

    Ok(Spectrogram { bins: spectrum })
}

/// Weighted overlap-add inverse of [`stft`], trimmed to `length` samples.
pub(crate) fn istft(spectrum: &Spectrogram, length: usize) -> Vec<f64> {
    let frames = spectrum.frame_count();
    let bins = N_FFT / 2 + 1;
    let window = hann_window(N_FFT);
    let padded_len = N_FFT + HOP_LENGTH * frames.saturating_sub(1);

    let mut planner = FftPlanner::<f64>::new();
    let ifft = planner.plan_fft_inverse(N_FFT);
    let mut buffer = vec![Complex::new(0.0, 0.0); N_FFT];
    let mut output = vec![0.0; padded_len];
    let mut norm = vec![0.0; padded_len];

    for (t, row) in spectrum.bins.outer_iter().enumerate() {
        for (k, value) in row.iter().enumerate() {
            buffer[k] = *value;
        }
        // rebuild the conjugate-symmetric upper half
        for k in bins..N_FFT {
            buffer[k] = row[N_FFT - k].conj();
        }
        ifft.process(&mut buffer);
        let start = t * HOP_LENGTH;
        for i in 0..N_FFT {
            let w = window[i];
            output[start + i] += buffer[i].re / N_FFT as f64 * w;
            norm[start + i] += w * w;
        }
    }

    let pad = N_FFT / 2;
    (0..length)
        .map(|i| {
            let idx = i + pad;
            match (output.get(idx), norm.get(idx)) {
                (Some(&value), Some(&weight)) if weight > 1e-10 => value / weight,
                (Some(&value), Some(_)) => value,
                _ => 0.0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / 22_050.0).sin())
            .collect()
    }

    #[test]
    fn frame_layout_is_centred() {
        let samples = sine(440.0, 22_050);
        let spectrum = stft(&samples).unwrap();
        assert_eq!(spectrum.frame_count(), 1 + 22_050 / HOP_LENGTH);
        assert_eq!(spectrum.bins.ncols(), N_FFT / 2 + 1);
    }

    #[test]
    fn inverse_reconstructs_signal() {
        let samples = sine(440.0, 8_192);
        let spectrum = stft(&samples).unwrap();
        let rebuilt = istft(&spectrum, samples.len());
        assert_eq!(rebuilt.len(), samples.len());
        for (a, b) in samples.iter().zip(&rebuilt).skip(100).take(7_900) {
            assert!((*a as f64 - b).abs() < 1e-6);
        }
    }

    #[test]
    fn window_is_periodic_hann() {
        let window = hann_window(N_FFT);
        assert_eq!(window.len(), N_FFT);
        assert!(window[0].abs() < 1e-12);
        assert!((window[N_FFT / 2] - 1.0).abs() < 1e-12);
        assert!((window[1] - window[N_FFT - 1]).abs() < 1e-12);
    }

    #[test]
    fn short_clip_is_rejected() {
        assert!(stft(&[0.0; 100]).is_err());
    }
}

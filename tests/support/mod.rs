//! WAV fixtures synthesised on the fly.
#![allow(dead_code)]

use std::f32::consts::PI;
use std::fs;
use std::path::{Path, PathBuf};

pub const SAMPLE_RATE: u32 = 22_050;

pub fn sine_wave(frequency: f32, duration_secs: f32, sample_rate: u32) -> Vec<f32> {
    let total_samples = (sample_rate as f32 * duration_secs) as usize;
    (0..total_samples)
        .map(|index| {
            let t = index as f32 / sample_rate as f32;
            0.5 * (2.0 * PI * frequency * t).sin()
        })
        .collect()
}

pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32, channels: u16) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .unwrap_or_else(|err| panic!("failed to create {:?}: {}", path, err));
    for &sample in samples {
        let pcm = (sample * i16::MAX as f32) as i16;
        for _ in 0..channels {
            writer.write_sample(pcm).expect("write sample");
        }
    }
    writer.finalize().expect("finalize wav");
}

/// Two seconds of silence.
pub fn silent_clip(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    write_wav(&path, &vec![0.0; 2 * SAMPLE_RATE as usize], SAMPLE_RATE, 1);
    path
}

/// Two seconds of a pure tone.
pub fn tone_clip(dir: &Path, name: &str, frequency: f32) -> PathBuf {
    let path = dir.join(name);
    write_wav(&path, &sine_wave(frequency, 2.0, SAMPLE_RATE), SAMPLE_RATE, 1);
    path
}

/// Bytes that no decoder accepts, under an audio extension.
pub fn corrupt_clip(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"this is not audio at all, just text pretending").expect("write corrupt");
    path
}

//! Fetch found videos and keep their audio as mono 16-bit PCM WAV files.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{info, warn};

use crate::audio::{decoder, encoder};
use crate::config::DownloadConfig;
use crate::error::{FeatureError, Result};

/// Retrieves one video to (roughly) `destination`, returning where it landed.
pub trait VideoFetcher {
    fn fetch(&self, link: &str, destination: &Path) -> Result<PathBuf>;
}

/// `VideoFetcher` backed by the `yt-dlp` command-line tool.
pub struct YtDlp {
    program: PathBuf,
    max_height: u32,
}

impl YtDlp {
    pub fn new(config: &DownloadConfig) -> Self {
        Self {
            program: config.ytdlp.clone(),
            max_height: config.max_height,
        }
    }
}

impl VideoFetcher for YtDlp {
    fn fetch(&self, link: &str, destination: &Path) -> Result<PathBuf> {
        let format = format!(
            "best[height<={h}][ext=mp4]/best[height<={h}]",
            h = self.max_height
        );
        let output = Command::new(&self.program)
            .arg("--no-playlist")
            .arg("--quiet")
            .args(["-f", format.as_str()])
            .arg("-o")
            .arg(destination)
            .arg(link)
            .output()
            .map_err(|err| {
                FeatureError::Download(format!(
                    "failed to run {}: {}",
                    self.program.display(),
                    err
                ))
            })?;
        if !output.status.success() {
            return Err(FeatureError::Download(format!(
                "{} exited with {} for {}: {}",
                self.program.display(),
                output.status,
                link,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(destination.to_path_buf())
    }
}

/// Decode any audio-bearing file and rewrite it as mono PCM WAV.
pub fn convert_to_mono_wav(source: &Path, destination: &Path) -> Result<()> {
    let audio = decoder::decode_audio(source)
        .map_err(|err| FeatureError::decode(source, format!("{:#}", err)))?;
    encoder::encode_audio(&audio, destination)
        .map_err(|err| FeatureError::Download(format!("{:#}", err)))
}

#[derive(Debug, Default)]
pub struct DownloadReport {
    pub converted: Vec<PathBuf>,
    pub failures: Vec<(String, FeatureError)>,
}

pub struct Downloader<F> {
    fetcher: F,
    config: DownloadConfig,
}

impl<F: VideoFetcher> Downloader<F> {
    pub fn new(fetcher: F, config: DownloadConfig) -> Self {
        Self { fetcher, config }
    }

    /// Download and convert every link; one bad link does not stop the rest.
    pub fn download_all(&self, links: &[String]) -> Result<DownloadReport> {
        let video_dir = self.config.video_dir();
        let audio_dir = self.config.audio_dir();
        for dir in [&video_dir, &audio_dir] {
            fs::create_dir_all(dir).map_err(|err| FeatureError::io(dir, err))?;
        }

        let mut report = DownloadReport::default();
        for (index, link) in links.iter().enumerate() {
            let video_path = video_dir.join(format!("video_{}.mp4", index));
            let audio_path = audio_dir.join(format!("audio_{}.wav", index));
            let outcome = self
                .fetcher
                .fetch(link, &video_path)
                .and_then(|fetched| convert_to_mono_wav(&fetched, &audio_path));
            match outcome {
                Ok(()) => {
                    info!(index, link = %link, "downloaded and converted video");
                    report.converted.push(audio_path);
                }
                Err(err) => {
                    warn!(index, link = %link, error = %err, "failed to download video");
                    report.failures.push((link.clone(), err));
                }
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Writes a short stereo WAV instead of talking to the network.
    struct FakeFetcher;

    impl VideoFetcher for FakeFetcher {
        fn fetch(&self, link: &str, destination: &Path) -> Result<PathBuf> {
            if link.contains("broken") {
                return Err(FeatureError::Download("video unavailable".to_string()));
            }
            let path = destination.with_extension("wav");
            let spec = hound::WavSpec {
                channels: 2,
                sample_rate: 22_050,
                bits_per_sample: 16,
                sample_format: hound::SampleFormat::Int,
            };
            let mut writer = hound::WavWriter::create(&path, spec).unwrap();
            for _ in 0..1_000 {
                writer.write_sample(8_000i16).unwrap();
                writer.write_sample(0i16).unwrap();
            }
            writer.finalize().unwrap();
            Ok(path)
        }
    }

    #[test]
    fn converts_good_links_and_reports_bad_ones() {
        let dir = tempfile::tempdir().unwrap();
        let config = DownloadConfig::new(dir.path(), None).unwrap();
        let downloader = Downloader::new(FakeFetcher, config);
        let links = vec![
            "https://www.youtube.com/watch?v=ok".to_string(),
            "https://www.youtube.com/watch?v=broken".to_string(),
        ];

        let report = downloader.download_all(&links).unwrap();
        assert_eq!(report.converted.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert!(report.converted[0].ends_with("wav/audio_0.wav"));

        let reader = hound::WavReader::open(&report.converted[0]).unwrap();
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.duration(), 1_000);
    }

    #[test]
    fn missing_tool_is_a_download_error() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            DownloadConfig::new(dir.path(), Some(PathBuf::from("/nonexistent/yt-dlp"))).unwrap();
        let err = YtDlp::new(&config)
            .fetch("https://www.youtube.com/watch?v=x", &dir.path().join("v.mp4"))
            .unwrap_err();
        assert!(matches!(err, FeatureError::Download(_)));
    }
}

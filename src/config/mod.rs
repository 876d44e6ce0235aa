use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, ensure, Context, Result};

/// MFCC coefficients per record unless overridden.
pub const DEFAULT_MFCC_COUNT: usize = 20;
pub const DEFAULT_LABEL: &str = "zouk";
const MAX_MFCC_COUNT: usize = 128;

/// Parameters that decide the shape and tagging of every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    pub n_mfcc: usize,
    pub label: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            n_mfcc: DEFAULT_MFCC_COUNT,
            label: DEFAULT_LABEL.to_string(),
        }
    }
}

impl ExtractorConfig {
    pub fn new(label: impl Into<String>, n_mfcc: usize) -> Result<Self> {
        let label = label.into();
        ensure!(!label.trim().is_empty(), "label must not be empty");
        ensure!(
            (1..=MAX_MFCC_COUNT).contains(&n_mfcc),
            "MFCC count must be between 1 and {}, got {}",
            MAX_MFCC_COUNT,
            n_mfcc
        );
        Ok(Self { n_mfcc, label })
    }
}

/// Credentials and network policy for the video search API.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub api_key: String,
    pub endpoint: String,
    pub timeout: Duration,
    pub max_attempts: u32,
    pub retry_backoff: Duration,
}

impl SearchConfig {
    pub const DEFAULT_ENDPOINT: &'static str = "https://www.googleapis.com/youtube/v3/search";

    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        ensure!(!api_key.trim().is_empty(), "search API key must not be empty");
        Ok(Self {
            api_key,
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(30),
            max_attempts: 3,
            retry_backoff: Duration::from_secs(2),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// Where downloads land and which tool fetches them.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    pub output_root: PathBuf,
    pub ytdlp: PathBuf,
    /// Upper bound on the fetched video height; audio is all we keep.
    pub max_height: u32,
}

impl DownloadConfig {
    pub fn new(output_root: impl Into<PathBuf>, ytdlp: Option<PathBuf>) -> Result<Self> {
        let output_root = output_root.into();
        if output_root.exists() {
            ensure_dir(&output_root)?;
        }
        Ok(Self {
            output_root,
            ytdlp: ytdlp.unwrap_or_else(|| PathBuf::from("yt-dlp")),
            max_height: 360,
        })
    }

    pub fn video_dir(&self) -> PathBuf {
        self.output_root.join("mp4")
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.output_root.join("wav")
    }
}

fn ensure_dir(path: &Path) -> Result<()> {
    let canonical = path
        .canonicalize()
        .with_context(|| format!("failed to resolve output directory at {:?}", path))?;
    if canonical.is_dir() {
        Ok(())
    } else {
        Err(anyhow!("output path {:?} is not a directory", canonical))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_extractor_uses_twenty_mfccs() {
        let config = ExtractorConfig::default();
        assert_eq!(config.n_mfcc, 20);
        assert_eq!(config.label, "zouk");
    }

    #[test]
    fn rejects_blank_label_and_zero_mfccs() {
        assert!(ExtractorConfig::new("  ", 13).is_err());
        assert!(ExtractorConfig::new("zouk", 0).is_err());
        assert!(ExtractorConfig::new("kizomba", 13).is_ok());
    }

    #[test]
    fn search_config_requires_key() {
        assert!(SearchConfig::new("").is_err());
        let config = SearchConfig::new("abc").unwrap();
        assert_eq!(config.endpoint, SearchConfig::DEFAULT_ENDPOINT);
        assert_eq!(config.max_attempts, 3);
    }

    #[test]
    fn download_config_rejects_file_as_root() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(DownloadConfig::new(file.path(), None).is_err());

        let dir = tempfile::tempdir().unwrap();
        let config = DownloadConfig::new(dir.path(), None).unwrap();
        assert!(config.audio_dir().ends_with("wav"));
        assert_eq!(config.ytdlp, PathBuf::from("yt-dlp"));
    }
}

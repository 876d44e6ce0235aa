use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::config::{ExtractorConfig, DEFAULT_LABEL, DEFAULT_MFCC_COUNT};

#[derive(Parser, Debug)]
#[command(
    name = "genrefeat",
    version,
    about = "Build genre-classification feature datasets from audio clips"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract features for every audio file in a folder into a CSV dataset.
    Extract(ExtractArgs),
    /// Search for short videos and save their audio as mono WAV files.
    Download(DownloadArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    /// Folder holding the audio files to analyse.
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,
    /// Destination CSV dataset.
    #[arg(value_name = "OUTPUT_CSV")]
    pub output: PathBuf,
    /// Genre label written on every row.
    #[arg(long, default_value = DEFAULT_LABEL)]
    pub label: String,
    /// Append to an existing dataset instead of rewriting it.
    #[arg(long)]
    pub append: bool,
    /// Refuse to overwrite a dataset that already holds data.
    #[arg(long, conflicts_with = "append")]
    pub no_clobber: bool,
    /// File extension to pick up.
    #[arg(long, default_value = "wav")]
    pub extension: String,
    /// Number of MFCC coefficients per row.
    #[arg(long = "mfcc", default_value_t = DEFAULT_MFCC_COUNT)]
    pub n_mfcc: usize,
}

impl ExtractArgs {
    pub fn extractor_config(&self) -> Result<ExtractorConfig> {
        ExtractorConfig::new(self.label.clone(), self.n_mfcc)
    }
}

#[derive(Args, Debug, Clone)]
pub struct DownloadArgs {
    /// Search query, e.g. "zouk music dance".
    #[arg(long)]
    pub query: String,
    /// Folder receiving `mp4/` and `wav/` subfolders.
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,
    /// Upper bound on videos fetched.
    #[arg(long = "max-results", default_value_t = 500)]
    pub max_results: usize,
    /// YouTube Data API key.
    #[arg(long = "api-key", env = "YOUTUBE_API_KEY", hide_env_values = true)]
    pub api_key: String,
    /// Path to the yt-dlp executable.
    #[arg(long = "yt-dlp")]
    pub ytdlp: Option<PathBuf>,
}

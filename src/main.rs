use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use genrefeat::batch::process_folder;
use genrefeat::cli::{Cli, Command, DownloadArgs, ExtractArgs};
use genrefeat::config::{DownloadConfig, SearchConfig};
use genrefeat::dataset::{CreateMode, DatasetWriter, Schema};
use genrefeat::features::FeatureExtractor;
use genrefeat::search::download::{Downloader, YtDlp};
use genrefeat::search::{collect_video_links, YouTubeSearch};

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Extract(args) => handle_extract(&args),
        Command::Download(args) => handle_download(&args),
    }
}

fn handle_extract(args: &ExtractArgs) -> Result<()> {
    let config = args
        .extractor_config()
        .context("Invalid extraction settings")?;
    let schema = Schema::for_mfcc(config.n_mfcc);
    let opened = if args.append {
        DatasetWriter::open_append(&args.output, schema)
    } else {
        let mode = if args.no_clobber {
            CreateMode::CreateNew
        } else {
            CreateMode::Overwrite
        };
        DatasetWriter::initialize(&args.output, schema, mode)
    };
    let mut writer = opened.with_context(|| format!("Failed to open dataset {:?}", args.output))?;

    let extractor = FeatureExtractor::new(config);
    let report = process_folder(&args.input_dir, &args.extension, &extractor, &mut writer)
        .with_context(|| format!("Batch over {:?} aborted", args.input_dir))?;

    for failure in &report.failures {
        warn!(file = %failure.path.display(), error = %failure.error, "not in dataset");
    }
    info!(
        written = report.written,
        failed = report.failures.len(),
        dataset = %args.output.display(),
        "extraction complete"
    );
    println!(
        "Wrote {} rows to {} ({} files skipped)",
        report.written,
        args.output.display(),
        report.failures.len()
    );
    Ok(())
}

fn handle_download(args: &DownloadArgs) -> Result<()> {
    let search = YouTubeSearch::new(SearchConfig::new(args.api_key.clone())?)?;
    let links = collect_video_links(&search, &args.query, args.max_results)
        .with_context(|| format!("Search for {:?} failed", args.query))?;

    let config = DownloadConfig::new(&args.output_dir, args.ytdlp.clone())?;
    let downloader = Downloader::new(YtDlp::new(&config), config);
    let report = downloader.download_all(&links)?;

    println!(
        "Converted {} of {} videos into {}",
        report.converted.len(),
        links.len(),
        args.output_dir.join("wav").display()
    );
    Ok(())
}

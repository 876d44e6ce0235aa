//! Folder batch processing: extract every matching file and append it to
//! the dataset, skipping files that fail on their own.

use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::dataset::RecordSink;
use crate::error::{FeatureError, Result};
use crate::features::FeatureExtractor;

/// Outcome of one folder run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub written: usize,
    pub failures: Vec<FileFailure>,
}

#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: FeatureError,
}

/// Files directly inside `dir` whose extension matches `extension`
/// (case-insensitive), sorted by name.
pub fn candidate_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(FeatureError::io(
            dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "input directory not found"),
        ));
    }
    let wanted = extension.trim_start_matches('.');
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|err| {
            let source = err
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "walk failed"));
            FeatureError::io(dir, source)
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(wanted))
            .unwrap_or(false);
        if matches {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Extract and append every candidate file in `dir`.
///
/// Per-file failures are logged and collected; only errors that make the
/// dataset itself unwritable stop the run. Rows appended before such an
/// error stay in the dataset.
pub fn process_folder<W>(
    dir: &Path,
    extension: &str,
    extractor: &FeatureExtractor,
    writer: &mut W,
) -> Result<BatchReport>
where
    W: RecordSink + ?Sized,
{
    let files = candidate_files(dir, extension)?;
    info!(dir = %dir.display(), files = files.len(), "processing folder");

    let mut report = BatchReport::default();
    for path in files {
        match process_file(&path, extractor, writer) {
            Ok(()) => {
                report.written += 1;
                info!(file = %path.display(), "appended features");
            }
            Err(err) if err.is_fatal_for_batch() => return Err(err),
            Err(err) => {
                warn!(file = %path.display(), error = %err, "skipping file");
                report.failures.push(FileFailure { path, error: err });
            }
        }
    }
    Ok(report)
}

fn process_file<W>(path: &Path, extractor: &FeatureExtractor, writer: &mut W) -> Result<()>
where
    W: RecordSink + ?Sized,
{
    let record = extractor.extract(path)?;
    writer.append(&record)
}

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{csv, Schema};
use crate::error::{FeatureError, Result};
use crate::types::FeatureRecord;

/// What `initialize` does when the destination already holds data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreateMode {
    /// Truncate and rewrite the header; the last writer wins.
    #[default]
    Overwrite,
    /// Refuse to touch a non-empty destination.
    CreateNew,
}

/// Destination for extracted records, one row per call.
pub trait RecordSink {
    fn append(&mut self, record: &FeatureRecord) -> Result<()>;
}

/// Append-only writer over a headered dataset file.
///
/// A writer only exists for a headered destination, so every `append` lands
/// under a known schema. The file handle is released when the writer drops,
/// including when a batch bails out midway.
#[derive(Debug)]
pub struct DatasetWriter {
    path: PathBuf,
    schema: Schema,
    out: BufWriter<File>,
    rows_written: usize,
}

impl DatasetWriter {
    /// Create `path` and write `schema` as its first row.
    pub fn initialize(path: &Path, schema: Schema, mode: CreateMode) -> Result<Self> {
        if mode == CreateMode::CreateNew && holds_data(path)? {
            return Err(FeatureError::AlreadyExists(path.to_path_buf()));
        }
        let file = File::create(path).map_err(|err| FeatureError::io(path, err))?;
        let mut writer = Self {
            path: path.to_path_buf(),
            schema,
            out: BufWriter::new(file),
            rows_written: 0,
        };
        let header = csv::encode_row(writer.schema.columns());
        writer.write_line(&header)?;
        info!(path = %path.display(), columns = writer.schema.len(), "initialized dataset");
        Ok(writer)
    }

    /// Reopen an existing dataset whose header must equal `schema`.
    pub fn open_append(path: &Path, schema: Schema) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|err| FeatureError::io(path, err))?;
        let header = csv::parse_rows(&text).into_iter().next().ok_or_else(|| {
            FeatureError::io(
                path,
                std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "dataset is not initialized (no header row)",
                ),
            )
        })?;
        if header != schema.columns() {
            return Err(FeatureError::SchemaMismatch {
                expected: schema.len(),
                actual: header.len(),
            });
        }

        let file = OpenOptions::new()
            .append(true)
            .open(path)
            .map_err(|err| FeatureError::io(path, err))?;
        let mut writer = Self {
            path: path.to_path_buf(),
            schema,
            out: BufWriter::new(file),
            rows_written: 0,
        };
        // a killed process can leave the last row without its terminator
        if !text.ends_with('\n') {
            writer.write_line("\n")?;
        }
        debug!(path = %path.display(), "opened dataset for append");
        Ok(writer)
    }

    /// Write one record as a row and flush it.
    pub fn append(&mut self, record: &FeatureRecord) -> Result<()> {
        self.schema.check_width(record.width())?;
        let line = csv::encode_row(&record.to_cells());
        self.write_line(&line)?;
        self.rows_written += 1;
        Ok(())
    }

    /// Append records in order. Rows before a failure stay committed.
    pub fn append_many<'a, I>(&mut self, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a FeatureRecord>,
    {
        let mut count = 0;
        for record in records {
            self.append(record)?;
            count += 1;
        }
        Ok(count)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows appended through this writer (the header is not counted).
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        self.out
            .write_all(line.as_bytes())
            .and_then(|_| self.out.flush())
            .map_err(|err| FeatureError::io(&self.path, err))
    }
}

impl RecordSink for DatasetWriter {
    fn append(&mut self, record: &FeatureRecord) -> Result<()> {
        DatasetWriter::append(self, record)
    }
}

fn holds_data(path: &Path) -> Result<bool> {
    match fs::metadata(path) {
        Ok(meta) => Ok(meta.len() > 0),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(FeatureError::io(path, err)),
    }
}

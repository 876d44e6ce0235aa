//! Error taxonomy shared by the extractor, the dataset writer and the
//! download helpers.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Convenient alias for results returned by library modules.
pub type Result<T> = std::result::Result<T, FeatureError>;

#[derive(Debug, Error)]
pub enum FeatureError {
    /// Input could not be opened or decoded into PCM samples.
    #[error("failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// A transform could not be computed on otherwise valid audio.
    #[error("feature computation failed: {0}")]
    FeatureComputation(String),

    /// Record or stored header does not line up with the dataset schema.
    #[error("schema mismatch: expected {expected} columns, got {actual}")]
    SchemaMismatch { expected: usize, actual: usize },

    #[error("dataset {0} already holds data")]
    AlreadyExists(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("video search failed: {0}")]
    Search(String),

    #[error("download failed: {0}")]
    Download(String),
}

impl FeatureError {
    pub fn decode(path: &Path, message: impl Into<String>) -> Self {
        Self::Decode {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub fn computation(message: impl Into<String>) -> Self {
        Self::FeatureComputation(message.into())
    }

    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Errors that make every later row unwritable end a batch; everything
    /// else only costs the offending file.
    pub fn is_fatal_for_batch(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

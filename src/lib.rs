//! Audio feature extraction for genre-classification datasets.
//!
//! A folder of clips goes through [`features::FeatureExtractor`] one file at
//! a time, and each record is appended by [`dataset::DatasetWriter`] under a
//! fixed header. [`search`] fetches training audio in the first place.

pub mod audio;
pub mod batch;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod features;
pub mod search;
pub mod types;

pub use error::{FeatureError, Result};

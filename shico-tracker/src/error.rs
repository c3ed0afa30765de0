//! Error types for models, tracking and aggregation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading an embedding model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The model file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The `<vocab> <dim>` header line is missing or malformed.
    #[error("Malformed header in {}: {detail}", path.display())]
    Header { path: PathBuf, detail: String },

    /// A word entry is truncated or does not parse.
    #[error("Malformed entry {index} in {}: {detail}", path.display())]
    Entry {
        path: PathBuf,
        index: usize,
        detail: String,
    },

    /// A vector does not match the model dimension.
    #[error("Vector for '{word}' has {found} components, expected {expected}")]
    Dimension {
        word: String,
        expected: usize,
        found: usize,
    },
}

/// Errors raised by the vocabulary monitor.
#[derive(Debug, Error)]
pub enum TrackError {
    /// The model glob pattern is not valid.
    #[error("Invalid model pattern: {0}")]
    Pattern(String),

    /// The model glob pattern matched no files.
    #[error("No model files match '{0}'")]
    NoModels(String),

    /// A model file failed to load.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The requested tracking algorithm does not exist.
    #[error("Unknown tracking algorithm: {0}")]
    UnknownAlgorithm(String),
}

/// Errors raised by the vocabulary aggregator.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// The requested weighting function does not exist.
    #[error("Unknown weighting function: {0}")]
    UnknownWeighting(String),

    /// Intervals must span at least one year.
    #[error("Years per interval must be at least 1")]
    InvalidInterval,

    /// A model key carries no year.
    #[error("Model key '{0}' does not contain a year")]
    UnparseableKey(String),
}

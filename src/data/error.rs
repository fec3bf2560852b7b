use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to produce a record sequence from a dataset source.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("dataset not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("reading {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unsupported dataset extension: .{0}")]
    UnsupportedFormat(String),

    /// Malformed JSON, or JSON that does not match the record schema.
    #[error("parsing JSON dataset: {0}")]
    Json(#[from] serde_json::Error),

    #[error("parsing CSV dataset: {0}")]
    Csv(#[from] csv::Error),
}

/// A query whose result is undefined for the records it was asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("{operation} needs at least one record")]
    EmptyCollection { operation: &'static str },
}

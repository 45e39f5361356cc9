/// Error types for the record store
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing resource exists but could not be read or written
    #[error("{label}: I/O failure on {path}: {source}")]
    Io {
        label: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing resource exists but does not hold a valid collection
    #[error("{label}: collection at {path} is unreadable: {source}")]
    Corrupt {
        label: String,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid patch: {0}")]
    InvalidPatch(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

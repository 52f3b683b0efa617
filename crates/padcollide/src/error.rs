//! Error types for the search.

use std::path::PathBuf;

use padcollide_core::{CoreError, MatchKey};
use padcollide_store::StoreError;
use thiserror::Error;

/// Errors that can occur while setting up or running a search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Invalid configuration or degenerate input.
    #[error("configuration error: {0}")]
    Config(#[from] CoreError),

    /// Cache or checkpoint error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// A cache reported a key it could not then produce.
    #[error("cache lost entry for key {0}")]
    CacheInconsistent(MatchKey),

    /// Reading a document or writing a result failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

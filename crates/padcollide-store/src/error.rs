//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during cache and checkpoint operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Checkpoint serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Persisted state belongs to a different search.
    #[error("persisted state does not match this search: {0}")]
    FingerprintMismatch(String),

    /// Checkpoint written by an incompatible version.
    #[error("unsupported checkpoint version: {0}")]
    UnsupportedVersion(u32),

    /// Invalid data in storage.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

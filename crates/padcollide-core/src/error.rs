//! Error types for padcollide Core.

use thiserror::Error;

use crate::types::Side;

/// Configuration and precondition failures.
///
/// All of these are fatal: they are raised before the search starts and
/// are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("num_chars must be between 1 and {max}, got {num_chars}")]
    InvalidNumChars { num_chars: usize, max: usize },

    #[error("{0} document has no lines")]
    EmptyDocument(Side),

    #[error("real and fake documents are identical")]
    IdenticalDocuments,

    #[error("unknown digest algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("unknown padding scheme: {0}")]
    UnknownScheme(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

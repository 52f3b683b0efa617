//! VariantCache trait: the per-side key to variant mapping.
//!
//! This trait keeps the search driver storage-agnostic. Implementations
//! include a `HashMap` (default) and SQLite (for runs larger than memory).

use padcollide_core::{MatchKey, RenderedVariant};

use crate::error::Result;

/// Mapping from match key to the most recent variant that produced it.
///
/// # Design Notes
///
/// - **Unconditional writes**: `insert` overwrites any existing entry for
///   the key. There is at most one entry per key.
/// - **Synchronous**: the driver performs one insert and one lookup per
///   side per attempt and never yields in between.
pub trait VariantCache {
    /// Insert or overwrite the entry for `key`.
    fn insert(&mut self, key: MatchKey, variant: RenderedVariant) -> Result<()>;

    /// Get the variant stored under `key`.
    fn lookup(&self, key: &MatchKey) -> Result<Option<RenderedVariant>>;

    /// Check if `key` has an entry.
    fn contains(&self, key: &MatchKey) -> Result<bool> {
        Ok(self.lookup(key)?.is_some())
    }

    /// Number of distinct keys stored.
    fn len(&self) -> Result<u64>;

    /// Whether the cache has no entries.
    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// All entries, ordered by key.
    fn entries(&self) -> Result<Vec<(MatchKey, RenderedVariant)>>;
}

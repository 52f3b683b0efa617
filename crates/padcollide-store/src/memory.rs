//! In-memory implementation of the VariantCache trait.

use std::collections::HashMap;

use padcollide_core::{MatchKey, RenderedVariant};

use crate::error::Result;
use crate::traits::VariantCache;

/// `HashMap`-backed variant cache.
///
/// All data is lost when the cache is dropped unless it is written to a
/// [`Checkpoint`](crate::Checkpoint).
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: HashMap<MatchKey, RenderedVariant>,
}

impl MemoryCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cache from saved entries.
    ///
    /// Later entries win when a key repeats, matching `insert`.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (MatchKey, RenderedVariant)>,
    {
        Self {
            entries: entries.into_iter().collect(),
        }
    }
}

impl VariantCache for MemoryCache {
    fn insert(&mut self, key: MatchKey, variant: RenderedVariant) -> Result<()> {
        self.entries.insert(key, variant);
        Ok(())
    }

    fn lookup(&self, key: &MatchKey) -> Result<Option<RenderedVariant>> {
        Ok(self.entries.get(key).cloned())
    }

    fn contains(&self, key: &MatchKey) -> Result<bool> {
        Ok(self.entries.contains_key(key))
    }

    fn len(&self) -> Result<u64> {
        Ok(self.entries.len() as u64)
    }

    fn entries(&self) -> Result<Vec<(MatchKey, RenderedVariant)>> {
        let mut out: Vec<_> = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(out)
    }
}

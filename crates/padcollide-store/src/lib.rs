//! # padcollide Store
//!
//! Variant caches for the collision search. Each side of the search owns one
//! cache mapping a [`MatchKey`] to the variant that most recently produced it.
//!
//! ## Key Types
//!
//! - [`VariantCache`] - The trait the search driver talks to
//! - [`MemoryCache`] - `HashMap`-backed cache, the default
//! - [`SqliteCacheStore`] / [`SqliteCache`] - Disk-backed caches that also
//!   persist the search position, so a run can be resumed
//! - [`Checkpoint`] - CBOR snapshot of two memory caches plus the position
//!
//! ## Usage
//!
//! ```rust
//! use padcollide_core::{MatchKey, RenderedVariant};
//! use padcollide_store::{MemoryCache, VariantCache};
//!
//! let mut cache = MemoryCache::new();
//! cache.insert(MatchKey::new("2a"), RenderedVariant::new("a\nb  \n")).unwrap();
//! assert!(cache.contains(&MatchKey::new("2a")).unwrap());
//! ```
//!
//! ## Design Notes
//!
//! - **Overwrite on insert**: a later variant with a key already present on
//!   the same side replaces the stored one. Any colliding pair is acceptable.
//! - **No eviction**: caches grow with the number of attempts.
//!
//! [`MatchKey`]: padcollide_core::MatchKey

pub mod checkpoint;
pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use checkpoint::{Checkpoint, SearchFingerprint, CHECKPOINT_VERSION};
pub use error::{Result, StoreError};
pub use memory::MemoryCache;
pub use sqlite::{SqliteCache, SqliteCacheStore};
pub use traits::VariantCache;

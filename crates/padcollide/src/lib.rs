//! # padcollide
//!
//! Birthday-attack search for two documents whose whitespace-padded
//! variants share a truncated digest.
//!
//! ## Overview
//!
//! Given a "real" and a "fake" document, the search renders both at attempt
//! index 0, 1, 2, ... with spaces appended to selected line ends, hashes each
//! rendering, and stops as soon as any real variant and any fake variant have
//! the same trailing `num_chars` hex characters.
//!
//! - **Padding**: each line is one bit of the attempt index; the padding
//!   depth grows by one every time the bit patterns wrap around
//! - **Caches**: one per side, key to most recent variant
//! - **Driver**: a single shared attempt counter, both directions checked
//!
//! ## Usage
//!
//! ```rust
//! use padcollide::{Collider, Document, SearchConfig, SearchOutcome};
//!
//! let real = Document::from_lines(["a", "b"]);
//! let fake = Document::from_lines(["x"]);
//! let mut collider = Collider::new(real, fake, &SearchConfig::new(2)).unwrap();
//!
//! match collider.run().unwrap() {
//!     SearchOutcome::Collision(c) => assert!(c.verify(collider.digest())),
//!     other => panic!("unexpected outcome: {:?}", other),
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `padcollide::core` - Documents, encoder, digests
//! - `padcollide::store` - Variant caches and checkpoints

pub mod error;
pub mod io;
pub mod search;

// Re-export component crates
pub use padcollide_core as core;
pub use padcollide_store as store;

// Re-export main types for convenience
pub use error::{Result, SearchError};
pub use search::{Collider, Collision, SearchBudget, SearchConfig, SearchOutcome};

// Re-export commonly used core types
pub use padcollide_core::{
    AttemptIndex, DigestAlgorithm, Document, MatchKey, PaddingScheme, RenderedVariant, Side,
    SuffixDigest,
};
pub use padcollide_store::{Checkpoint, MemoryCache, SqliteCacheStore, VariantCache};

//! # padcollide Core
//!
//! Pure primitives for the birthday-attack collision search: documents, the
//! whitespace padding encoder, and truncated digests.
//!
//! This crate contains no I/O, no storage, no logging. It is pure computation
//! over document text.
//!
//! ## Key Types
//!
//! - [`Document`] - An immutable sequence of original lines
//! - [`PaddingScheme`] - Maps an attempt index to a [`RenderedVariant`]
//! - [`SuffixDigest`] - Hashes a variant and keeps the trailing hex characters
//! - [`MatchKey`] - The truncated digest used as the collision criterion
//!
//! ## Encoding
//!
//! The default [`PaddingScheme::Lines`] decomposes an attempt index into a
//! bitmask (`cycle`) selecting padded lines and a padding depth (`level`).
//! See the [`encoder`] module.

pub mod digest;
pub mod document;
pub mod encoder;
pub mod error;
pub mod types;

pub use digest::{DigestAlgorithm, SuffixDigest};
pub use document::Document;
pub use encoder::{Coordinates, PaddingScheme};
pub use error::{CoreError, Result};
pub use types::{AttemptIndex, MatchKey, RenderedVariant, Side};

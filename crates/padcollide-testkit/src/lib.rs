//! # padcollide Testkit
//!
//! Testing utilities for padcollide.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known renderings, digests, and first collisions
//! - **Generators**: Proptest strategies for documents, keys, and variants
//! - **Fixtures**: Document pairs on disk for end-to-end tests
//!
//! ## Golden Vectors
//!
//! ```rust
//! use padcollide_testkit::vectors::{render_vectors, verify_render_vector};
//!
//! for vector in render_vectors() {
//!     verify_render_vector(&vector).unwrap();
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use padcollide::PaddingScheme;
//! use padcollide_testkit::generators::{attempt, document};
//!
//! proptest! {
//!     #[test]
//!     fn render_is_pure(doc in document(1, 8), i in attempt()) {
//!         prop_assert_eq!(
//!             PaddingScheme::Lines.render(&doc, i),
//!             PaddingScheme::Lines.render(&doc, i)
//!         );
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use padcollide_testkit::fixtures::DocumentPairFixture;
//!
//! let fixture = DocumentPairFixture::new("a\nb\n", "x\n").unwrap();
//! assert_eq!(fixture.real().unwrap().line_count(), 2);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::DocumentPairFixture;
pub use vectors::{collision_vectors, render_vectors, verify_all_vectors};

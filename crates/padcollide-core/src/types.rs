//! Strong type definitions for padcollide.
//!
//! Match keys and rendered variants are both plain strings underneath; the
//! newtypes keep them from being mixed up at call sites.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position in the shared enumeration of variants.
///
/// Both sides are rendered at the same index every round.
pub type AttemptIndex = u64;

/// Which of the two documents a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Real,
    Fake,
}

impl Side {
    /// Stable lowercase label, also used as a storage column value.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Side::Real => "real",
            Side::Fake => "fake",
        }
    }

    /// The other side.
    pub const fn opposite(&self) -> Self {
        match self {
            Side::Real => Side::Fake,
            Side::Fake => Side::Real,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The trailing hex characters of a variant's digest.
///
/// Two variants collide when their match keys are equal, whichever side
/// they came from.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchKey(String);

impl MatchKey {
    /// Wrap an already-truncated lowercase hex string.
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MatchKey({})", self.0)
    }
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MatchKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The full text of one document at one attempt index.
///
/// Every line is terminated by `\n`. These are exactly the bytes that get
/// hashed and exactly the bytes written to an output file.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderedVariant(String);

impl RenderedVariant {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Iterate over the rendered lines, without their terminators.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.0.lines()
    }
}

impl fmt::Debug for RenderedVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RenderedVariant({:?})", self.0)
    }
}

impl fmt::Display for RenderedVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<[u8]> for RenderedVariant {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

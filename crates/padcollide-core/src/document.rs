//! Document: the original lines of one side of the search.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::types::{RenderedVariant, Side};

/// An immutable, ordered sequence of original lines.
///
/// Lines are stored without their line terminators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    lines: Vec<String>,
}

impl Document {
    /// Create a document from already-split lines.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Split text into lines, stripping `\n` and `\r\n` terminators.
    ///
    /// A trailing terminator does not produce an extra empty line.
    pub fn parse(text: &str) -> Self {
        Self::from_lines(text.lines())
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct one-bit-per-line padding patterns, `2^line_count`.
    ///
    /// Returns `None` when the count does not fit in an attempt index
    /// (64 lines or more). An empty document has exactly one pattern.
    pub fn combination_count(&self) -> Option<u64> {
        u32::try_from(self.lines.len())
            .ok()
            .and_then(|n| 1u64.checked_shl(n))
    }

    /// Reject documents that cannot produce distinct variants.
    pub fn ensure_renderable(&self, side: Side) -> Result<()> {
        if self.lines.is_empty() {
            return Err(CoreError::EmptyDocument(side));
        }
        Ok(())
    }

    /// The unpadded rendering: every line followed by `\n`.
    pub fn original(&self) -> RenderedVariant {
        let mut out = String::with_capacity(self.byte_len());
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        RenderedVariant::new(out)
    }

    /// Total bytes of the unpadded rendering.
    pub(crate) fn byte_len(&self) -> usize {
        self.lines.iter().map(|l| l.len() + 1).sum()
    }

    /// Content fingerprint, used to tie persisted search state to its inputs.
    pub fn fingerprint(&self) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"padcollide-document-v0:");
        hasher.update(&(self.lines.len() as u64).to_le_bytes());
        for line in &self.lines {
            hasher.update(&(line.len() as u64).to_le_bytes());
            hasher.update(line.as_bytes());
        }
        *hasher.finalize().as_bytes()
    }
}

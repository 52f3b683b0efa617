//! CBOR checkpoints of an in-progress search.
//!
//! A checkpoint holds both caches and the next attempt index, tagged with a
//! [`SearchFingerprint`] so it can only be resumed against the same inputs.

use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use padcollide_core::{
    AttemptIndex, DigestAlgorithm, Document, MatchKey, PaddingScheme, RenderedVariant,
};

use crate::error::{Result, StoreError};
use crate::memory::MemoryCache;
use crate::traits::VariantCache;

/// Current checkpoint format version.
pub const CHECKPOINT_VERSION: u32 = 1;

/// Everything that determines the sequence of keys a search produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFingerprint {
    pub real: [u8; 32],
    pub fake: [u8; 32],
    pub algorithm: DigestAlgorithm,
    pub scheme: PaddingScheme,
    pub num_chars: usize,
}

impl SearchFingerprint {
    pub fn new(
        real: &Document,
        fake: &Document,
        algorithm: DigestAlgorithm,
        scheme: PaddingScheme,
        num_chars: usize,
    ) -> Self {
        Self {
            real: real.fingerprint(),
            fake: fake.fingerprint(),
            algorithm,
            scheme,
            num_chars,
        }
    }

    /// Fail unless `other` describes the same search.
    pub fn ensure_matches(&self, other: &SearchFingerprint) -> Result<()> {
        let mismatch = if self.real != other.real {
            Some("real document differs")
        } else if self.fake != other.fake {
            Some("fake document differs")
        } else if self.algorithm != other.algorithm {
            Some("digest algorithm differs")
        } else if self.scheme != other.scheme {
            Some("padding scheme differs")
        } else if self.num_chars != other.num_chars {
            Some("num_chars differs")
        } else {
            None
        };

        match mismatch {
            Some(reason) => Err(StoreError::FingerprintMismatch(reason.to_string())),
            None => Ok(()),
        }
    }
}

/// Snapshot of a search: position plus both caches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub version: u32,
    pub fingerprint: SearchFingerprint,
    /// The first attempt index not yet rendered.
    pub next_attempt: AttemptIndex,
    pub real: Vec<(MatchKey, RenderedVariant)>,
    pub fake: Vec<(MatchKey, RenderedVariant)>,
}

impl Checkpoint {
    /// Capture the state of two caches.
    pub fn capture<R, F>(
        fingerprint: SearchFingerprint,
        next_attempt: AttemptIndex,
        real: &R,
        fake: &F,
    ) -> Result<Self>
    where
        R: VariantCache + ?Sized,
        F: VariantCache + ?Sized,
    {
        Ok(Self {
            version: CHECKPOINT_VERSION,
            fingerprint,
            next_attempt,
            real: real.entries()?,
            fake: fake.entries()?,
        })
    }

    /// Write to `path`, replacing any previous checkpoint atomically.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let tmp = path.with_extension("tmp");
        {
            let mut writer = BufWriter::new(fs::File::create(&tmp)?);
            ciborium::into_writer(self, &mut writer)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            writer.flush()?;
        }
        fs::rename(&tmp, path)?;
        tracing::debug!(
            path = %path.display(),
            next_attempt = self.next_attempt,
            real_entries = self.real.len(),
            fake_entries = self.fake.len(),
            "checkpoint saved"
        );
        Ok(())
    }

    /// Read a checkpoint from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(fs::File::open(path.as_ref())?);
        let checkpoint: Checkpoint = ciborium::from_reader(reader)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        if checkpoint.version != CHECKPOINT_VERSION {
            return Err(StoreError::UnsupportedVersion(checkpoint.version));
        }
        Ok(checkpoint)
    }

    /// Split into the position and two rebuilt memory caches.
    pub fn into_caches(self) -> (AttemptIndex, MemoryCache, MemoryCache) {
        (
            self.next_attempt,
            MemoryCache::from_entries(self.real),
            MemoryCache::from_entries(self.fake),
        )
    }
}

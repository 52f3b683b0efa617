//! Digest function: hash a rendered variant and keep its trailing hex.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{CoreError, Result};
use crate::types::MatchKey;

/// The hash function behind a match key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    #[default]
    Sha256,
    Blake3,
}

impl DigestAlgorithm {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Blake3 => "blake3",
        }
    }

    /// Digest length in bytes.
    pub const fn output_len(&self) -> usize {
        match self {
            DigestAlgorithm::Sha256 => 32,
            DigestAlgorithm::Blake3 => blake3::OUT_LEN,
        }
    }

    /// Digest length in hex characters.
    pub const fn hex_len(&self) -> usize {
        self.output_len() * 2
    }

    /// Full digest of `data`.
    pub fn hash(&self, data: &[u8]) -> [u8; 32] {
        match self {
            DigestAlgorithm::Sha256 => Sha256::digest(data).into(),
            DigestAlgorithm::Blake3 => *blake3::hash(data).as_bytes(),
        }
    }

    /// Full digest of `data` as lowercase hex.
    pub fn hex_digest(&self, data: &[u8]) -> String {
        hex::encode(self.hash(data))
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sha256" => Ok(DigestAlgorithm::Sha256),
            "blake3" => Ok(DigestAlgorithm::Blake3),
            other => Err(CoreError::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// A digest truncated to its last `num_chars` hex characters.
///
/// Construction validates `num_chars`, so a `SuffixDigest` in hand is
/// always usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuffixDigest {
    algorithm: DigestAlgorithm,
    num_chars: usize,
}

impl SuffixDigest {
    /// Create a suffix digest, checking `1 <= num_chars <= hex_len`.
    pub fn new(algorithm: DigestAlgorithm, num_chars: usize) -> Result<Self> {
        let max = algorithm.hex_len();
        if num_chars == 0 || num_chars > max {
            return Err(CoreError::InvalidNumChars { num_chars, max });
        }
        Ok(Self {
            algorithm,
            num_chars,
        })
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    pub fn num_chars(&self) -> usize {
        self.num_chars
    }

    /// Compute the match key of `data`.
    ///
    /// Only the trailing `ceil(num_chars / 2)` bytes are hex-encoded; an odd
    /// `num_chars` drops the leading nibble.
    pub fn match_key(&self, data: impl AsRef<[u8]>) -> MatchKey {
        let digest = self.algorithm.hash(data.as_ref());
        let tail_bytes = (self.num_chars + 1) / 2;
        let tail = hex::encode(&digest[digest.len() - tail_bytes..]);
        let skip = tail.len() - self.num_chars;
        MatchKey::new(&tail[skip..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // sha256("a\nb\n")
    const AB_SHA256: &str = "911169ddaaf146aff539f58c26c489af3b892dff0fe283c1c264c65ae5aa59a2";

    #[test]
    fn test_rejects_out_of_range_num_chars() {
        assert_eq!(
            SuffixDigest::new(DigestAlgorithm::Sha256, 0),
            Err(CoreError::InvalidNumChars { num_chars: 0, max: 64 })
        );
        assert_eq!(
            SuffixDigest::new(DigestAlgorithm::Blake3, 65),
            Err(CoreError::InvalidNumChars { num_chars: 65, max: 64 })
        );
        assert!(SuffixDigest::new(DigestAlgorithm::Sha256, 64).is_ok());
        assert!(SuffixDigest::new(DigestAlgorithm::Sha256, 1).is_ok());
    }

    #[test]
    fn test_sha256_full_digest() {
        assert_eq!(DigestAlgorithm::Sha256.hex_digest(b"a\nb\n"), AB_SHA256);
    }

    #[test]
    fn test_match_key_is_hex_suffix() {
        for n in 1..=64 {
            let digest = SuffixDigest::new(DigestAlgorithm::Sha256, n).unwrap();
            let key = digest.match_key(b"a\nb\n");
            assert_eq!(key.len(), n);
            assert_eq!(key.as_str(), &AB_SHA256[64 - n..]);
        }
    }

    #[test]
    fn test_blake3_match_key_is_hex_suffix() {
        let full = blake3::hash(b"hello").to_hex().to_string();
        let digest = SuffixDigest::new(DigestAlgorithm::Blake3, 7).unwrap();
        assert_eq!(digest.match_key(b"hello").as_str(), &full[57..]);
    }

    #[test]
    fn test_algorithms_differ() {
        let sha = SuffixDigest::new(DigestAlgorithm::Sha256, 64).unwrap();
        let b3 = SuffixDigest::new(DigestAlgorithm::Blake3, 64).unwrap();
        assert_ne!(sha.match_key(b"same"), b3.match_key(b"same"));
    }

    #[test]
    fn test_algorithm_from_str() {
        assert_eq!("sha256".parse::<DigestAlgorithm>(), Ok(DigestAlgorithm::Sha256));
        assert_eq!("blake3".parse::<DigestAlgorithm>(), Ok(DigestAlgorithm::Blake3));
        assert!("md5".parse::<DigestAlgorithm>().is_err());
    }
}

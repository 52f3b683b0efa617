//! Test fixtures and helpers.
//!
//! Common setup code for tests that go through the filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use padcollide::{io, Document, MatchKey, SuffixDigest};

/// A real/fake document pair written to a temporary directory.
pub struct DocumentPairFixture {
    pub dir: TempDir,
    pub real_path: PathBuf,
    pub fake_path: PathBuf,
}

impl DocumentPairFixture {
    /// Write `real` and `fake` as `real.txt` and `fake.txt`.
    pub fn new(real: &str, fake: &str) -> std::io::Result<Self> {
        let dir = tempfile::tempdir()?;
        let real_path = dir.path().join("real.txt");
        let fake_path = dir.path().join("fake.txt");
        fs::write(&real_path, real)?;
        fs::write(&fake_path, fake)?;
        Ok(Self {
            dir,
            real_path,
            fake_path,
        })
    }

    /// The classic two-letter pair: same layout, different amount.
    pub fn confession() -> std::io::Result<Self> {
        Self::new(
            "I, Alice, owe Bob 10 dollars.\nSigned,\nAlice\n",
            "I, Alice, owe Bob 1000 dollars.\nSigned,\nAlice\n",
        )
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn real(&self) -> padcollide::Result<Document> {
        io::read_document(&self.real_path)
    }

    pub fn fake(&self) -> padcollide::Result<Document> {
        io::read_document(&self.fake_path)
    }

    pub fn real_output(&self) -> PathBuf {
        io::output_path(&self.real_path)
    }

    pub fn fake_output(&self) -> PathBuf {
        io::output_path(&self.fake_path)
    }

    /// Match keys of both output files, recomputed from disk.
    pub fn output_keys(&self, digest: &SuffixDigest) -> std::io::Result<(MatchKey, MatchKey)> {
        let real = fs::read(self.real_output())?;
        let fake = fs::read(self.fake_output())?;
        Ok((digest.match_key(real), digest.match_key(fake)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use padcollide::{Collider, SearchConfig, SearchOutcome};

    #[test]
    fn test_confession_roundtrip_through_files() {
        let fixture = DocumentPairFixture::confession().unwrap();
        let config = SearchConfig::new(4);
        let mut collider =
            Collider::new(fixture.real().unwrap(), fixture.fake().unwrap(), &config).unwrap();

        let collision = match collider.run().unwrap() {
            SearchOutcome::Collision(c) => c,
            other => panic!("unexpected outcome {:?}", other),
        };
        io::write_collision(&fixture.real_path, &fixture.fake_path, &collision).unwrap();

        let (real_key, fake_key) = fixture.output_keys(collider.digest()).unwrap();
        assert_eq!(real_key, collision.key);
        assert_eq!(fake_key, collision.key);
    }

    #[test]
    fn test_attempt_zero_reproduces_input_bytes() {
        let fixture = DocumentPairFixture::confession().unwrap();
        let original = fs::read_to_string(&fixture.real_path).unwrap();
        assert_eq!(fixture.real().unwrap().original().as_str(), original);
    }
}

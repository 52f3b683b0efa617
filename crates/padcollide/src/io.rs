//! Reading documents and writing collision results.
//!
//! Output files contain exactly the bytes that were hashed, so the match key
//! can be recomputed from them.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use padcollide_core::{Document, RenderedVariant};

use crate::error::{Result, SearchError};
use crate::search::Collision;

/// Read a document, splitting it into lines with terminators stripped.
pub fn read_document(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| SearchError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Document::parse(&text))
}

/// `{path}.out`, next to the input.
pub fn output_path(path: impl AsRef<Path>) -> PathBuf {
    let mut name = OsString::from(path.as_ref().as_os_str());
    name.push(".out");
    PathBuf::from(name)
}

/// Write a rendered variant byte-for-byte.
pub fn write_variant(path: impl AsRef<Path>, variant: &RenderedVariant) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, variant.as_bytes()).map_err(|source| SearchError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Write both halves of a collision next to their inputs.
///
/// Returns the real and fake output paths.
pub fn write_collision(
    real_path: impl AsRef<Path>,
    fake_path: impl AsRef<Path>,
    collision: &Collision,
) -> Result<(PathBuf, PathBuf)> {
    let real_out = output_path(real_path);
    let fake_out = output_path(fake_path);
    write_variant(&real_out, &collision.real)?;
    write_variant(&fake_out, &collision.fake)?;
    Ok((real_out, fake_out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_appends_suffix() {
        assert_eq!(
            output_path("docs/confession_real.txt"),
            PathBuf::from("docs/confession_real.txt.out")
        );
        assert_eq!(output_path("plain"), PathBuf::from("plain.out"));
    }

    #[test]
    fn test_read_document_strips_line_endings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        fs::write(&path, "one\r\ntwo\n").unwrap();

        let doc = read_document(&path).unwrap();
        assert_eq!(doc.lines(), &["one", "two"]);
    }

    #[test]
    fn test_read_missing_document() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_document(dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, SearchError::Io { .. }));
    }

    #[test]
    fn test_write_variant_exact_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let variant = RenderedVariant::new("a  \nb\n");

        write_variant(&path, &variant).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"a  \nb\n");
    }
}

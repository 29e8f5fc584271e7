//! README load/save helpers.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

/// Read the whole document as UTF-8.
pub fn read_document(path: &Path) -> Result<String> {
    debug!(path = %path.display(), "reading document");
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

/// Atomically replace the document (temp file + rename).
pub fn write_document(path: &Path, contents: &str) -> Result<()> {
    debug!(path = %path.display(), bytes = contents.len(), "writing document");
    let tmp_path = path.with_extension("md.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp document {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace document {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_replaces_contents_and_leaves_no_temp_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("README.md");
        fs::write(&path, "old\r\n").expect("seed");

        write_document(&path, "new\r\ncontent\n").expect("write");
        assert_eq!(read_document(&path).expect("read"), "new\r\ncontent\n");
        assert!(!temp.path().join("README.md.tmp").exists());
    }

    #[test]
    fn read_missing_document_names_the_path() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = read_document(&temp.path().join("README.md")).expect_err("missing");
        assert!(format!("{err:#}").contains("README.md"));
    }
}

//! Small filesystem helpers shared by the file-backed stores.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::StoreError;

/// Write `bytes` to `path` through a temp file in the same directory, so
/// readers see either the old content or the new content, never a prefix.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;
    write_atomic_via(dir, path, bytes)
}

/// Like [`write_atomic`], staging the temp file in `staging`, which must be on
/// the same filesystem as `path`. Nothing at `path` changes unless the final
/// rename succeeds.
pub(crate) fn write_atomic_via(
    staging: &Path,
    path: &Path,
    bytes: &[u8],
) -> Result<(), StoreError> {
    let mut tmp = NamedTempFile::new_in(staging)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}

/// Reject names that would escape their directory or hide as dotfiles.
pub(crate) fn check_name(name: &str) -> Result<(), StoreError> {
    let bad = name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\'])
        || name.chars().any(char::is_control);
    if bad {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_replaces() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("file.txt");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        // No temp files left behind.
        assert_eq!(std::fs::read_dir(path.parent().unwrap()).unwrap().count(), 1);
    }

    #[test]
    fn names_checked() {
        assert!(check_name("en").is_ok());
        assert!(check_name("NB_classif").is_ok());
        assert!(check_name("").is_err());
        assert!(check_name("..").is_err());
        assert!(check_name("a/b").is_err());
        assert!(check_name(".hidden").is_err());
    }
}

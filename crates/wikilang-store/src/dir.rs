//! Plain-file corpus store: `<root>/<language>.json`.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::corpus::{CorpusStore, Partition};
use crate::fs::{check_name, write_atomic_via};
use crate::StoreError;

const STAGING: &str = ".staging";

/// Corpus store backed by one JSON file per language holding both roles.
///
/// A write stages the new file under `<root>/.staging` and renames it over the
/// old one, so readers see the old partition or the new one, never a mix.
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(root.join(STAGING))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, language: &str) -> PathBuf {
        self.root.join(format!("{language}.json"))
    }
}

impl CorpusStore for DirStore {
    fn write_partition(
        &self,
        language: &str,
        training_text: &str,
        test_text: &str,
    ) -> Result<(), StoreError> {
        check_name(language)?;
        let partition = Partition {
            train: training_text.to_string(),
            test: test_text.to_string(),
        };
        let bytes = serde_json::to_vec(&partition)?;
        write_atomic_via(&self.root.join(STAGING), &self.path(language), &bytes)?;
        info!(
            language,
            root = %self.root.display(),
            "wrote corpus partition"
        );
        Ok(())
    }

    fn read_partition(&self, language: &str) -> Result<Partition, StoreError> {
        check_name(language)?;
        let bytes = match std::fs::read(self.path(language)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(language.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn languages(&self) -> Result<Vec<String>, StoreError> {
        let mut out = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "json")
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                out.push(stem.to_string());
            }
        }
        out.sort();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_partition() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = DirStore::open(tmp.path()).unwrap();
        store.write_partition("es", "el gato", "la casa").unwrap();

        let p = store.read_partition("es").unwrap();
        assert_eq!(p.train, "el gato");
        assert_eq!(p.test, "la casa");
        assert!(tmp.path().join("es.json").exists());
    }

    #[test]
    fn rewrite_replaces() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = DirStore::open(tmp.path()).unwrap();
        store.write_partition("it", "vecchio", "v").unwrap();
        store.write_partition("it", "nuovo", "n").unwrap();

        assert_eq!(store.languages().unwrap(), vec!["it"]);
        let p = store.read_partition("it").unwrap();
        assert_eq!((p.train.as_str(), p.test.as_str()), ("nuovo", "n"));
        // Only the partition file and the empty staging dir remain.
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 2);
        assert_eq!(std::fs::read_dir(tmp.path().join(STAGING)).unwrap().count(), 0);
    }

    #[test]
    fn failed_rewrite_keeps_old_partition() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = DirStore::open(tmp.path()).unwrap();
        store.write_partition("en", "old train", "old test").unwrap();

        // Staging can no longer hold temp files.
        let staging = tmp.path().join(STAGING);
        std::fs::remove_dir(&staging).unwrap();
        std::fs::write(&staging, b"not a dir").unwrap();

        assert!(store.write_partition("en", "new train", "new test").is_err());
        let p = store.read_partition("en").unwrap();
        assert_eq!(p.train, "old train");
        assert_eq!(p.test, "old test");
    }

    #[test]
    fn languages_sorted() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = DirStore::open(tmp.path()).unwrap();
        for code in ["pl", "de", "vi"] {
            store.write_partition(code, "x", "y").unwrap();
        }
        assert_eq!(store.languages().unwrap(), vec!["de", "pl", "vi"]);
    }

    #[test]
    fn missing_language_not_found() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = DirStore::open(tmp.path()).unwrap();
        assert!(matches!(
            store.read_partition("ru"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn path_traversal_rejected() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = DirStore::open(tmp.path()).unwrap();
        assert!(matches!(
            store.write_partition("../en", "x", "y"),
            Err(StoreError::InvalidName(_))
        ));
    }
}

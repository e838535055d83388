//! Versioned model registry: `<root>/<name>/<version>/`.
//!
//! A version directory is allocated before anything is written to it and is
//! published by writing `manifest.json` last. Readers only accept versions
//! whose manifest exists and whose listed components are all present, so a
//! crashed or failed save never looks like a usable bundle.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::fs::{check_name, write_atomic};
use crate::StoreError;

pub const MANIFEST: &str = "manifest.json";

/// Highest version ever allocated for a name, kept across removals.
const HIGH_WATER: &str = "high_water";

/// Published metadata for one model version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub components: Vec<String>,
}

/// File-backed registry of named, versioned model bundles.
///
/// Assumes a single writer per model name; any number of readers may load
/// published versions concurrently since published versions never change.
pub struct ModelRegistry {
    root: PathBuf,
}

impl ModelRegistry {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn version_dir(&self, name: &str, version: u32) -> PathBuf {
        self.root.join(name).join(version.to_string())
    }

    /// Reserve the next version for `name` and create its directory.
    ///
    /// Returns 1 for a new name; otherwise one past the highest version ever
    /// allocated, even if that version has since been removed.
    pub fn allocate_version(&self, name: &str) -> Result<u32, StoreError> {
        check_name(name)?;
        let model_dir = self.root.join(name);
        std::fs::create_dir_all(&model_dir)?;

        let highest_dir = self.versions(name)?.last().copied().unwrap_or(0);
        let version = highest_dir.max(self.high_water(name)?) + 1;

        std::fs::create_dir(self.version_dir(name, version))?;
        write_atomic(&model_dir.join(HIGH_WATER), version.to_string().as_bytes())?;
        info!(name, version, "allocated model version");
        Ok(version)
    }

    fn high_water(&self, name: &str) -> Result<u32, StoreError> {
        match std::fs::read_to_string(self.root.join(name).join(HIGH_WATER)) {
            Ok(s) => s
                .trim()
                .parse()
                .map_err(|e| StoreError::Other(format!("corrupt high-water mark for {name}: {e}"))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    /// Every allocated version of `name`, ascending, published or not.
    pub fn versions(&self, name: &str) -> Result<Vec<u32>, StoreError> {
        check_name(name)?;
        let entries = match std::fs::read_dir(self.root.join(name)) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_dir()
                && let Some(v) = entry.file_name().to_str().and_then(|s| s.parse().ok())
            {
                versions.push(v);
            }
        }
        versions.sort_unstable();
        Ok(versions)
    }

    /// Versions of `name` with a manifest, ascending.
    pub fn published(&self, name: &str) -> Result<Vec<u32>, StoreError> {
        Ok(self
            .versions(name)?
            .into_iter()
            .filter(|&v| self.version_dir(name, v).join(MANIFEST).is_file())
            .collect())
    }

    /// Newest published version of `name`.
    pub fn latest(&self, name: &str) -> Result<u32, StoreError> {
        self.published(name)?
            .last()
            .copied()
            .ok_or_else(|| StoreError::UnknownModel(name.to_string()))
    }

    /// Write `components` into an allocated version and publish it.
    ///
    /// Components are written first; the manifest naming them is written
    /// last. A published version cannot be saved again.
    pub fn save(
        &self,
        name: &str,
        version: u32,
        components: &[(&str, Vec<u8>)],
    ) -> Result<Manifest, StoreError> {
        check_name(name)?;
        let dir = self.version_dir(name, version);
        if !dir.is_dir() {
            return Err(StoreError::UnknownVersion {
                name: name.to_string(),
                version,
            });
        }
        if dir.join(MANIFEST).exists() {
            return Err(StoreError::AlreadyPublished {
                name: name.to_string(),
                version,
            });
        }

        for (component, bytes) in components {
            check_name(component)?;
            if *component == MANIFEST {
                return Err(StoreError::InvalidName(component.to_string()));
            }
            write_atomic(&dir.join(component), bytes)?;
        }

        let manifest = Manifest {
            name: name.to_string(),
            version,
            created_at: Utc::now(),
            components: components.iter().map(|(c, _)| c.to_string()).collect(),
        };
        write_atomic(&dir.join(MANIFEST), &serde_json::to_vec_pretty(&manifest)?)?;
        info!(
            name,
            version,
            components = manifest.components.len(),
            "published model version"
        );
        Ok(manifest)
    }

    /// Read the manifest of a published version.
    pub fn manifest(&self, name: &str, version: u32) -> Result<Manifest, StoreError> {
        check_name(name)?;
        let dir = self.version_dir(name, version);
        if !dir.is_dir() {
            return Err(StoreError::UnknownVersion {
                name: name.to_string(),
                version,
            });
        }
        match std::fs::read(dir.join(MANIFEST)) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::IncompleteBundle {
                    name: name.to_string(),
                    version,
                    missing: vec![MANIFEST.to_string()],
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Load the `required` components of a published version.
    ///
    /// Fails with [`StoreError::IncompleteBundle`] unless every required
    /// component is listed in the manifest and present on disk.
    pub fn load(
        &self,
        name: &str,
        version: u32,
        required: &[&str],
    ) -> Result<BTreeMap<String, Vec<u8>>, StoreError> {
        let manifest = self.manifest(name, version)?;
        let dir = self.version_dir(name, version);

        let missing: Vec<String> = required
            .iter()
            .copied()
            .filter(|&c| !manifest.components.iter().any(|m| m == c) || !dir.join(c).is_file())
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(StoreError::IncompleteBundle {
                name: name.to_string(),
                version,
                missing,
            });
        }

        let mut out = BTreeMap::new();
        for component in required {
            out.insert(component.to_string(), std::fs::read(dir.join(component))?);
        }
        Ok(out)
    }

    /// Delete a version. Its number is never allocated again.
    pub fn remove(&self, name: &str, version: u32) -> Result<(), StoreError> {
        check_name(name)?;
        let dir = self.version_dir(name, version);
        if !dir.is_dir() {
            return Err(StoreError::UnknownVersion {
                name: name.to_string(),
                version,
            });
        }
        std::fs::remove_dir_all(&dir)?;
        info!(name, version, "removed model version");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> (tempfile::TempDir, ModelRegistry) {
        let tmp = tempfile::TempDir::new().unwrap();
        let registry = ModelRegistry::open(tmp.path().join("models")).unwrap();
        (tmp, registry)
    }

    fn parts() -> Vec<(&'static str, Vec<u8>)> {
        vec![
            ("vocabulary.json", b"{}".to_vec()),
            ("classifier.json", b"[]".to_vec()),
        ]
    }

    #[test]
    fn first_version_is_one() {
        let (_tmp, registry) = registry();
        assert_eq!(registry.allocate_version("NB_classif").unwrap(), 1);
        assert!(registry.version_dir("NB_classif", 1).is_dir());
    }

    #[test]
    fn versions_increase() {
        let (_tmp, registry) = registry();
        assert_eq!(registry.allocate_version("nb").unwrap(), 1);
        assert_eq!(registry.allocate_version("nb").unwrap(), 2);
        assert_eq!(registry.allocate_version("nb").unwrap(), 3);
        assert_eq!(registry.allocate_version("other").unwrap(), 1);
        assert_eq!(registry.versions("nb").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn removed_versions_never_reused() {
        let (_tmp, registry) = registry();
        for _ in 0..3 {
            registry.allocate_version("nb").unwrap();
        }
        registry.remove("nb", 2).unwrap();
        registry.remove("nb", 3).unwrap();
        assert_eq!(registry.versions("nb").unwrap(), vec![1]);
        assert_eq!(registry.allocate_version("nb").unwrap(), 4);
    }

    #[test]
    fn existing_directories_outrank_high_water() {
        let (_tmp, registry) = registry();
        registry.allocate_version("nb").unwrap();
        // A version directory created by hand, e.g. copied from another host.
        std::fs::create_dir_all(registry.version_dir("nb", 7)).unwrap();
        assert_eq!(registry.allocate_version("nb").unwrap(), 8);
    }

    #[test]
    fn save_then_load() {
        let (_tmp, registry) = registry();
        let v = registry.allocate_version("nb").unwrap();
        let manifest = registry.save("nb", v, &parts()).unwrap();
        assert_eq!(manifest.components, vec!["vocabulary.json", "classifier.json"]);

        let loaded = registry
            .load("nb", v, &["vocabulary.json", "classifier.json"])
            .unwrap();
        assert_eq!(loaded["vocabulary.json"], b"{}");
        assert_eq!(loaded["classifier.json"], b"[]");
        assert_eq!(registry.latest("nb").unwrap(), v);
    }

    #[test]
    fn unpublished_version_is_incomplete() {
        let (_tmp, registry) = registry();
        let v = registry.allocate_version("nb").unwrap();
        let result = registry.load("nb", v, &["vocabulary.json"]);
        assert!(matches!(
            result,
            Err(StoreError::IncompleteBundle { missing, .. }) if missing == vec![MANIFEST]
        ));
        assert!(matches!(
            registry.latest("nb"),
            Err(StoreError::UnknownModel(_))
        ));
    }

    #[test]
    fn missing_component_is_incomplete() {
        let (_tmp, registry) = registry();
        let v = registry.allocate_version("nb").unwrap();
        registry.save("nb", v, &parts()).unwrap();
        std::fs::remove_file(registry.version_dir("nb", v).join("classifier.json")).unwrap();

        let result = registry.load("nb", v, &["vocabulary.json", "classifier.json", "labels.json"]);
        match result {
            Err(StoreError::IncompleteBundle { missing, .. }) => {
                assert_eq!(missing, vec!["classifier.json", "labels.json"]);
            }
            other => panic!("expected IncompleteBundle, got {other:?}"),
        }
    }

    #[test]
    fn published_version_is_immutable() {
        let (_tmp, registry) = registry();
        let v = registry.allocate_version("nb").unwrap();
        registry.save("nb", v, &parts()).unwrap();
        assert!(matches!(
            registry.save("nb", v, &parts()),
            Err(StoreError::AlreadyPublished { .. })
        ));
    }

    #[test]
    fn save_requires_allocation() {
        let (_tmp, registry) = registry();
        assert!(matches!(
            registry.save("nb", 5, &parts()),
            Err(StoreError::UnknownVersion { version: 5, .. })
        ));
    }

    #[test]
    fn latest_skips_unpublished() {
        let (_tmp, registry) = registry();
        let v1 = registry.allocate_version("nb").unwrap();
        registry.save("nb", v1, &parts()).unwrap();
        let _v2 = registry.allocate_version("nb").unwrap();
        assert_eq!(registry.published("nb").unwrap(), vec![v1]);
        assert_eq!(registry.latest("nb").unwrap(), v1);
    }

    #[test]
    fn unknown_model_has_no_versions() {
        let (_tmp, registry) = registry();
        assert!(registry.versions("ghost").unwrap().is_empty());
        assert!(matches!(
            registry.manifest("ghost", 1),
            Err(StoreError::UnknownVersion { .. })
        ));
    }
}

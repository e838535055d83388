//! Pipeline configuration, loaded from an optional JSON file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ConfigError, LanguageCatalog};

/// Shared settings for scraping, training, and identification.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// DuckDB file holding the train/test corpus.
    pub corpus_db: PathBuf,
    /// Directory holding the train/test corpus as plain files.
    pub corpus_dir: PathBuf,
    /// Directory of scraped articles, one subdirectory per language.
    pub articles_dir: PathBuf,
    /// Root of the model registry.
    pub models_dir: PathBuf,
    /// Model name used for training and identification.
    pub model_name: String,
    /// Share of each language's words used for training; the rest is held out.
    pub train_fraction: f64,
    /// Words of corpus per language; extra words are discarded.
    pub min_words: usize,
    /// Articles requested per scrape batch.
    pub batch_size: usize,
    /// Words per evaluation chunk.
    pub chunk_size: usize,
    /// Minimum top posterior for a prediction to count as identified.
    pub min_confidence: f64,
    /// Scrape batches allowed per language before giving up.
    pub max_rounds: Option<usize>,
    /// Wall-clock budget per language, in seconds.
    pub deadline_secs: Option<u64>,
    /// JSON catalog file; the built-in catalog is used when unset.
    pub catalog: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            corpus_db: PathBuf::from("data/corpus.duckdb"),
            corpus_dir: PathBuf::from("data/corpus"),
            articles_dir: PathBuf::from("data/articles"),
            models_dir: PathBuf::from("models"),
            model_name: "NB_classif".to_string(),
            train_fraction: 0.9,
            min_words: 10_000,
            batch_size: 25,
            chunk_size: 30,
            min_confidence: 0.0,
            max_rounds: None,
            deadline_secs: None,
            catalog: None,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.train_fraction > 0.0 && self.train_fraction < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "train_fraction must be in (0, 1), got {}",
                self.train_fraction
            )));
        }
        if self.batch_size == 0 || self.batch_size > 100 {
            return Err(ConfigError::Invalid(format!(
                "batch_size must be in 1..=100, got {}",
                self.batch_size
            )));
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid("chunk_size must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ConfigError::Invalid(format!(
                "min_confidence must be in [0, 1], got {}",
                self.min_confidence
            )));
        }
        if self.model_name.is_empty() || self.model_name.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(format!(
                "model_name {:?} is not a valid directory name",
                self.model_name
            )));
        }
        Ok(())
    }

    /// The configured catalog, or the built-in one.
    pub fn catalog(&self) -> Result<LanguageCatalog, ConfigError> {
        match &self.catalog {
            Some(path) => LanguageCatalog::load(path),
            None => Ok(LanguageCatalog::default()),
        }
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        settings.validate().unwrap();
        assert_eq!(settings.train_fraction, 0.9);
        assert_eq!(settings.chunk_size, 30);
        assert_eq!(settings.batch_size, 25);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{"model_name": "nb_v2", "min_words": 500}"#).unwrap();
        assert_eq!(settings.model_name, "nb_v2");
        assert_eq!(settings.min_words, 500);
        assert_eq!(settings.models_dir, PathBuf::from("models"));
        assert!(settings.deadline().is_none());
    }

    #[test]
    fn invalid_fraction_rejected() {
        let result = Settings::from_json(r#"{"train_fraction": 1.0}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn oversized_batch_rejected() {
        let result = Settings::from_json(r#"{"batch_size": 500}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn model_name_with_separator_rejected() {
        let result = Settings::from_json(r#"{"model_name": "../escape"}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn deadline_in_seconds() {
        let settings = Settings::from_json(r#"{"deadline_secs": 90}"#).unwrap();
        assert_eq!(settings.deadline(), Some(Duration::from_secs(90)));
    }
}

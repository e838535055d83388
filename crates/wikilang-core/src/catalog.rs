//! Supported languages and their class positions.
//!
//! The position of a language in the catalog is its class index in every
//! model trained against that catalog. Reordering the catalog invalidates
//! previously trained bundles, so catalogs are only ever appended to.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ConfigError;

/// Most-article Wikipedias (Waray excluded): name, code, articles, active users.
const WIKIPEDIA_TOP: &[(&str, &str, u64, u64)] = &[
    ("English", "en", 6_251_473, 40_971_086),
    ("Cebuano", "ceb", 5_525_120, 75_812),
    ("Swedish", "sv", 3_417_156, 762_664),
    ("German", "de", 2_538_143, 3_642_783),
    ("French", "fr", 2_300_250, 4_018_582),
    ("Dutch", "nl", 2_045_761, 1_123_270),
    ("Russian", "ru", 1_699_933, 2_924_014),
    ("Italian", "it", 1_674_804, 2_083_500),
    ("Spanish", "es", 1_661_352, 6_122_869),
    ("Polish", "pl", 1_457_390, 1_084_637),
    ("Vietnamese", "vi", 1_261_526, 787_725),
    ("Japanese", "ja", 1_254_240, 1_751_078),
    ("Egyptian Arabic", "arz", 1_202_137, 146_896),
    ("Chinese", "zh", 1_177_896, 3_051_388),
];

/// A supported language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    /// Display name, e.g. "French".
    pub name: String,
    /// Short code, also the Wikipedia subdomain, e.g. "fr".
    pub code: String,
    /// Article count of the language's Wikipedia.
    #[serde(default)]
    pub articles: Option<u64>,
    /// Active user count of the language's Wikipedia.
    #[serde(default)]
    pub users: Option<u64>,
}

impl Language {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            articles: None,
            users: None,
        }
    }

    pub fn with_stats(mut self, articles: u64, users: u64) -> Self {
        self.articles = Some(articles);
        self.users = Some(users);
        self
    }

    /// Articles to request per scrape batch.
    ///
    /// Capped at the wiki's article count so small wikis are never asked for
    /// more random articles than they hold.
    pub fn batch_size(&self, default: usize) -> usize {
        match self.articles {
            Some(n) => default.min(usize::try_from(n).unwrap_or(usize::MAX)),
            None => default,
        }
    }
}

/// Ordered set of languages with unique codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Language>", into = "Vec<Language>")]
pub struct LanguageCatalog {
    languages: Vec<Language>,
}

impl LanguageCatalog {
    /// Build a catalog, rejecting empty lists and duplicate codes.
    pub fn new(languages: Vec<Language>) -> Result<Self, ConfigError> {
        if languages.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        let mut seen = HashSet::with_capacity(languages.len());
        for lang in &languages {
            if !seen.insert(lang.code.as_str()) {
                return Err(ConfigError::DuplicateCode(lang.code.clone()));
            }
        }
        Ok(Self { languages })
    }

    /// The fourteen largest Wikipedias by article count.
    pub fn wikipedia_top() -> Self {
        let languages = WIKIPEDIA_TOP
            .iter()
            .map(|&(name, code, articles, users)| {
                Language::new(name, code).with_stats(articles, users)
            })
            .collect();
        Self { languages }
    }

    /// Parse a catalog from a JSON array of languages.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json(&json)?;
        debug!(path = %path.display(), languages = catalog.len(), "loaded catalog");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Language> {
        self.languages.iter()
    }

    /// Language at class index `index`.
    pub fn get(&self, index: usize) -> Option<&Language> {
        self.languages.get(index)
    }

    /// Class index of `code`.
    pub fn index_of(&self, code: &str) -> Option<usize> {
        self.languages.iter().position(|l| l.code == code)
    }

    pub fn by_code(&self, code: &str) -> Option<&Language> {
        self.languages.iter().find(|l| l.code == code)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.languages.iter().map(|l| l.code.as_str())
    }

    /// Restrict the catalog to `codes`, keeping catalog order.
    pub fn subset<S: AsRef<str>>(&self, codes: &[S]) -> Result<Self, ConfigError> {
        for code in codes {
            if self.index_of(code.as_ref()).is_none() {
                return Err(ConfigError::UnknownLanguage(code.as_ref().to_string()));
            }
        }
        let languages = self
            .languages
            .iter()
            .filter(|l| codes.iter().any(|c| c.as_ref() == l.code))
            .cloned()
            .collect();
        Self::new(languages)
    }
}

impl Default for LanguageCatalog {
    fn default() -> Self {
        Self::wikipedia_top()
    }
}

impl TryFrom<Vec<Language>> for LanguageCatalog {
    type Error = ConfigError;

    fn try_from(languages: Vec<Language>) -> Result<Self, Self::Error> {
        Self::new(languages)
    }
}

impl From<LanguageCatalog> for Vec<Language> {
    fn from(catalog: LanguageCatalog) -> Self {
        catalog.languages
    }
}

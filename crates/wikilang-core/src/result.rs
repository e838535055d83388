//! Identification outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::LanguageCatalog;

/// Label returned when no trained language matches.
pub const UNDETERMINED: &str = "undetermined";

/// Outcome of identifying a text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageResult {
    /// A trained language, by short code.
    Known(String),
    /// No trained language matched with enough confidence.
    Undetermined,
}

impl LanguageResult {
    pub fn known(code: impl Into<String>) -> Self {
        Self::Known(code.into())
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    /// The short code, if a language was identified.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Known(code) => Some(code),
            Self::Undetermined => None,
        }
    }

    /// The short code, or [`UNDETERMINED`].
    pub fn as_str(&self) -> &str {
        self.code().unwrap_or(UNDETERMINED)
    }

    /// Display name from `catalog`, falling back to the code.
    pub fn display_name<'a>(&'a self, catalog: &'a LanguageCatalog) -> &'a str {
        match self {
            Self::Known(code) => catalog
                .by_code(code)
                .map(|l| l.name.as_str())
                .unwrap_or(code),
            Self::Undetermined => UNDETERMINED,
        }
    }
}

impl fmt::Display for LanguageResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response body of an identification request: `{"language": "fr"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identification {
    pub language: String,
}

impl Identification {
    /// Render the result by short code.
    pub fn by_code(result: &LanguageResult) -> Self {
        Self {
            language: result.as_str().to_string(),
        }
    }

    /// Render the result by display name.
    pub fn by_name(result: &LanguageResult, catalog: &LanguageCatalog) -> Self {
        Self {
            language: result.display_name(catalog).to_string(),
        }
    }
}

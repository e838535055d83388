use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("duplicate language code in catalog: {0}")]
    DuplicateCode(String),

    #[error("language catalog is empty")]
    EmptyCatalog,

    #[error("language not in catalog: {0}")]
    UnknownLanguage(String),

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid setting: {0}")]
    Invalid(String),
}

use thiserror::Error;
use wikilang_store::StoreError;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("no training text for language {0}")]
    EmptyCorpus(String),

    #[error("cannot fit on zero documents")]
    NoDocuments,

    #[error("min confidence must be in [0, 1], got {0}")]
    Confidence(f64),

    #[error("inconsistent model shape: {0}")]
    Shape(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

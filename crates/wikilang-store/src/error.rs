use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no corpus stored for language {0}")]
    NotFound(String),

    #[error("no results for query")]
    NoResults,

    #[error("invalid name for on-disk storage: {0:?}")]
    InvalidName(String),

    #[error("model {0} has no published versions")]
    UnknownModel(String),

    #[error("model {name} version {version} was never allocated")]
    UnknownVersion { name: String, version: u32 },

    #[error("model {name} version {version} is already published")]
    AlreadyPublished { name: String, version: u32 },

    #[error("model {name} version {version} is incomplete, missing {missing:?}")]
    IncompleteBundle {
        name: String,
        version: u32,
        missing: Vec<String>,
    },

    #[cfg(feature = "duckdb")]
    #[error("duckdb error: {0}")]
    DuckDb(#[from] ::duckdb::Error),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not persist file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

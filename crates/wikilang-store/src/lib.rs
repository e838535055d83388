//! Storage layer: language corpora (DuckDB or plain files), scraped articles,
//! and the versioned model registry.

mod error;
mod fs;

pub mod articles;
pub mod corpus;
pub mod dir;
pub mod registry;

pub use articles::ArticleDir;
pub use corpus::{CorpusStore, Partition, Role};
pub use dir::DirStore;
pub use error::StoreError;
pub use registry::{Manifest, ModelRegistry};

#[cfg(feature = "duckdb")]
mod duck;
#[cfg(feature = "duckdb")]
pub use duck::DuckStore;

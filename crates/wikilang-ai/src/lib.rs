//! Language identification: TF-IDF features, multinomial naive Bayes,
//! versioned model bundles, and held-out evaluation.

mod error;

pub mod bayes;
pub mod bundle;
pub mod evaluate;
pub mod features;
pub mod identify;
pub mod labels;
pub mod train;

#[cfg(test)]
pub(crate) mod fixtures;

pub use bayes::MultinomialNb;
pub use bundle::ModelBundle;
pub use error::ModelError;
pub use evaluate::{ConfusionMatrix, DEFAULT_CHUNK_SIZE, evaluate, evaluate_corpus};
pub use features::{FeatureSpace, SparseVector};
pub use identify::Identifier;
pub use labels::LabelEncoder;
pub use train::train;

//! Corpus acquisition: random Wikipedia articles, cleaned and stored until a
//! language reaches its word budget.

mod error;

pub mod acquire;
pub mod backfill;
pub mod source;
pub mod wiki;

pub use acquire::{Article, MAX_PER_CALL, fetch_articles};
pub use backfill::{Backfill, BackfillBudget, ensure_word_budget, partition_language};
pub use error::ScrapeError;
pub use source::{ArticleSource, RawArticle};
pub use wiki::WikiClient;

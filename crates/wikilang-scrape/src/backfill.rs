//! Bring a language's scraped articles up to a word budget, then partition
//! them into the corpus store.

use std::pin::pin;
use std::time::Duration;

use futures::TryStreamExt;
use tokio::time::Instant;
use tracing::{info, warn};
use wikilang_core::{Language, Settings};
use wikilang_store::{ArticleDir, CorpusStore, Partition};

use crate::ScrapeError;
use crate::acquire::fetch_articles;
use crate::source::ArticleSource;

/// Limits on how long a backfill may keep asking the source for articles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackfillBudget {
    /// Articles requested per round, before the per-language cap.
    pub batch_size: usize,
    /// Rounds allowed; unbounded when `None`.
    pub max_rounds: Option<usize>,
    /// Wall-clock limit across all rounds; unbounded when `None`.
    pub deadline: Option<Duration>,
}

impl Default for BackfillBudget {
    fn default() -> Self {
        Self {
            batch_size: 25,
            max_rounds: None,
            deadline: None,
        }
    }
}

impl BackfillBudget {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            batch_size: settings.batch_size,
            max_rounds: settings.max_rounds,
            deadline: settings.deadline(),
        }
    }
}

/// Outcome of [`ensure_word_budget`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backfill {
    /// Words on disk for the language when the backfill stopped.
    pub words: usize,
    /// Scrape rounds performed.
    pub rounds: usize,
    /// Whether `words` reached the requested budget.
    pub complete: bool,
}

/// Scrape batches of articles for `language` into `articles` until its word
/// count reaches `min_words` or `budget` runs out.
///
/// Stops early, incomplete, when a round adds no words (the source has
/// nothing new to give). Articles already on disk count toward the budget,
/// so an interrupted backfill resumes where it left off. Source errors abort
/// the backfill; whatever was written before the error stays on disk.
pub async fn ensure_word_budget<S>(
    source: &S,
    articles: &ArticleDir,
    language: &Language,
    min_words: usize,
    budget: &BackfillBudget,
) -> Result<Backfill, ScrapeError>
where
    S: ArticleSource + ?Sized,
{
    let code = language.code.as_str();
    let batch = language.batch_size(budget.batch_size);
    let started = Instant::now();
    let mut words = articles.word_count(code)?;
    let mut rounds = 0;

    while words < min_words {
        if budget.max_rounds.is_some_and(|max| rounds >= max) {
            warn!(language = code, rounds, words, min_words, "round budget exhausted");
            break;
        }
        let remaining = match budget.deadline {
            Some(limit) => match limit.checked_sub(started.elapsed()) {
                Some(left) if !left.is_zero() => Some(left),
                _ => {
                    warn!(language = code, rounds, words, min_words, "deadline reached");
                    break;
                }
            },
            None => None,
        };

        rounds += 1;
        let round = scrape_round(source, articles, code, batch);
        let written = match remaining {
            Some(left) => match tokio::time::timeout(left, round).await {
                Ok(result) => result?,
                Err(_) => {
                    words = articles.word_count(code)?;
                    warn!(language = code, rounds, words, min_words, "deadline reached mid-round");
                    break;
                }
            },
            None => round.await?,
        };

        let before = words;
        words = articles.word_count(code)?;
        info!(language = code, round = rounds, written, words, min_words, "scrape round done");
        if words <= before {
            warn!(language = code, rounds, words, "round added no words; stopping");
            break;
        }
    }

    Ok(Backfill {
        words,
        rounds,
        complete: words >= min_words,
    })
}

/// One batch of articles written to disk; returns how many were stored.
async fn scrape_round<S>(
    source: &S,
    articles: &ArticleDir,
    language: &str,
    count: usize,
) -> Result<usize, ScrapeError>
where
    S: ArticleSource + ?Sized,
{
    let mut stream = pin!(fetch_articles(source, language, count));
    let mut written = 0;
    while let Some(article) = stream.try_next().await? {
        if articles.write(language, &article.title, &article.text)?.is_some() {
            written += 1;
        }
    }
    Ok(written)
}

/// Split the first `min_words` words of a language's articles into
/// held-out and training text and store them, replacing any earlier split.
pub fn partition_language(
    store: &dyn CorpusStore,
    articles: &ArticleDir,
    language: &str,
    min_words: usize,
    train_fraction: f64,
) -> Result<Partition, ScrapeError> {
    let words = articles.words(language)?;
    if words.len() < min_words {
        warn!(
            language,
            words = words.len(),
            min_words,
            "partitioning fewer words than the budget"
        );
    }
    let partition = Partition::split(words.iter().map(String::as_str), min_words, train_fraction);
    store.write_partition(language, &partition.train, &partition.test)?;
    info!(
        language,
        train_words = partition.train_words(),
        test_words = partition.test_words(),
        "stored corpus partition"
    );
    Ok(partition)
}

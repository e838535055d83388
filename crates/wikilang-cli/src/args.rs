//! Command line arguments.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use wikilang_core::{LanguageCatalog, Settings};

/// Identify the language of a text with a model trained on Wikipedia articles.
#[derive(Parser, Debug)]
#[command(name = "wikilang", version, about)]
pub struct Cli {
    /// JSON settings file; flags below override its values
    #[arg(long, global = true, env = "WIKILANG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Root of the model registry
    #[arg(long, global = true, env = "WIKILANG_MODELS_DIR")]
    pub models_dir: Option<PathBuf>,

    /// Model name to train or load
    #[arg(long, global = true, env = "WIKILANG_MODEL")]
    pub model: Option<String>,

    /// Where train/test corpora are stored
    #[arg(long, global = true, value_enum, env = "WIKILANG_BACKEND", default_value_t = Backend::Duckdb)]
    pub backend: Backend,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Embedded DuckDB file (`corpus_db`)
    Duckdb,
    /// Plain text files (`corpus_dir`)
    Dir,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape articles until each language has its word budget, then store
    /// train/test partitions
    Scrape(ScrapeArgs),
    /// Fit and publish a new model version from the stored corpus
    Train(TrainArgs),
    /// Identify the language of a text, printed as JSON
    Identify(IdentifyArgs),
    /// Confusion matrix of a model on the held-out corpus
    Evaluate(EvaluateArgs),
    /// List versions of a model
    Versions,
    /// Show the language catalog
    Catalog,
}

#[derive(Args, Debug)]
pub struct ScrapeArgs {
    /// Language codes to scrape (default: whole catalog)
    #[arg(long, value_delimiter = ',')]
    pub languages: Vec<String>,

    /// Words per language
    #[arg(long)]
    pub min_words: Option<usize>,

    /// Scrape rounds per language before giving up
    #[arg(long)]
    pub max_rounds: Option<usize>,

    /// Seconds per language before giving up
    #[arg(long)]
    pub deadline_secs: Option<u64>,

    /// Only re-partition articles already on disk
    #[arg(long)]
    pub offline: bool,
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Language codes to train on (default: whole catalog)
    #[arg(long, value_delimiter = ',')]
    pub languages: Vec<String>,
}

#[derive(Args, Debug)]
pub struct IdentifyArgs {
    /// Text to identify
    pub text: String,

    /// Model version (default: latest published)
    #[arg(long)]
    pub version: Option<u32>,

    /// Report language names instead of codes
    #[arg(long)]
    pub names: bool,

    /// Report "undetermined" below this posterior probability
    #[arg(long)]
    pub min_confidence: Option<f64>,
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Model version (default: latest published)
    #[arg(long)]
    pub version: Option<u32>,

    /// Words per evaluation window
    #[arg(long)]
    pub chunk_size: Option<usize>,
}

impl Cli {
    /// Settings from the config file (or defaults) with global flags applied.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)
                .with_context(|| format!("loading settings from {}", path.display()))?,
            None => Settings::default(),
        };
        if let Some(dir) = &self.models_dir {
            settings.models_dir = dir.clone();
        }
        if let Some(model) = &self.model {
            settings.model_name = model.clone();
        }
        settings.validate()?;
        Ok(settings)
    }
}

/// The configured catalog, narrowed to `codes` when any are given.
pub fn catalog(settings: &Settings, codes: &[String]) -> anyhow::Result<LanguageCatalog> {
    let catalog = settings.catalog().context("loading language catalog")?;
    if codes.is_empty() {
        Ok(catalog)
    } else {
        Ok(catalog.subset(codes)?)
    }
}

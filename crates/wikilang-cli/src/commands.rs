//! Subcommand handlers.

use anyhow::Context;
use tracing::info;
use wikilang_ai::{Identifier, ModelBundle, evaluate_corpus, train};
use wikilang_core::{Identification, Settings};
use wikilang_scrape::WikiClient;
use wikilang_store::{CorpusStore, DirStore, DuckStore, ModelRegistry, StoreError};

use crate::args::{self, Backend, Cli, Command, EvaluateArgs, IdentifyArgs, ScrapeArgs, TrainArgs};
use crate::display;
use crate::pipeline;

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut settings = cli.settings()?;
    match cli.command {
        Command::Scrape(ref a) => {
            if let Some(n) = a.min_words {
                settings.min_words = n;
            }
            if a.max_rounds.is_some() {
                settings.max_rounds = a.max_rounds;
            }
            if a.deadline_secs.is_some() {
                settings.deadline_secs = a.deadline_secs;
            }
            scrape(&settings, cli.backend, a).await
        }
        Command::Train(ref a) => train_model(&settings, cli.backend, a),
        Command::Identify(ref a) => identify(&settings, a),
        Command::Evaluate(ref a) => evaluate(&settings, cli.backend, a),
        Command::Versions => versions(&settings),
        Command::Catalog => {
            display::print_catalog(&args::catalog(&settings, &[])?);
            Ok(())
        }
    }
}

fn open_corpus(settings: &Settings, backend: Backend) -> anyhow::Result<Box<dyn CorpusStore>> {
    Ok(match backend {
        Backend::Duckdb => Box::new(
            DuckStore::open_persistent(&settings.corpus_db)
                .with_context(|| format!("opening {}", settings.corpus_db.display()))?,
        ),
        Backend::Dir => Box::new(
            DirStore::open(&settings.corpus_dir)
                .with_context(|| format!("opening {}", settings.corpus_dir.display()))?,
        ),
    })
}

fn open_registry(settings: &Settings) -> anyhow::Result<ModelRegistry> {
    ModelRegistry::open(&settings.models_dir)
        .with_context(|| format!("opening model registry {}", settings.models_dir.display()))
}

async fn scrape(settings: &Settings, backend: Backend, a: &ScrapeArgs) -> anyhow::Result<()> {
    let catalog = args::catalog(settings, &a.languages)?;
    let corpus = open_corpus(settings, backend)?;
    let client = WikiClient::new()?;

    eprintln!("Scraping {} languages", catalog.len());
    let stats =
        pipeline::run_scrape_pipeline(&client, corpus.as_ref(), &catalog, settings, a.offline).await?;
    eprintln!(
        "Stored {} languages in {:.1}s",
        stats.languages, stats.elapsed_secs
    );
    if !stats.incomplete.is_empty() {
        eprintln!(
            "  Below {} words: {}",
            settings.min_words,
            stats.incomplete.join(", ")
        );
    }
    if stats.interrupted {
        anyhow::bail!("scrape interrupted");
    }
    Ok(())
}

fn train_model(settings: &Settings, backend: Backend, a: &TrainArgs) -> anyhow::Result<()> {
    let catalog = args::catalog(settings, &a.languages)?;
    let corpus = open_corpus(settings, backend)?;
    let registry = open_registry(settings)?;

    let version = train(&registry, &settings.model_name, corpus.as_ref(), &catalog)
        .with_context(|| format!("training {}", settings.model_name))?;
    info!(model = %settings.model_name, version, "training complete");
    println!("{} v{}", settings.model_name, version);
    Ok(())
}

fn identify(settings: &Settings, a: &IdentifyArgs) -> anyhow::Result<()> {
    let registry = open_registry(settings)?;
    let identifier = Identifier::load(&registry, &settings.model_name, a.version)
        .with_context(|| format!("loading model {}", settings.model_name))?
        .with_min_confidence(a.min_confidence.unwrap_or(settings.min_confidence))?;

    let result = identifier.identify(&a.text);
    let response = if a.names {
        let catalog = identifier.bundle().labels().catalog()?;
        Identification::by_name(&result, &catalog)
    } else {
        Identification::by_code(&result)
    };
    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}

fn evaluate(settings: &Settings, backend: Backend, a: &EvaluateArgs) -> anyhow::Result<()> {
    let registry = open_registry(settings)?;
    let version = match a.version {
        Some(v) => v,
        None => registry.latest(&settings.model_name)?,
    };
    let bundle = ModelBundle::load(&registry, &settings.model_name, version)
        .with_context(|| format!("loading {} v{version}", settings.model_name))?;
    let corpus = open_corpus(settings, backend)?;

    let matrix = evaluate_corpus(&bundle, corpus.as_ref(), a.chunk_size.unwrap_or(settings.chunk_size))?;
    println!("=== {} v{} ===", settings.model_name, version);
    display::print_confusion(&matrix)
}

fn versions(settings: &Settings) -> anyhow::Result<()> {
    let registry = open_registry(settings)?;
    let name = &settings.model_name;
    let mut listed = Vec::new();
    for version in registry.versions(name)? {
        let manifest = match registry.manifest(name, version) {
            Ok(m) => Some(m),
            Err(StoreError::IncompleteBundle { .. }) => None,
            Err(e) => return Err(e.into()),
        };
        listed.push((version, manifest));
    }
    display::print_versions(name, &listed);
    Ok(())
}

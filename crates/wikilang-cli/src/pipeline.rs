//! Scrape pipeline: backfill each language's articles, then partition them
//! into the corpus store.

use std::time::Instant;

use anyhow::Context;
use wikilang_core::{LanguageCatalog, Settings};
use wikilang_scrape::{ArticleSource, BackfillBudget, ensure_word_budget, partition_language};
use wikilang_store::{ArticleDir, CorpusStore};

pub struct ScrapeStats {
    pub languages: usize,
    pub incomplete: Vec<String>,
    pub interrupted: bool,
    pub elapsed_secs: f64,
}

/// Run backfill and partitioning for every language in `catalog`.
///
/// Ctrl-C stops the current language's backfill; articles already on disk
/// are kept and no further languages are processed. With `offline`, only the
/// partitioning step runs.
pub async fn run_scrape_pipeline(
    source: &dyn ArticleSource,
    corpus: &dyn CorpusStore,
    catalog: &LanguageCatalog,
    settings: &Settings,
    offline: bool,
) -> anyhow::Result<ScrapeStats> {
    let start = Instant::now();
    let articles = ArticleDir::new(&settings.articles_dir);
    let budget = BackfillBudget::from_settings(settings);
    let mut stats = ScrapeStats {
        languages: 0,
        incomplete: Vec::new(),
        interrupted: false,
        elapsed_secs: 0.0,
    };

    for language in catalog.iter() {
        let code = language.code.as_str();

        if !offline {
            eprintln!("  {} ({code}): scraping toward {} words", language.name, settings.min_words);
            let backfill = tokio::select! {
                result = ensure_word_budget(source, &articles, language, settings.min_words, &budget) => {
                    result.with_context(|| format!("scraping {code}"))?
                }
                _ = tokio::signal::ctrl_c() => {
                    eprintln!("  Interrupted; articles scraped so far are kept");
                    stats.interrupted = true;
                    break;
                }
            };
            eprintln!(
                "  {code}: {} words after {} rounds",
                backfill.words, backfill.rounds
            );
            if !backfill.complete {
                stats.incomplete.push(code.to_string());
            }
        }

        let partition = partition_language(
            corpus,
            &articles,
            code,
            settings.min_words,
            settings.train_fraction,
        )
        .with_context(|| format!("partitioning {code}"))?;
        eprintln!(
            "  {code}: stored {} train / {} test words",
            partition.train_words(),
            partition.test_words()
        );
        stats.languages += 1;
    }

    stats.elapsed_secs = start.elapsed().as_secs_f64();
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use wikilang_ai::{Identifier, evaluate_corpus, train};
    use wikilang_core::LanguageResult;
    use wikilang_scrape::{RawArticle, ScrapeError};
    use wikilang_store::{DirStore, ModelRegistry};

    const ENGLISH: &[&str] = &[
        "The river flows through the old city and past the market square.",
        "People in the town gather every morning to buy bread and fresh fruit.",
        "Scientists have studied the history of the mountains for many years.",
        "The government announced a new plan for schools and public libraries.",
        "During the summer the weather is warm and the evenings are long.",
        "Her brother works at the university where he teaches modern literature.",
    ];

    const FRENCH: &[&str] = &[
        "La rivière traverse la vieille ville et passe devant la place du marché.",
        "Les habitants du village se réunissent chaque matin pour acheter du pain.",
        "Les chercheurs ont étudié l'histoire des montagnes pendant de nombreuses années.",
        "Le gouvernement a annoncé un nouveau projet pour les écoles et les bibliothèques.",
        "Pendant l'été le temps est chaud et les soirées sont longues.",
        "Son frère travaille à l'université où il enseigne la littérature moderne.",
    ];

    /// Source for offline runs; never consulted.
    struct Offline;

    #[async_trait]
    impl ArticleSource for Offline {
        async fn fetch_random_article_ids(
            &self,
            _language: &str,
            _count: usize,
        ) -> Result<Vec<u64>, ScrapeError> {
            panic!("offline pipeline fetched ids");
        }

        async fn fetch_article_body(
            &self,
            _language: &str,
            _id: u64,
        ) -> Result<Option<RawArticle>, ScrapeError> {
            panic!("offline pipeline fetched a body");
        }
    }

    /// Three articles of about 500 words each, sentences rotated per article.
    fn write_articles(articles: &ArticleDir, code: &str, sentences: &[&str]) {
        for n in 0..3 {
            let mut text = Vec::new();
            for round in 0..7 {
                for i in 0..sentences.len() {
                    text.push(sentences[(i + n + round) % sentences.len()]);
                }
            }
            articles
                .write(code, &format!("{code} article {n}"), &text.join(" "))
                .unwrap();
        }
    }

    #[tokio::test]
    async fn scrape_split_train_identify() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = Settings {
            articles_dir: tmp.path().join("articles"),
            corpus_dir: tmp.path().join("corpus"),
            models_dir: tmp.path().join("models"),
            min_words: 1000,
            ..Settings::default()
        };
        let codes = ["en".to_string(), "fr".to_string()];
        let catalog = crate::args::catalog(&settings, &codes).unwrap();
        let articles = ArticleDir::new(&settings.articles_dir);
        write_articles(&articles, "en", ENGLISH);
        write_articles(&articles, "fr", FRENCH);
        assert!(articles.word_count("en").unwrap() > 1000);

        let corpus = DirStore::open(&settings.corpus_dir).unwrap();
        let stats = run_scrape_pipeline(&Offline, &corpus, &catalog, &settings, true)
            .await
            .unwrap();
        assert_eq!(stats.languages, 2);
        assert!(!stats.interrupted);

        for code in ["en", "fr"] {
            let p = corpus.read_partition(code).unwrap();
            assert_eq!(p.train_words(), 900);
            assert_eq!(p.test_words(), 100);
            // Held-out text is the head of the word stream.
            let words = articles.words(code).unwrap();
            assert_eq!(p.test, words[..100].join(" "));
            assert_eq!(p.train, words[100..1000].join(" "));
        }

        let registry = ModelRegistry::open(&settings.models_dir).unwrap();
        let version = train(&registry, &settings.model_name, &corpus, &catalog).unwrap();
        assert_eq!(version, 1);

        let identifier = Identifier::load(&registry, &settings.model_name, None).unwrap();
        assert_eq!(
            identifier.identify("The weather in the city is warm"),
            LanguageResult::known("en")
        );
        assert_eq!(
            identifier.identify("Le temps dans la ville est chaud"),
            LanguageResult::known("fr")
        );
        assert_eq!(identifier.identify(""), LanguageResult::Undetermined);

        let matrix = evaluate_corpus(identifier.bundle(), &corpus, settings.chunk_size).unwrap();
        assert!(matrix.is_diagonal_dominant());
    }
}

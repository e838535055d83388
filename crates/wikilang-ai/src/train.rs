//! Training entry point: corpus in, published model version out.

use tracing::{info, warn};
use wikilang_core::LanguageCatalog;
use wikilang_store::{CorpusStore, ModelRegistry, StoreError};

use crate::ModelError;
use crate::bundle::ModelBundle;
use crate::labels::LabelEncoder;

/// Fit a bundle on the training text of every language in `catalog` and
/// publish it as the next version of `model_name`.
///
/// Each language contributes one document, its whole training partition, and
/// its catalog position is its class index. A language without stored
/// training text aborts the run before anything is written to the registry.
pub fn train(
    registry: &ModelRegistry,
    model_name: &str,
    corpus: &dyn CorpusStore,
    catalog: &LanguageCatalog,
) -> Result<u32, ModelError> {
    let labels = LabelEncoder::from_catalog(catalog);
    let mut docs = Vec::with_capacity(catalog.len());
    let mut targets = Vec::with_capacity(catalog.len());

    for (index, language) in catalog.iter().enumerate() {
        let partition = match corpus.read_partition(&language.code) {
            Ok(p) => p,
            Err(StoreError::NotFound(_)) => {
                return Err(ModelError::EmptyCorpus(language.code.clone()));
            }
            Err(e) => return Err(e.into()),
        };
        if partition.train.trim().is_empty() {
            return Err(ModelError::EmptyCorpus(language.code.clone()));
        }
        if partition.test.trim().is_empty() {
            warn!(language = %language.code, "no held-out text stored");
        }
        info!(
            language = %language.code,
            train_words = partition.train_words(),
            "loaded training text"
        );
        docs.push(partition.train);
        targets.push(index);
    }

    let bundle = ModelBundle::fit(labels, &docs, &targets)?;
    info!(
        model = model_name,
        classes = bundle.labels().len(),
        features = bundle.features().n_features(),
        "fitted model"
    );

    let version = registry.allocate_version(model_name)?;
    if let Err(e) = bundle.save(registry, model_name, version) {
        // Leave no unpublished directory behind; the number stays burned.
        let _ = registry.remove(model_name, version);
        return Err(e);
    }
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use wikilang_core::LanguageResult;
    use wikilang_store::DirStore;

    #[test]
    fn first_training_run_is_version_one() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = fixtures::en_fr_corpus(&dir.path().join("corpus"));
        let registry = ModelRegistry::open(dir.path().join("models")).unwrap();

        let v1 = train(&registry, "NB_classif", &corpus, &fixtures::en_fr_catalog()).unwrap();
        assert_eq!(v1, 1);
        let v2 = train(&registry, "NB_classif", &corpus, &fixtures::en_fr_catalog()).unwrap();
        assert_eq!(v2, 2);
        assert_eq!(registry.published("NB_classif").unwrap(), vec![1, 2]);
    }

    #[test]
    fn trained_bundle_identifies_training_languages() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = fixtures::en_fr_corpus(&dir.path().join("corpus"));
        let registry = ModelRegistry::open(dir.path().join("models")).unwrap();
        let version = train(&registry, "m", &corpus, &fixtures::en_fr_catalog()).unwrap();

        let bundle = ModelBundle::load(&registry, "m", version).unwrap();
        let predicted = bundle.predict(&["Le commerce n'est pas un monstre"]);
        assert_eq!(bundle.decode(predicted[0]), LanguageResult::known("fr"));
    }

    #[test]
    fn missing_language_aborts_without_allocating() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = DirStore::open(dir.path().join("corpus")).unwrap();
        corpus
            .write_partition("en", fixtures::ENGLISH, fixtures::ENGLISH_HELD_OUT)
            .unwrap();
        let registry = ModelRegistry::open(dir.path().join("models")).unwrap();

        let err = train(&registry, "m", &corpus, &fixtures::en_fr_catalog()).unwrap_err();
        assert!(matches!(err, ModelError::EmptyCorpus(ref code) if code == "fr"));
        assert!(registry.versions("m").unwrap().is_empty());
    }

    #[test]
    fn blank_training_text_is_empty_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = fixtures::en_fr_corpus(&dir.path().join("corpus"));
        corpus.write_partition("fr", "   ", "").unwrap();
        let registry = ModelRegistry::open(dir.path().join("models")).unwrap();

        assert!(matches!(
            train(&registry, "m", &corpus, &fixtures::en_fr_catalog()),
            Err(ModelError::EmptyCorpus(_))
        ));
    }
}

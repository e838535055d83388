//! The deployable unit: feature space, classifier, and label encoding.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use tracing::info;
use wikilang_core::LanguageResult;
use wikilang_store::{Manifest, ModelRegistry};

use crate::ModelError;
use crate::bayes::MultinomialNb;
use crate::features::{FeatureSpace, IdfWeights, SparseVector, Vocabulary};
use crate::labels::LabelEncoder;

pub const VOCABULARY: &str = "vocabulary.json";
pub const IDF: &str = "idf.json";
pub const CLASSIFIER: &str = "classifier.json";
pub const LABELS: &str = "labels.json";

/// Every component a bundle is stored as.
pub const COMPONENTS: [&str; 4] = [VOCABULARY, IDF, CLASSIFIER, LABELS];

/// Laplace smoothing used for training.
pub const DEFAULT_ALPHA: f64 = 1.0;

/// A fitted model, immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelBundle {
    features: FeatureSpace,
    classifier: MultinomialNb,
    labels: LabelEncoder,
}

impl ModelBundle {
    /// Fit feature space and classifier on `docs`, where `targets[i]` is the
    /// class index of `docs[i]` under `labels`.
    pub fn fit<S: AsRef<str>>(
        labels: LabelEncoder,
        docs: &[S],
        targets: &[usize],
    ) -> Result<Self, ModelError> {
        if docs.is_empty() {
            return Err(ModelError::NoDocuments);
        }
        let (features, x) = FeatureSpace::fit_transform(docs);
        let classifier = MultinomialNb::fit(
            &x,
            targets,
            labels.len(),
            features.n_features(),
            DEFAULT_ALPHA,
        )?;
        Ok(Self {
            features,
            classifier,
            labels,
        })
    }

    fn from_parts(
        features: FeatureSpace,
        classifier: MultinomialNb,
        labels: LabelEncoder,
    ) -> Result<Self, ModelError> {
        labels.validate()?;
        classifier.validate(labels.len(), features.n_features())?;
        Ok(Self {
            features,
            classifier,
            labels,
        })
    }

    pub fn features(&self) -> &FeatureSpace {
        &self.features
    }

    pub fn classifier(&self) -> &MultinomialNb {
        &self.classifier
    }

    pub fn labels(&self) -> &LabelEncoder {
        &self.labels
    }

    // ── Persistence ──

    /// Publish this bundle as `name`/`version`, which must already be
    /// allocated in `registry`.
    pub fn save(
        &self,
        registry: &ModelRegistry,
        name: &str,
        version: u32,
    ) -> Result<Manifest, ModelError> {
        let components = vec![
            (VOCABULARY, serde_json::to_vec(self.features.vocabulary())?),
            (IDF, serde_json::to_vec(self.features.idf())?),
            (CLASSIFIER, serde_json::to_vec(&self.classifier)?),
            (LABELS, serde_json::to_vec(&self.labels)?),
        ];
        Ok(registry.save(name, version, &components)?)
    }

    /// Load a published bundle; every component must be present and the
    /// shapes must agree.
    pub fn load(registry: &ModelRegistry, name: &str, version: u32) -> Result<Self, ModelError> {
        let parts = registry.load(name, version, &COMPONENTS)?;
        let vocabulary: Vocabulary = decode(&parts, VOCABULARY)?;
        let idf: IdfWeights = decode(&parts, IDF)?;
        let classifier: MultinomialNb = decode(&parts, CLASSIFIER)?;
        let labels: LabelEncoder = decode(&parts, LABELS)?;

        let bundle = Self::from_parts(FeatureSpace::from_parts(vocabulary, idf)?, classifier, labels)?;
        info!(
            name,
            version,
            classes = bundle.labels.len(),
            features = bundle.features.n_features(),
            "loaded model bundle"
        );
        Ok(bundle)
    }

    // ── Inference ──

    pub fn transform(&self, text: &str) -> SparseVector {
        self.features.transform_one(text)
    }

    /// Most probable class index per text.
    pub fn predict<S: AsRef<str>>(&self, texts: &[S]) -> Vec<usize> {
        self.classifier.predict(&self.features.transform(texts))
    }

    /// Posterior over trained classes per text.
    pub fn predict_proba<S: AsRef<str>>(&self, texts: &[S]) -> Vec<Vec<f64>> {
        self.classifier.predict_proba(&self.features.transform(texts))
    }

    pub fn decode(&self, index: usize) -> LanguageResult {
        self.labels.decode(index)
    }
}

fn decode<T: DeserializeOwned>(
    parts: &BTreeMap<String, Vec<u8>>,
    component: &str,
) -> Result<T, ModelError> {
    let bytes = parts
        .get(component)
        .ok_or_else(|| ModelError::Shape(format!("component {component} not loaded")))?;
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use wikilang_store::StoreError;

    #[test]
    fn fit_then_predict_each_training_language() {
        let bundle = fixtures::en_fr_bundle();
        assert_eq!(bundle.labels().len(), 2);
        let predicted = bundle.predict(&[fixtures::ENGLISH, fixtures::FRENCH]);
        assert_eq!(predicted, vec![0, 1]);
    }

    #[test]
    fn save_then_load_predicts_identically() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ModelRegistry::open(dir.path()).unwrap();
        let bundle = fixtures::en_fr_bundle();

        let version = registry.allocate_version("NB_classif").unwrap();
        let manifest = bundle.save(&registry, "NB_classif", version).unwrap();
        assert_eq!(manifest.components.len(), COMPONENTS.len());

        let loaded = ModelBundle::load(&registry, "NB_classif", version).unwrap();
        assert_eq!(loaded, bundle);

        let queries = [
            "Le commerce n'est pas un monstre",
            "The quick brown fox",
            "",
            "zzzz qqqq",
            fixtures::FRENCH,
        ];
        assert_eq!(loaded.predict(&queries), bundle.predict(&queries));
        assert_eq!(loaded.predict_proba(&queries), bundle.predict_proba(&queries));
    }

    #[test]
    fn missing_component_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ModelRegistry::open(dir.path()).unwrap();
        let bundle = fixtures::en_fr_bundle();
        let version = registry.allocate_version("m").unwrap();
        bundle.save(&registry, "m", version).unwrap();

        std::fs::remove_file(registry.version_dir("m", version).join(IDF)).unwrap();
        let err = ModelBundle::load(&registry, "m", version).unwrap_err();
        assert!(matches!(
            err,
            ModelError::Store(StoreError::IncompleteBundle { ref missing, .. }) if missing == &[IDF.to_string()]
        ));
    }

    #[test]
    fn unpublished_version_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ModelRegistry::open(dir.path()).unwrap();
        let version = registry.allocate_version("m").unwrap();
        assert!(matches!(
            ModelBundle::load(&registry, "m", version),
            Err(ModelError::Store(StoreError::IncompleteBundle { .. }))
        ));
    }

    #[test]
    fn mismatched_components_fail_load() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ModelRegistry::open(dir.path()).unwrap();
        let bundle = fixtures::en_fr_bundle();
        let other = ModelBundle::fit(
            fixtures::en_fr_labels(),
            &["alpha beta", "gamma delta"],
            &[0, 1],
        )
        .unwrap();

        let version = registry.allocate_version("m").unwrap();
        let components = vec![
            (VOCABULARY, serde_json::to_vec(bundle.features().vocabulary()).unwrap()),
            (IDF, serde_json::to_vec(bundle.features().idf()).unwrap()),
            (CLASSIFIER, serde_json::to_vec(other.classifier()).unwrap()),
            (LABELS, serde_json::to_vec(bundle.labels()).unwrap()),
        ];
        registry.save("m", version, &components).unwrap();
        assert!(matches!(
            ModelBundle::load(&registry, "m", version),
            Err(ModelError::Shape(_))
        ));
    }
}

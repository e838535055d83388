//! Single-text identification against one loaded bundle.

use std::sync::Arc;

use tracing::debug;
use wikilang_core::LanguageResult;
use wikilang_store::ModelRegistry;

use crate::ModelError;
use crate::bayes::argmax;
use crate::bundle::ModelBundle;

/// Answers "what language is this?" for one text at a time.
///
/// Holds a shared, immutable bundle; cloning an `Identifier` or building
/// several from one `Arc` never reloads the model.
#[derive(Debug, Clone)]
pub struct Identifier {
    bundle: Arc<ModelBundle>,
    min_confidence: f64,
}

impl Identifier {
    pub fn new(bundle: ModelBundle) -> Self {
        Self::from_shared(Arc::new(bundle))
    }

    pub fn from_shared(bundle: Arc<ModelBundle>) -> Self {
        Self {
            bundle,
            min_confidence: 0.0,
        }
    }

    /// Load `name` at `version`, or its newest published version.
    pub fn load(
        registry: &ModelRegistry,
        name: &str,
        version: Option<u32>,
    ) -> Result<Self, ModelError> {
        let version = match version {
            Some(v) => v,
            None => registry.latest(name)?,
        };
        Ok(Self::new(ModelBundle::load(registry, name, version)?))
    }

    /// Report [`LanguageResult::Undetermined`] when the winning class's
    /// posterior is below `min_confidence`, which must lie in `[0, 1]`.
    pub fn with_min_confidence(mut self, min_confidence: f64) -> Result<Self, ModelError> {
        if !(0.0..=1.0).contains(&min_confidence) {
            return Err(ModelError::Confidence(min_confidence));
        }
        self.min_confidence = min_confidence;
        Ok(self)
    }

    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
    }

    pub fn bundle(&self) -> &Arc<ModelBundle> {
        &self.bundle
    }

    /// Identify the language of `text`. Never fails.
    pub fn identify(&self, text: &str) -> LanguageResult {
        self.bundle.decode(self.classify(text))
    }

    /// Class index for `text`, or the sentinel when nothing matched.
    fn classify(&self, text: &str) -> usize {
        let labels = self.bundle.labels();
        let row = self.bundle.transform(text);
        if row.is_empty() {
            debug!("no known tokens in input");
            return labels.sentinel();
        }
        let proba = self.bundle.classifier().predict_proba_one(&row);
        let best = argmax(&proba);
        let confidence = proba.get(best).copied().unwrap_or(0.0);
        if confidence < self.min_confidence {
            debug!(confidence, min = self.min_confidence, "below confidence threshold");
            return labels.sentinel();
        }
        best
    }
}

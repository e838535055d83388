//! Class index ↔ language encoding.
//!
//! Class `i` is the `i`-th language of the catalog the model was trained on.
//! One index past the last class is reserved for "undetermined"; decoding it,
//! or any index beyond it, yields [`LanguageResult::Undetermined`].

use serde::{Deserialize, Serialize};
use wikilang_core::{Language, LanguageCatalog, LanguageResult};

use crate::ModelError;

/// One trained class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub code: String,
    pub name: String,
}

/// Label encoding stored with every model bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<Label>,
    /// Reserved index decoded as undetermined, always `classes.len()`.
    undetermined: usize,
}

impl LabelEncoder {
    pub fn from_catalog(catalog: &LanguageCatalog) -> Self {
        let classes: Vec<Label> = catalog
            .iter()
            .map(|l| Label {
                code: l.code.clone(),
                name: l.name.clone(),
            })
            .collect();
        let undetermined = classes.len();
        Self {
            classes,
            undetermined,
        }
    }

    /// Number of trained classes (the sentinel excluded).
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// The reserved "undetermined" index.
    pub fn sentinel(&self) -> usize {
        self.undetermined
    }

    pub fn classes(&self) -> &[Label] {
        &self.classes
    }

    pub fn encode(&self, code: &str) -> Option<usize> {
        self.classes.iter().position(|l| l.code == code)
    }

    pub fn decode(&self, index: usize) -> LanguageResult {
        match self.classes.get(index) {
            Some(label) => LanguageResult::known(label.code.clone()),
            None => LanguageResult::Undetermined,
        }
    }

    pub fn label(&self, index: usize) -> Option<&Label> {
        self.classes.get(index)
    }

    /// The trained languages as a catalog, for rendering display names.
    pub fn catalog(&self) -> Result<LanguageCatalog, ModelError> {
        LanguageCatalog::new(
            self.classes
                .iter()
                .map(|l| Language::new(l.name.clone(), l.code.clone()))
                .collect(),
        )
        .map_err(|e| ModelError::Shape(e.to_string()))
    }

    /// Check a decoded encoding is internally consistent.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.undetermined != self.classes.len() {
            return Err(ModelError::Shape(format!(
                "undetermined index {} should be {}",
                self.undetermined,
                self.classes.len()
            )));
        }
        self.catalog().map(|_| ())
    }
}

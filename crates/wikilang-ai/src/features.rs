//! Feature extraction: token counts, then inverse-document-frequency weighting.
//!
//! A [`FeatureSpace`] is fitted once on training texts and frozen. Column
//! indices only mean something relative to the vocabulary they came from, so
//! a model must always be queried through the feature space it was fitted
//! with.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use wikilang_core::text;

use crate::ModelError;

/// Sparse row of a feature matrix, indices ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
}

impl SparseVector {
    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    fn from_counts(counts: BTreeMap<usize, f64>) -> Self {
        let (indices, values) = counts.into_iter().unzip();
        Self { indices, values }
    }

    /// L2-normalize in place.
    fn normalize(&mut self) {
        let norm: f64 = self.values.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > 0.0 {
            for x in &mut self.values {
                *x /= norm;
            }
        }
    }
}

// ── Stage 1: counting ──

/// Token to column index, assigned in lexicographic token order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vocabulary {
    terms: BTreeMap<String, usize>,
}

impl Vocabulary {
    /// Collect every token appearing in `texts`.
    pub fn fit<S: AsRef<str>>(texts: &[S]) -> Self {
        let tokens: BTreeSet<String> = texts
            .iter()
            .flat_map(|t| text::tokenize(t.as_ref()))
            .collect();
        let terms = tokens
            .into_iter()
            .enumerate()
            .map(|(i, t)| (t, i))
            .collect();
        Self { terms }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn index_of(&self, token: &str) -> Option<usize> {
        self.terms.get(token).copied()
    }

    /// Term counts of `text`; tokens outside the vocabulary are dropped.
    pub fn counts(&self, text: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for token in text::tokenize(text) {
            if let Some(idx) = self.index_of(&token) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }
        SparseVector::from_counts(counts)
    }

    fn validate(&self) -> Result<(), ModelError> {
        let mut seen = vec![false; self.terms.len()];
        for (term, &idx) in &self.terms {
            match seen.get_mut(idx) {
                Some(slot) if !*slot => *slot = true,
                _ => {
                    return Err(ModelError::Shape(format!(
                        "vocabulary index {idx} for {term:?} is out of range or repeated"
                    )));
                }
            }
        }
        Ok(())
    }
}

// ── Stage 2: weighting ──

/// Smoothed inverse document frequency per column:
/// `idf(t) = ln((1 + n) / (1 + df(t))) + 1`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdfWeights {
    idf: Vec<f64>,
}

impl IdfWeights {
    pub fn fit(counts: &[SparseVector], n_features: usize) -> Self {
        let mut df = vec![0usize; n_features];
        for row in counts {
            for &idx in &row.indices {
                df[idx] += 1;
            }
        }
        let n = counts.len() as f64;
        let idf = df
            .into_iter()
            .map(|d| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0)
            .collect();
        Self { idf }
    }

    pub fn len(&self) -> usize {
        self.idf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idf.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<f64> {
        self.idf.get(idx).copied()
    }

    /// Scale counts by idf, then L2-normalize the row.
    pub fn apply(&self, counts: &SparseVector) -> SparseVector {
        let mut row = SparseVector {
            indices: counts.indices.clone(),
            values: counts
                .iter()
                .map(|(idx, c)| c * self.idf[idx])
                .collect(),
        };
        row.normalize();
        row
    }
}

// ── Combined ──

/// Fitted vocabulary plus idf weights.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSpace {
    vocabulary: Vocabulary,
    idf: IdfWeights,
}

impl FeatureSpace {
    /// Fit both stages on training texts.
    pub fn fit<S: AsRef<str>>(texts: &[S]) -> Self {
        Self::fit_transform(texts).0
    }

    /// Fit both stages and return the weighted training matrix.
    pub fn fit_transform<S: AsRef<str>>(texts: &[S]) -> (Self, Vec<SparseVector>) {
        let vocabulary = Vocabulary::fit(texts);
        let counts: Vec<SparseVector> = texts
            .iter()
            .map(|t| vocabulary.counts(t.as_ref()))
            .collect();
        let idf = IdfWeights::fit(&counts, vocabulary.len());
        let rows = counts.iter().map(|c| idf.apply(c)).collect();
        (Self { vocabulary, idf }, rows)
    }

    /// Reassemble a feature space from stored stages.
    pub fn from_parts(vocabulary: Vocabulary, idf: IdfWeights) -> Result<Self, ModelError> {
        if vocabulary.len() != idf.len() {
            return Err(ModelError::Shape(format!(
                "vocabulary has {} terms but idf has {} weights",
                vocabulary.len(),
                idf.len()
            )));
        }
        vocabulary.validate()?;
        Ok(Self { vocabulary, idf })
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn idf(&self) -> &IdfWeights {
        &self.idf
    }

    pub fn n_features(&self) -> usize {
        self.vocabulary.len()
    }

    /// Weighted feature row for one text.
    pub fn transform_one(&self, text: &str) -> SparseVector {
        self.idf.apply(&self.vocabulary.counts(text))
    }

    /// Weighted feature matrix, one row per text.
    pub fn transform<S: AsRef<str>>(&self, texts: &[S]) -> Vec<SparseVector> {
        texts.iter().map(|t| self.transform_one(t.as_ref())).collect()
    }
}

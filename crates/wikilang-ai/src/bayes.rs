//! Multinomial naive Bayes over non-negative feature rows.

use serde::{Deserialize, Serialize};

use crate::ModelError;
use crate::features::SparseVector;

/// Fitted multinomial naive Bayes parameters.
///
/// `feature_log_prob[c][j]` is the smoothed `ln P(feature j | class c)`;
/// `class_log_prior[c]` is `ln P(class c)` from class frequencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultinomialNb {
    alpha: f64,
    class_log_prior: Vec<f64>,
    feature_log_prob: Vec<Vec<f64>>,
}

impl MultinomialNb {
    /// Fit on rows `x` with class labels `y` in `0..n_classes`.
    ///
    /// Every class needs at least one row; an empty class would have a prior
    /// of zero and could never be predicted.
    pub fn fit(
        x: &[SparseVector],
        y: &[usize],
        n_classes: usize,
        n_features: usize,
        alpha: f64,
    ) -> Result<Self, ModelError> {
        if x.is_empty() {
            return Err(ModelError::NoDocuments);
        }
        if x.len() != y.len() {
            return Err(ModelError::Shape(format!(
                "{} rows but {} labels",
                x.len(),
                y.len()
            )));
        }
        if alpha <= 0.0 {
            return Err(ModelError::Shape(format!("alpha must be positive, got {alpha}")));
        }

        let mut class_count = vec![0usize; n_classes];
        let mut feature_count = vec![vec![0.0f64; n_features]; n_classes];
        for (row, &class) in x.iter().zip(y) {
            if class >= n_classes {
                return Err(ModelError::Shape(format!(
                    "label {class} outside 0..{n_classes}"
                )));
            }
            class_count[class] += 1;
            for (idx, value) in row.iter() {
                if idx >= n_features {
                    return Err(ModelError::Shape(format!(
                        "feature {idx} outside 0..{n_features}"
                    )));
                }
                feature_count[class][idx] += value;
            }
        }
        if let Some(empty) = class_count.iter().position(|&c| c == 0) {
            return Err(ModelError::Shape(format!("class {empty} has no training rows")));
        }

        let total = x.len() as f64;
        let class_log_prior = class_count
            .iter()
            .map(|&c| (c as f64 / total).ln())
            .collect();

        let feature_log_prob = feature_count
            .into_iter()
            .map(|counts| {
                let denom = (counts.iter().sum::<f64>() + alpha * n_features as f64).ln();
                counts.into_iter().map(|c| (c + alpha).ln() - denom).collect()
            })
            .collect();

        Ok(Self {
            alpha,
            class_log_prior,
            feature_log_prob,
        })
    }

    pub fn n_classes(&self) -> usize {
        self.class_log_prior.len()
    }

    pub fn n_features(&self) -> usize {
        self.feature_log_prob.first().map_or(0, Vec::len)
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Check stored parameters against the expected dimensions.
    pub fn validate(&self, n_classes: usize, n_features: usize) -> Result<(), ModelError> {
        if self.class_log_prior.len() != n_classes || self.feature_log_prob.len() != n_classes {
            return Err(ModelError::Shape(format!(
                "classifier has {} priors and {} likelihood rows, expected {n_classes}",
                self.class_log_prior.len(),
                self.feature_log_prob.len()
            )));
        }
        if let Some(row) = self.feature_log_prob.iter().find(|r| r.len() != n_features) {
            return Err(ModelError::Shape(format!(
                "classifier row has {} features, expected {n_features}",
                row.len()
            )));
        }
        Ok(())
    }

    /// Unnormalized `ln P(class) + Σ x_j ln P(j | class)` per class.
    fn joint_log_likelihood(&self, row: &SparseVector) -> Vec<f64> {
        self.class_log_prior
            .iter()
            .zip(&self.feature_log_prob)
            .map(|(&prior, flp)| {
                prior
                    + row
                        .iter()
                        .filter_map(|(idx, v)| flp.get(idx).map(|lp| v * lp))
                        .sum::<f64>()
            })
            .collect()
    }

    /// Most probable class for one row; ties go to the lowest index.
    pub fn predict_one(&self, row: &SparseVector) -> usize {
        argmax(&self.joint_log_likelihood(row))
    }

    /// Most probable class per row.
    pub fn predict(&self, x: &[SparseVector]) -> Vec<usize> {
        x.iter().map(|row| self.predict_one(row)).collect()
    }

    /// Posterior distribution over classes for one row.
    pub fn predict_proba_one(&self, row: &SparseVector) -> Vec<f64> {
        let jll = self.joint_log_likelihood(row);
        let max = jll.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exp: Vec<f64> = jll.iter().map(|l| (l - max).exp()).collect();
        let sum: f64 = exp.iter().sum();
        exp.into_iter().map(|e| e / sum).collect()
    }

    /// Posterior distribution over classes per row.
    pub fn predict_proba(&self, x: &[SparseVector]) -> Vec<Vec<f64>> {
        x.iter().map(|row| self.predict_proba_one(row)).collect()
    }
}

/// Index of the first maximum.
pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    let mut best_v = f64::NEG_INFINITY;
    for (i, &v) in values.iter().enumerate() {
        if v > best_v {
            best_v = v;
            best = i;
        }
    }
    best
}

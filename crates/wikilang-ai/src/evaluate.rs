//! Offline evaluation: classify fixed-size windows of held-out text and tally
//! actual against predicted language.

use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use tracing::{info, warn};
use wikilang_core::text;
use wikilang_store::{CorpusStore, StoreError};

use crate::ModelError;
use crate::bundle::ModelBundle;

/// Words per evaluation window, close to a typical query.
pub const DEFAULT_CHUNK_SIZE: usize = 30;

/// Consecutive non-overlapping windows of `size` words, re-joined with single
/// spaces. A shorter final window is kept.
pub fn chunks(text: &str, size: usize) -> Vec<String> {
    let words: Vec<&str> = text::words(text).collect();
    words.chunks(size.max(1)).map(|w| w.join(" ")).collect()
}

/// N×N tally of actual (row) against predicted (column) class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    labels: Vec<String>,
    counts: Vec<Vec<u64>>,
}

impl ConfusionMatrix {
    pub fn new(labels: Vec<String>) -> Self {
        let n = labels.len();
        Self {
            labels,
            counts: vec![vec![0; n]; n],
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Count one classification. Indices outside the matrix are ignored and
    /// reported as `false`.
    pub fn record(&mut self, actual: usize, predicted: usize) -> bool {
        match self.counts.get_mut(actual).and_then(|row| row.get_mut(predicted)) {
            Some(cell) => {
                *cell += 1;
                true
            }
            None => false,
        }
    }

    pub fn count(&self, actual: usize, predicted: usize) -> u64 {
        self.counts
            .get(actual)
            .and_then(|row| row.get(predicted))
            .copied()
            .unwrap_or(0)
    }

    /// Windows of class `actual`.
    pub fn row_total(&self, actual: usize) -> u64 {
        self.counts.get(actual).map_or(0, |row| row.iter().sum())
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    pub fn correct(&self) -> u64 {
        (0..self.len()).map(|i| self.count(i, i)).sum()
    }

    /// Overall share of windows classified correctly; `None` when empty.
    pub fn accuracy(&self) -> Option<f64> {
        let total = self.total();
        (total > 0).then(|| self.correct() as f64 / total as f64)
    }

    /// Recall of class `actual`; `None` when it had no windows.
    pub fn class_accuracy(&self, actual: usize) -> Option<f64> {
        let total = self.row_total(actual);
        (total > 0).then(|| self.count(actual, actual) as f64 / total as f64)
    }

    /// Every evaluated class is recalled better than uniform guessing (1/N).
    pub fn beats_chance(&self) -> bool {
        let chance = 1.0 / self.len().max(1) as f64;
        let mut any = false;
        for i in 0..self.len() {
            if let Some(acc) = self.class_accuracy(i) {
                any = true;
                if acc <= chance {
                    return false;
                }
            }
        }
        any
    }

    /// Every evaluated row's diagonal cell strictly exceeds each other cell
    /// in that row.
    pub fn is_diagonal_dominant(&self) -> bool {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, row)| row.iter().any(|&c| c > 0))
            .all(|(i, row)| row.iter().enumerate().all(|(j, &c)| i == j || row[i] > c))
    }

    /// One row per actual class: `actual`, one `UInt64` column per predicted
    /// class named `pred_<code>`, then `total`.
    pub fn to_record_batch(&self) -> Result<RecordBatch, ModelError> {
        let mut fields = vec![Field::new("actual", DataType::Utf8, false)];
        fields.extend(
            self.labels
                .iter()
                .map(|l| Field::new(format!("pred_{l}"), DataType::UInt64, false)),
        );
        fields.push(Field::new("total", DataType::UInt64, false));
        let schema = Arc::new(Schema::new(fields));

        let mut columns: Vec<ArrayRef> =
            vec![Arc::new(StringArray::from_iter_values(self.labels.iter()))];
        for j in 0..self.len() {
            columns.push(Arc::new(UInt64Array::from_iter_values(
                (0..self.len()).map(|i| self.count(i, j)),
            )));
        }
        columns.push(Arc::new(UInt64Array::from_iter_values(
            (0..self.len()).map(|i| self.row_total(i)),
        )));

        Ok(RecordBatch::try_new(schema, columns)?)
    }
}

/// Classify each window of each `(code, held_out_text)` pair.
///
/// Codes the bundle was not trained on are skipped with a warning. Uses the
/// classifier's raw prediction, so every window lands in some column.
pub fn evaluate(
    bundle: &ModelBundle,
    held_out: &[(&str, &str)],
    chunk_size: usize,
) -> ConfusionMatrix {
    let labels = bundle.labels();
    let codes = labels.classes().iter().map(|l| l.code.clone()).collect();
    let mut matrix = ConfusionMatrix::new(codes);

    for &(code, text) in held_out {
        let Some(actual) = labels.encode(code) else {
            warn!(language = code, "not in model; skipping");
            continue;
        };
        let windows = chunks(text, chunk_size);
        for predicted in bundle.predict(&windows) {
            matrix.record(actual, predicted);
        }
        info!(
            language = code,
            windows = windows.len(),
            accuracy = matrix.class_accuracy(actual).unwrap_or(0.0),
            "evaluated language"
        );
    }
    matrix
}

/// Evaluate on the held-out partition of every trained language in `corpus`.
pub fn evaluate_corpus(
    bundle: &ModelBundle,
    corpus: &dyn CorpusStore,
    chunk_size: usize,
) -> Result<ConfusionMatrix, ModelError> {
    let mut held_out = Vec::new();
    for label in bundle.labels().classes() {
        match corpus.read_partition(&label.code) {
            Ok(p) => held_out.push((label.code.clone(), p.test)),
            Err(StoreError::NotFound(_)) => {
                warn!(language = %label.code, "no stored corpus; skipping");
            }
            Err(e) => return Err(e.into()),
        }
    }
    let pairs: Vec<(&str, &str)> = held_out
        .iter()
        .map(|(c, t)| (c.as_str(), t.as_str()))
        .collect();
    Ok(evaluate(bundle, &pairs, chunk_size))
}

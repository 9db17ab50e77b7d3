//! Multinomial naive Bayes classifier.
//!
//! Works on non-negative feature vectors (term counts or TF-IDF weights).
//! With smoothing `alpha`, per-class feature counts `fc` and class counts:
//!
//! ```text
//! feature_log_prob[c][j] = ln(fc[c][j] + alpha) - ln(Σ_j (fc[c][j] + alpha))
//! class_log_prior[c]     = ln(count[c] / n)
//! jll[c]                 = class_log_prior[c] + Σ_j x[j] * feature_log_prob[c][j]
//! ```
//!
//! Probabilities are the softmax of the joint log likelihood, computed with
//! log-sum-exp so that long documents do not underflow.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TastebudError};

/// Smallest smoothing value used during fitting.
pub const MIN_ALPHA: f64 = 1e-10;

/// Multinomial naive Bayes classifier over `u8` class labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultinomialNb {
    alpha: f64,
    /// Sorted distinct labels seen during fitting.
    classes: Vec<u8>,
    class_count: Vec<f64>,
    /// Summed feature values per class, `[class][feature]`.
    feature_count: Vec<Vec<f64>>,
    class_log_prior: Vec<f64>,
    feature_log_prob: Vec<Vec<f64>>,
    n_features: usize,
}

impl MultinomialNb {
    /// Create an unfitted classifier with the given additive smoothing.
    pub fn new(alpha: f64) -> Result<Self> {
        if alpha.is_nan() || alpha < 0.0 {
            return Err(TastebudError::model(format!(
                "alpha must be non-negative, got {alpha}"
            )));
        }
        Ok(Self {
            alpha,
            classes: Vec::new(),
            class_count: Vec::new(),
            feature_count: Vec::new(),
            class_log_prior: Vec::new(),
            feature_log_prob: Vec::new(),
            n_features: 0,
        })
    }

    /// Fit the classifier on rows `x` with labels `y`.
    pub fn fit<R: AsRef<[f64]>>(&mut self, x: &[R], y: &[u8]) -> Result<()> {
        if x.is_empty() {
            return Err(TastebudError::model("cannot fit on zero samples"));
        }
        if x.len() != y.len() {
            return Err(TastebudError::model(format!(
                "found {} samples but {} labels",
                x.len(),
                y.len()
            )));
        }

        let n_features = x[0].as_ref().len();
        let mut classes = y.to_vec();
        classes.sort_unstable();
        classes.dedup();

        let mut class_count = vec![0.0; classes.len()];
        let mut feature_count = vec![vec![0.0; n_features]; classes.len()];
        for (row, label) in x.iter().zip(y) {
            let row = row.as_ref();
            if row.len() != n_features {
                return Err(TastebudError::model(format!(
                    "expected {n_features} features per row, found {}",
                    row.len()
                )));
            }
            if row.iter().any(|&v| v < 0.0) {
                return Err(TastebudError::model(
                    "negative feature values are not supported",
                ));
            }
            // classes is sorted and contains every label
            let c = classes.binary_search(label).unwrap_or_default();
            class_count[c] += 1.0;
            for (total, value) in feature_count[c].iter_mut().zip(row) {
                *total += value;
            }
        }

        let alpha = if self.alpha < MIN_ALPHA {
            warn!(
                "alpha too small ({}); setting alpha = {MIN_ALPHA:e}",
                self.alpha
            );
            MIN_ALPHA
        } else {
            self.alpha
        };

        let n_samples = x.len() as f64;
        self.class_log_prior = class_count.iter().map(|&c| (c / n_samples).ln()).collect();
        self.feature_log_prob = feature_count
            .iter()
            .map(|counts| {
                let denominator = (counts.iter().sum::<f64>() + alpha * n_features as f64).ln();
                counts
                    .iter()
                    .map(|&count| (count + alpha).ln() - denominator)
                    .collect()
            })
            .collect();
        self.classes = classes;
        self.class_count = class_count;
        self.feature_count = feature_count;
        self.n_features = n_features;

        Ok(())
    }

    /// Unnormalized log posterior per class for one row.
    pub fn joint_log_likelihood(&self, row: &[f64]) -> Result<Vec<f64>> {
        if !self.is_fitted() {
            return Err(TastebudError::model("classifier is not fitted"));
        }
        if row.len() != self.n_features {
            return Err(TastebudError::model(format!(
                "expected {} features, found {}",
                self.n_features,
                row.len()
            )));
        }

        Ok(self
            .feature_log_prob
            .iter()
            .zip(&self.class_log_prior)
            .map(|(log_probs, prior)| {
                prior
                    + log_probs
                        .iter()
                        .zip(row)
                        .map(|(lp, x)| lp * x)
                        .sum::<f64>()
            })
            .collect())
    }

    /// Class probabilities for one row, in [`classes`](Self::classes) order.
    pub fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>> {
        let jll = self.joint_log_likelihood(row)?;
        let log_norm = log_sum_exp(&jll);
        Ok(jll.iter().map(|v| (v - log_norm).exp()).collect())
    }

    /// Most likely class for one row; the lowest class wins ties.
    pub fn predict(&self, row: &[f64]) -> Result<u8> {
        let jll = self.joint_log_likelihood(row)?;
        Ok(self.classes[argmax(&jll)])
    }

    /// Predicted class and its probability for one row.
    pub fn predict_with_confidence(&self, row: &[f64]) -> Result<(u8, f64)> {
        let proba = self.predict_proba(row)?;
        let best = argmax(&proba);
        Ok((self.classes[best], proba[best]))
    }

    /// Predict every row, preserving order.
    pub fn predict_batch<R: AsRef<[f64]>>(&self, x: &[R]) -> Result<Vec<u8>> {
        x.iter().map(|row| self.predict(row.as_ref())).collect()
    }

    pub fn is_fitted(&self) -> bool {
        !self.classes.is_empty()
    }

    /// Smoothing parameter as configured (before any clamping).
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn classes(&self) -> &[u8] {
        &self.classes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Number of training samples per class.
    pub fn class_count(&self) -> &[f64] {
        &self.class_count
    }

    pub fn class_log_prior(&self) -> &[f64] {
        &self.class_log_prior
    }

    pub fn feature_log_prob(&self) -> &[Vec<f64>] {
        &self.feature_log_prob
    }
}

fn log_sum_exp(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    max + values.iter().map(|v| (v - max).exp()).sum::<f64>().ln()
}

/// Index of the first maximum.
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, value) in values.iter().enumerate() {
        if *value > values[best] {
            best = i;
        }
    }
    best
}

//! Classification metrics for binary sentiment labels.
//!
//! Class `1` is the positive class. A metric whose denominator is zero
//! evaluates to `0.0`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TastebudError};

/// 2x2 confusion matrix over labels `[0, 1]`; rows are true labels and
/// columns are predictions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix(pub [[usize; 2]; 2]);

impl ConfusionMatrix {
    pub fn from_predictions(y_true: &[u8], y_pred: &[u8]) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(TastebudError::model(format!(
                "found {} true labels but {} predictions",
                y_true.len(),
                y_pred.len()
            )));
        }

        let mut matrix = [[0usize; 2]; 2];
        for (&t, &p) in y_true.iter().zip(y_pred) {
            if t > 1 || p > 1 {
                return Err(TastebudError::model(format!(
                    "labels must be 0 or 1, found ({t}, {p})"
                )));
            }
            matrix[t as usize][p as usize] += 1;
        }
        Ok(Self(matrix))
    }

    pub fn true_negatives(&self) -> usize {
        self.0[0][0]
    }

    pub fn false_positives(&self) -> usize {
        self.0[0][1]
    }

    pub fn false_negatives(&self) -> usize {
        self.0[1][0]
    }

    pub fn true_positives(&self) -> usize {
        self.0[1][1]
    }

    pub fn total(&self) -> usize {
        self.0.iter().flatten().sum()
    }

    /// Number of samples whose true label is `class`.
    pub fn support(&self, class: usize) -> usize {
        self.0[class].iter().sum()
    }

    /// Precision, recall and F1 treating `class` as the positive class.
    pub fn class_scores(&self, class: usize) -> ClassScores {
        let other = 1 - class;
        let tp = self.0[class][class] as f64;
        let fp = self.0[other][class] as f64;
        let fn_ = self.0[class][other] as f64;

        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1 = ratio(2.0 * tp, 2.0 * tp + fp + fn_);
        ClassScores {
            precision,
            recall,
            f1,
            support: self.support(class),
        }
    }

    pub fn accuracy(&self) -> f64 {
        ratio(
            (self.true_negatives() + self.true_positives()) as f64,
            self.total() as f64,
        )
    }

    pub fn to_vec(&self) -> Vec<Vec<usize>> {
        self.0.iter().map(|row| row.to_vec()).collect()
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .0
            .iter()
            .flatten()
            .map(|v| v.to_string().len())
            .max()
            .unwrap_or(1);
        writeln!(f, "[[{:>width$} {:>width$}]", self.0[0][0], self.0[0][1])?;
        write!(f, " [{:>width$} {:>width$}]]", self.0[1][0], self.0[1][1])
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Per-class precision, recall, F1 and support.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassScores {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Headline binary metrics with class 1 as the positive class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinaryMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub confusion_matrix: ConfusionMatrix,
}

impl BinaryMetrics {
    pub fn evaluate(y_true: &[u8], y_pred: &[u8]) -> Result<Self> {
        let confusion_matrix = ConfusionMatrix::from_predictions(y_true, y_pred)?;
        let positive = confusion_matrix.class_scores(1);
        Ok(Self {
            accuracy: confusion_matrix.accuracy(),
            precision: positive.precision,
            recall: positive.recall,
            f1_score: positive.f1,
            confusion_matrix,
        })
    }
}

/// F1 score of the positive class.
pub fn f1_score(y_true: &[u8], y_pred: &[u8]) -> Result<f64> {
    Ok(ConfusionMatrix::from_predictions(y_true, y_pred)?
        .class_scores(1)
        .f1)
}

pub fn accuracy_score(y_true: &[u8], y_pred: &[u8]) -> Result<f64> {
    Ok(ConfusionMatrix::from_predictions(y_true, y_pred)?.accuracy())
}

/// Per-class breakdown with accuracy, macro and weighted averages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: [ClassScores; 2],
    pub accuracy: f64,
    pub macro_avg: ClassScores,
    pub weighted_avg: ClassScores,
}

impl ClassificationReport {
    pub fn from_confusion_matrix(matrix: &ConfusionMatrix) -> Self {
        let classes = [matrix.class_scores(0), matrix.class_scores(1)];
        let total = matrix.total();

        let average = |weight: &dyn Fn(&ClassScores) -> f64| {
            let weights: f64 = classes.iter().map(weight).sum();
            let mean = |value: fn(&ClassScores) -> f64| {
                ratio(
                    classes.iter().map(|c| value(c) * weight(c)).sum(),
                    weights,
                )
            };
            ClassScores {
                precision: mean(|c| c.precision),
                recall: mean(|c| c.recall),
                f1: mean(|c| c.f1),
                support: total,
            }
        };

        let macro_avg = average(&|_| 1.0);
        let weighted_avg = average(&|c| c.support as f64);

        Self {
            classes,
            accuracy: matrix.accuracy(),
            macro_avg,
            weighted_avg,
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let row = |f: &mut fmt::Formatter<'_>, name: &str, s: &ClassScores| {
            writeln!(
                f,
                "{name:>12} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                s.precision, s.recall, s.f1, s.support
            )
        };

        writeln!(
            f,
            "{:>12} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        row(f, "0", &self.classes[0])?;
        row(f, "1", &self.classes[1])?;
        writeln!(f)?;
        writeln!(
            f,
            "{:>12} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        row(f, "macro avg", &self.macro_avg)?;
        row(f, "weighted avg", &self.weighted_avg)
    }
}

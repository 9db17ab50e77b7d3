//! Labeled review dataset.
//!
//! The training data is a tab separated file with a header row. Reviews are
//! read from the `Review` column and the binary label from the last column:
//! ```text
//! Review	Liked
//! Wow... Loved this place.	1
//! Crust is not good.	0
//! ```
//! Quote characters carry no meaning and are kept as part of the text.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TastebudError};
use crate::inference::Sentiment;

/// Name of the column holding the review text.
pub const TEXT_COLUMN: &str = "Review";

/// One row of the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledReview {
    pub text: String,
    pub label: Sentiment,
}

impl LabeledReview {
    pub fn new<S: Into<String>>(text: S, label: Sentiment) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }
}

/// Rows of a dataset in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    reviews: Vec<LabeledReview>,
}

impl Dataset {
    /// Build a dataset from rows. Both classes must be present.
    pub fn new(reviews: Vec<LabeledReview>) -> Result<Self> {
        if reviews.is_empty() {
            return Err(TastebudError::dataset("dataset contains no rows"));
        }
        let first = reviews[0].label;
        if reviews.iter().all(|r| r.label == first) {
            return Err(TastebudError::dataset(format!(
                "dataset contains only {first} reviews; both classes are required"
            )));
        }
        Ok(Self { reviews })
    }

    /// Load a dataset file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TastebudError::DatasetNotFound(path.to_path_buf()));
        }
        let dataset = Self::from_reader(File::open(path)?)?;
        info!(
            "Loaded {} reviews from {} ({} positive)",
            dataset.len(),
            path.display(),
            dataset.count(Sentiment::Positive)
        );
        Ok(dataset)
    }

    /// Parse tab separated data with a header row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .quoting(false)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        if headers.len() < 2 {
            return Err(TastebudError::dataset(format!(
                "expected a text column and a label column, found {} column(s)",
                headers.len()
            )));
        }
        let text_index = headers
            .iter()
            .position(|h| h.trim() == TEXT_COLUMN)
            .ok_or_else(|| {
                TastebudError::dataset(format!("missing '{TEXT_COLUMN}' column in header"))
            })?;

        let mut reviews = Vec::new();
        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            let text = record.get(text_index).ok_or_else(|| {
                TastebudError::dataset(format!("line {line}: missing '{TEXT_COLUMN}' field"))
            })?;
            let raw_label = record.get(record.len().saturating_sub(1)).unwrap_or_default();
            let label = match raw_label.trim() {
                "0" => Sentiment::Negative,
                "1" => Sentiment::Positive,
                other => {
                    return Err(TastebudError::dataset(format!(
                        "line {line}: label must be 0 or 1, found {other:?}"
                    )));
                }
            };
            reviews.push(LabeledReview::new(text, label));
        }

        Self::new(reviews)
    }

    pub fn reviews(&self) -> &[LabeledReview] {
        &self.reviews
    }

    pub fn texts(&self) -> Vec<&str> {
        self.reviews.iter().map(|r| r.text.as_str()).collect()
    }

    /// Labels as class indices (0 negative, 1 positive).
    pub fn labels(&self) -> Vec<u8> {
        self.reviews.iter().map(|r| r.label.as_class()).collect()
    }

    pub fn count(&self, label: Sentiment) -> usize {
        self.reviews.iter().filter(|r| r.label == label).count()
    }

    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_parse() {
        let data = "Review\tLiked\n\
                    Wow... Loved this place.\t1\n\
                    \"Crust is not good.\"\t0\n\
                    Would not go back, ever\t0\n";
        let dataset = Dataset::from_reader(data.as_bytes()).unwrap();

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.labels(), vec![1, 0, 0]);
        assert_eq!(
            dataset.texts(),
            vec![
                "Wow... Loved this place.",
                "\"Crust is not good.\"",
                "Would not go back, ever"
            ]
        );
        assert_eq!(dataset.count(Sentiment::Negative), 2);
    }

    #[test]
    fn test_label_from_last_column() {
        let data = "Id\tReview\tSource\tLiked\n1\tGreat\tweb\t1\n2\tBad\tweb\t0\n";
        let dataset = Dataset::from_reader(data.as_bytes()).unwrap();
        assert_eq!(dataset.texts(), vec!["Great", "Bad"]);
        assert_eq!(dataset.labels(), vec![1, 0]);
    }

    #[test]
    fn test_invalid_label() {
        let data = "Review\tLiked\nGood\t1\nBad\tmaybe\n";
        let err = Dataset::from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, TastebudError::Dataset(_)));
        assert!(err.to_string().contains("line 3"), "{err}");
    }

    #[test]
    fn test_missing_column_and_single_class() {
        let err = Dataset::from_reader("Text\tLiked\nGood\t1\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Review"));

        let err = Dataset::from_reader("Review\tLiked\nGood\t1\nNice\t1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, TastebudError::Dataset(_)));

        let err = Dataset::from_reader("Review\tLiked\n".as_bytes()).unwrap_err();
        assert!(matches!(err, TastebudError::Dataset(_)));
    }

    #[test]
    fn test_load() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Review\tLiked").unwrap();
        writeln!(file, "Loved it\t1").unwrap();
        writeln!(file, "Hated it\t0").unwrap();
        let dataset = Dataset::load(file.path()).unwrap();
        assert_eq!(dataset.len(), 2);

        let err = Dataset::load("/nonexistent/reviews.tsv").unwrap_err();
        assert!(matches!(err, TastebudError::DatasetNotFound(_)));
    }
}

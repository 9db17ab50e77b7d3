//! Sentiment prediction with persisted artifacts.
//!
//! A [`SentimentPredictor`] owns the review analyzer, the fitted vectorizer
//! and the fitted classifier. It is immutable after construction and can be
//! shared between threads behind an `Arc`.

use std::fmt;

use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::ReviewAnalyzer;
use crate::artifact::load_artifact;
use crate::config::ArtifactPaths;
use crate::error::{Result, TastebudError};
use crate::ml::naive_bayes::MultinomialNb;
use crate::ml::tfidf::TfIdfVectorizer;

/// Message returned for a blank entry inside a batch.
pub const EMPTY_REVIEW_ERROR: &str = "Empty review text";

/// Binary sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Negative,
    Positive,
}

impl Sentiment {
    /// Label for a class index; only `0` and `1` are valid.
    pub fn from_class(class: u8) -> Result<Self> {
        match class {
            0 => Ok(Sentiment::Negative),
            1 => Ok(Sentiment::Positive),
            other => Err(TastebudError::model(format!("unknown class {other}"))),
        }
    }

    pub fn as_class(self) -> u8 {
        match self {
            Sentiment::Negative => 0,
            Sentiment::Positive => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Negative => "negative",
            Sentiment::Positive => "positive",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prediction for one review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// The review as submitted.
    pub review: String,
    pub sentiment: Sentiment,
    /// Probability of the predicted class.
    pub confidence: f64,
    /// Class index, `1` for positive.
    pub prediction: u8,
}

/// One entry of a batch response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchItem {
    Prediction(PredictionResult),
    Failed { review: String, error: String },
}

impl BatchItem {
    pub fn is_failed(&self) -> bool {
        matches!(self, BatchItem::Failed { .. })
    }

    pub fn prediction(&self) -> Option<&PredictionResult> {
        match self {
            BatchItem::Prediction(result) => Some(result),
            BatchItem::Failed { .. } => None,
        }
    }
}

/// Applies the review pipeline, the vectorizer and the classifier.
#[derive(Debug, Clone)]
pub struct SentimentPredictor {
    analyzer: ReviewAnalyzer,
    vectorizer: TfIdfVectorizer,
    model: MultinomialNb,
}

impl SentimentPredictor {
    /// Assemble a predictor from fitted parts.
    ///
    /// Fails when the parts were not fitted together: the vectorizer must
    /// produce as many features as the classifier expects and the classifier
    /// must know exactly the classes `[0, 1]`.
    pub fn new(
        analyzer: ReviewAnalyzer,
        vectorizer: TfIdfVectorizer,
        model: MultinomialNb,
    ) -> Result<Self> {
        if !vectorizer.is_fitted() {
            return Err(TastebudError::incompatible("vectorizer is not fitted"));
        }
        if vectorizer.vocabulary_size() != model.n_features() {
            return Err(TastebudError::incompatible(format!(
                "vectorizer produces {} features but the model expects {}",
                vectorizer.vocabulary_size(),
                model.n_features()
            )));
        }
        if model.classes() != [0, 1] {
            return Err(TastebudError::incompatible(format!(
                "model classes must be [0, 1], found {:?}",
                model.classes()
            )));
        }
        Ok(Self {
            analyzer,
            vectorizer,
            model,
        })
    }

    /// Load the model and the vectorizer from `paths`. Both blobs must come
    /// from the same training run.
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        let analyzer = ReviewAnalyzer::new()?;
        let (model_header, model) =
            load_artifact::<MultinomialNb>(&paths.model_path(), analyzer.fingerprint())?;
        let (vectorizer_header, vectorizer) =
            load_artifact::<TfIdfVectorizer>(&paths.vectorizer_path(), analyzer.fingerprint())?;
        if model_header.run_id != vectorizer_header.run_id {
            return Err(TastebudError::incompatible(format!(
                "model comes from training run {} but the vectorizer from run {}; \
                 retrain or restore both files from the same run",
                model_header.run_id, vectorizer_header.run_id
            )));
        }

        let predictor = Self::new(analyzer, vectorizer, model)?;
        info!(
            "Model and vectorizer loaded successfully ({} features, pipeline {}, run {})",
            predictor.n_features(),
            predictor.analyzer.fingerprint(),
            model_header.run_id
        );
        Ok(predictor)
    }

    /// Predict the sentiment of one review.
    pub fn predict_one(&self, review: &str) -> Result<PredictionResult> {
        if review.trim().is_empty() {
            return Err(TastebudError::invalid_input("Review text cannot be empty"));
        }
        self.predict_unchecked(review)
    }

    /// Predict every review independently, keeping input order. Blank entries
    /// become [`BatchItem::Failed`] without affecting the others.
    pub fn predict_batch<S: AsRef<str> + Sync>(&self, reviews: &[S]) -> Result<Vec<BatchItem>> {
        if reviews.is_empty() {
            return Err(TastebudError::invalid_input("Reviews list cannot be empty"));
        }
        reviews
            .par_iter()
            .map(|review| {
                let review = review.as_ref();
                if review.trim().is_empty() {
                    Ok(BatchItem::Failed {
                        review: review.to_string(),
                        error: EMPTY_REVIEW_ERROR.to_string(),
                    })
                } else {
                    self.predict_unchecked(review).map(BatchItem::Prediction)
                }
            })
            .collect()
    }

    fn predict_unchecked(&self, review: &str) -> Result<PredictionResult> {
        let processed = self.analyzer.process(review)?;
        let features = self.vectorizer.transform(&processed)?;
        let (class, confidence) = self.model.predict_with_confidence(&features)?;
        debug!("{processed:?} -> class {class} ({confidence:.4})");

        Ok(PredictionResult {
            review: review.to_string(),
            sentiment: Sentiment::from_class(class)?,
            confidence,
            prediction: class,
        })
    }

    pub fn analyzer(&self) -> &ReviewAnalyzer {
        &self.analyzer
    }

    pub fn vectorizer(&self) -> &TfIdfVectorizer {
        &self.vectorizer
    }

    pub fn model(&self) -> &MultinomialNb {
        &self.model
    }

    pub fn n_features(&self) -> usize {
        self.vectorizer.vocabulary_size()
    }
}

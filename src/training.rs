//! Offline training.
//!
//! [`Trainer::run`] loads the dataset, fits the vectorizer on the processed
//! corpus, tunes the classifier on a stratified training split, evaluates it
//! on the held-out split and writes the artifacts. Nothing is written unless
//! every earlier step succeeded.

use std::fmt;

use chrono::Utc;
use log::info;
use rayon::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::analysis::analyzer::ReviewAnalyzer;
use crate::artifact::{BlobHeader, DatasetShape, MetricsRecord, ModelMetadata, save_artifact};
use crate::config::TrainingConfig;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::inference::SentimentPredictor;
use crate::ml::metrics::{BinaryMetrics, ClassificationReport};
use crate::ml::model_selection::{
    CandidateScore, GridSearch, StratifiedKFold, cross_val_score, mean_std,
    stratified_train_test_split,
};
use crate::ml::naive_bayes::MultinomialNb;
use crate::ml::tfidf::TfIdfVectorizer;

/// Fitted parts of a training run.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub analyzer: ReviewAnalyzer,
    pub vectorizer: TfIdfVectorizer,
    pub model: MultinomialNb,
}

impl TrainedModel {
    pub fn into_predictor(self) -> Result<SentimentPredictor> {
        SentimentPredictor::new(self.analyzer, self.vectorizer, self.model)
    }
}

/// Results of a training run.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub best_alpha: f64,
    /// Grid candidates in grid order.
    pub candidates: Vec<CandidateScore>,
    pub cv_scores: Vec<f64>,
    pub cv_mean: f64,
    pub cv_std: f64,
    pub train_size: usize,
    pub test_size: usize,
    pub test_metrics: BinaryMetrics,
    pub classification_report: ClassificationReport,
    pub metadata: ModelMetadata,
}

impl fmt::Display for TrainingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.test_metrics;
        writeln!(f, "Best alpha parameter: {}", self.best_alpha)?;
        writeln!(f, "Cross-validation F1 scores: {:.4?}", self.cv_scores)?;
        writeln!(
            f,
            "Mean CV F1: {:.4} (+/- {:.4})",
            self.cv_mean,
            self.cv_std * 2.0
        )?;
        writeln!(f)?;
        writeln!(f, "=== Model Performance ===")?;
        writeln!(f, "Accuracy: {:.4}", m.accuracy)?;
        writeln!(f, "Precision: {:.4}", m.precision)?;
        writeln!(f, "Recall: {:.4}", m.recall)?;
        writeln!(f, "F1-Score: {:.4}", m.f1_score)?;
        writeln!(f)?;
        writeln!(f, "Confusion Matrix:\n{}", m.confusion_matrix)?;
        writeln!(f)?;
        writeln!(f, "Classification Report:")?;
        write!(f, "{}", self.classification_report)
    }
}

/// Runs the training procedure for one [`TrainingConfig`].
#[derive(Debug, Clone)]
pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Load the dataset, train and persist the artifacts.
    pub fn run(&self) -> Result<TrainingReport> {
        info!("Loading dataset...");
        let dataset = Dataset::load(&self.config.dataset)?;

        let (trained, report) = self.fit(&dataset)?;
        self.save(&trained, &report.metadata)?;

        info!("Training completed successfully!");
        Ok(report)
    }

    /// Train on `dataset` without touching the file system.
    pub fn fit(&self, dataset: &Dataset) -> Result<(TrainedModel, TrainingReport)> {
        let config = &self.config;
        let analyzer = ReviewAnalyzer::new()?;

        info!("Preprocessing texts...");
        let corpus: Vec<String> = dataset
            .reviews()
            .par_iter()
            .map(|review| analyzer.process(&review.text))
            .collect::<Result<_>>()?;
        let y = dataset.labels();

        info!("Creating TF-IDF vectorizer with n-grams {:?}...", config.ngram_range);
        let mut vectorizer = TfIdfVectorizer::new(config.vectorizer_config())?;
        let x = vectorizer.fit_transform(&corpus)?;
        info!(
            "Vectorized {} reviews into {} features",
            x.len(),
            vectorizer.vocabulary_size()
        );

        info!("Splitting dataset...");
        let split = stratified_train_test_split(&y, config.test_size, config.seed)?;
        let x_train: Vec<&Vec<f64>> = split.train.iter().map(|&i| &x[i]).collect();
        let y_train: Vec<u8> = split.train.iter().map(|&i| y[i]).collect();
        let x_test: Vec<&Vec<f64>> = split.test.iter().map(|&i| &x[i]).collect();
        let y_test: Vec<u8> = split.test.iter().map(|&i| y[i]).collect();

        info!("Performing hyperparameter tuning...");
        let cv = StratifiedKFold::new(config.cv_folds)?;
        let search = GridSearch::new(config.alpha_grid.clone(), cv)?.fit(&x_train, &y_train)?;
        info!("Best alpha parameter: {}", search.best_alpha);

        info!("Performing cross-validation...");
        let cv_scores = cross_val_score(&x, &y, search.best_alpha, &cv)?;
        let (cv_mean, cv_std) = mean_std(&cv_scores);
        info!("Mean CV F1: {cv_mean:.4} (+/- {:.4})", cv_std * 2.0);

        info!("Evaluating model on test set...");
        let model = search.best_estimator;
        let y_pred = model.predict_batch(&x_test)?;
        let test_metrics = BinaryMetrics::evaluate(&y_test, &y_pred)?;
        let classification_report =
            ClassificationReport::from_confusion_matrix(&test_metrics.confusion_matrix);
        info!(
            "Test accuracy {:.4}, F1 {:.4}",
            test_metrics.accuracy, test_metrics.f1_score
        );

        let metadata = ModelMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            run_id: Uuid::new_v4().to_string(),
            trained_date: Utc::now(),
            algorithm: "MultinomialNB".to_string(),
            vectorizer: "TfidfVectorizer".to_string(),
            max_features: config.max_features,
            ngram_range: [config.ngram_range.0, config.ngram_range.1],
            best_alpha: search.best_alpha,
            param_grid: config.alpha_grid.clone(),
            pipeline: analyzer.fingerprint().to_string(),
            dataset: DatasetShape {
                samples: dataset.len(),
                features: vectorizer.vocabulary_size(),
            },
            metrics: MetricsRecord {
                accuracy: test_metrics.accuracy,
                precision: test_metrics.precision,
                recall: test_metrics.recall,
                f1_score: test_metrics.f1_score,
                cv_f1_mean: cv_mean,
                cv_f1_std: cv_std,
                cv_f1_scores: cv_scores.clone(),
                confusion_matrix: test_metrics.confusion_matrix,
            },
        };

        let report = TrainingReport {
            best_alpha: search.best_alpha,
            candidates: search.candidates,
            cv_scores,
            cv_mean,
            cv_std,
            train_size: split.train.len(),
            test_size: split.test.len(),
            test_metrics,
            classification_report,
            metadata,
        };
        let trained = TrainedModel {
            analyzer,
            vectorizer,
            model,
        };
        Ok((trained, report))
    }

    /// Write the vectorizer, the classifier and the metadata sidecar.
    pub fn save(&self, trained: &TrainedModel, metadata: &ModelMetadata) -> Result<()> {
        info!("Saving model and vectorizer...");
        let paths = &self.config.artifacts;
        let header = BlobHeader::new(trained.analyzer.fingerprint(), metadata.run_id.as_str());
        save_artifact(&trained.model, &header, &paths.model_path())?;
        save_artifact(&trained.vectorizer, &header, &paths.vectorizer_path())?;
        metadata.save(&paths.metrics_path())
    }
}

//! Configuration for training and serving.
//!
//! Every struct has a `Default` matching the reference setup and accepts
//! partial JSON files thanks to `#[serde(default)]`:
//!
//! ```json
//! { "max_features": 2000, "artifacts": { "model_dir": "/srv/models" } }
//! ```
//!
//! Command line flags override values loaded from a file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TastebudError};
use crate::ml::tfidf::TfIdfConfig;

/// Locations of the persisted artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactPaths {
    pub model_dir: PathBuf,
    pub vectorizer_file: String,
    pub model_file: String,
    pub metrics_file: String,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            vectorizer_file: "tfidf_vectorizer.bin".to_string(),
            model_file: "sentiment_model.bin".to_string(),
            metrics_file: "model_metrics.json".to_string(),
        }
    }
}

impl ArtifactPaths {
    /// Default file names inside `model_dir`.
    pub fn in_dir<P: Into<PathBuf>>(model_dir: P) -> Self {
        Self {
            model_dir: model_dir.into(),
            ..Self::default()
        }
    }

    pub fn vectorizer_path(&self) -> PathBuf {
        self.model_dir.join(&self.vectorizer_file)
    }

    pub fn model_path(&self) -> PathBuf {
        self.model_dir.join(&self.model_file)
    }

    pub fn metrics_path(&self) -> PathBuf {
        self.model_dir.join(&self.metrics_file)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, file) in [
            ("vectorizer_file", &self.vectorizer_file),
            ("model_file", &self.model_file),
            ("metrics_file", &self.metrics_file),
        ] {
            if file.trim().is_empty() {
                return Err(TastebudError::invalid_config(format!("{name} must not be empty")));
            }
        }
        Ok(())
    }
}

/// Settings of one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Tab-separated dataset with a `Review` column and the label last.
    pub dataset: PathBuf,
    pub artifacts: ArtifactPaths,
    /// Vocabulary cap of the vectorizer.
    pub max_features: usize,
    /// Inclusive n-gram range of the vectorizer.
    pub ngram_range: (usize, usize),
    /// Fraction of samples held out for the final evaluation.
    pub test_size: f64,
    /// Seed of the train/test shuffle.
    pub seed: u64,
    /// Smoothing values tried by the grid search.
    pub alpha_grid: Vec<f64>,
    /// Folds of the stratified cross-validation.
    pub cv_folds: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from("Restaurant_Reviews.tsv"),
            artifacts: ArtifactPaths::default(),
            max_features: 1500,
            ngram_range: (1, 2),
            test_size: 0.25,
            seed: 0,
            alpha_grid: vec![0.1, 0.5, 1.0, 2.0],
            cv_folds: 5,
        }
    }
}

impl TrainingConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: Self = read_json(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.artifacts.validate()?;
        if self.max_features == 0 {
            return Err(TastebudError::invalid_config("max_features must be positive"));
        }
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(TastebudError::invalid_config(format!(
                "invalid ngram_range ({min_n}, {max_n})"
            )));
        }
        if self.test_size.is_nan() || self.test_size <= 0.0 || self.test_size >= 1.0 {
            return Err(TastebudError::invalid_config(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        if self.cv_folds < 2 {
            return Err(TastebudError::invalid_config(format!(
                "cv_folds must be at least 2, got {}",
                self.cv_folds
            )));
        }
        if self.alpha_grid.is_empty() {
            return Err(TastebudError::invalid_config("alpha_grid must not be empty"));
        }
        if let Some(alpha) = self.alpha_grid.iter().find(|a| a.is_nan() || **a < 0.0) {
            return Err(TastebudError::invalid_config(format!(
                "alpha_grid contains invalid value {alpha}"
            )));
        }
        Ok(())
    }

    pub fn vectorizer_config(&self) -> TfIdfConfig {
        TfIdfConfig {
            max_features: Some(self.max_features),
            ngram_range: self.ngram_range,
        }
    }
}

/// Settings of the HTTP service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub artifacts: ArtifactPaths,
    /// Start without artifacts and report unhealthy instead of failing.
    pub allow_unloaded: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            artifacts: ArtifactPaths::default(),
            allow_unloaded: false,
        }
    }
}

impl ServiceConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: Self = read_json(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.artifacts.validate()?;
        if self.host.trim().is_empty() {
            return Err(TastebudError::invalid_config("host must not be empty"));
        }
        Ok(())
    }

    /// `host:port` string for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| {
        TastebudError::invalid_config(format!("cannot read {}: {e}", path.display()))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        TastebudError::invalid_config(format!("cannot parse {}: {e}", path.display()))
    })
}

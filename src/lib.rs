//! # Tastebud
//!
//! Sentiment classification for short restaurant reviews.
//!
//! ## Features
//!
//! - One text pipeline shared by training and inference
//!   ([`ReviewAnalyzer`](analysis::analyzer::ReviewAnalyzer))
//! - TF-IDF features over unigrams and bigrams
//! - Multinomial naive Bayes tuned by stratified cross-validation
//! - Versioned, checksummed artifacts tied to the pipeline fingerprint
//! - HTTP prediction service built on axum
//!
//! ```no_run
//! use tastebud::config::ArtifactPaths;
//! use tastebud::inference::SentimentPredictor;
//!
//! let predictor = SentimentPredictor::load(&ArtifactPaths::in_dir("models"))?;
//! let result = predictor.predict_one("The pasta was wonderful")?;
//! println!("{} ({:.2})", result.sentiment, result.confidence);
//! # Ok::<(), tastebud::error::TastebudError>(())
//! ```

pub mod analysis;
pub mod artifact;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod inference;
pub mod ml;
pub mod server;
pub mod training;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

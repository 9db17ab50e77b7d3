//! Error types for the Tastebud library.
//!
//! All errors are represented by the [`TastebudError`] enum. Each variant is
//! classified into an [`ErrorKind`] so that callers (the HTTP layer, the CLI,
//! tests) can tell client mistakes, deployment problems and internal failures
//! apart without matching on message strings.
//!
//! # Examples
//!
//! ```
//! use tastebud::error::{ErrorKind, TastebudError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(TastebudError::invalid_input("Review text cannot be empty"))
//! }
//!
//! let err = example_operation().unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::ClientInput);
//! ```

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification of a [`TastebudError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller sent unusable input (blank review, empty batch).
    ClientInput,
    /// The process is deployed without usable artifacts or with a bad config.
    Configuration,
    /// The training dataset is missing or malformed.
    TrainingData,
    /// Anything else: I/O, encoding, numeric failures inside the model.
    Internal,
}

/// The main error type for Tastebud operations.
#[derive(Error, Debug)]
pub enum TastebudError {
    /// I/O errors (file operations, sockets, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Dataset parsing errors raised by the csv reader
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid request input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Analysis-related errors (char filters, tokenization, filtering)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// A required artifact file does not exist
    #[error("{kind} not found at {}. Please run `tastebud train` first.", .path.display())]
    ArtifactNotFound { kind: &'static str, path: PathBuf },

    /// Prediction was requested but no artifacts are loaded
    #[error("Model not loaded. Please ensure the model files exist.")]
    ArtifactsNotLoaded,

    /// An artifact exists but cannot be used with this build
    #[error("Incompatible artifact: {0}")]
    IncompatibleArtifact(String),

    /// The training dataset file does not exist
    #[error("Dataset not found at {}", .0.display())]
    DatasetNotFound(PathBuf),

    /// The training dataset exists but is unusable
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Model fitting or prediction errors
    #[error("Model error: {0}")]
    Model(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with TastebudError.
pub type Result<T> = std::result::Result<T, TastebudError>;

impl TastebudError {
    /// Create a new invalid input error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        TastebudError::InvalidInput(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        TastebudError::Analysis(msg.into())
    }

    /// Create a new incompatible artifact error.
    pub fn incompatible<S: Into<String>>(msg: S) -> Self {
        TastebudError::IncompatibleArtifact(msg.into())
    }

    /// Create a new dataset error.
    pub fn dataset<S: Into<String>>(msg: S) -> Self {
        TastebudError::Dataset(msg.into())
    }

    /// Create a new model error.
    pub fn model<S: Into<String>>(msg: S) -> Self {
        TastebudError::Model(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        TastebudError::Serialization(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        TastebudError::InvalidConfig(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        TastebudError::Other(msg.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TastebudError::InvalidInput(_) => ErrorKind::ClientInput,
            TastebudError::ArtifactNotFound { .. }
            | TastebudError::ArtifactsNotLoaded
            | TastebudError::IncompatibleArtifact(_)
            | TastebudError::InvalidConfig(_) => ErrorKind::Configuration,
            TastebudError::DatasetNotFound(_)
            | TastebudError::Dataset(_)
            | TastebudError::Csv(_) => ErrorKind::TrainingData,
            TastebudError::Io(_)
            | TastebudError::Json(_)
            | TastebudError::Analysis(_)
            | TastebudError::Model(_)
            | TastebudError::Serialization(_)
            | TastebudError::Other(_) => ErrorKind::Internal,
        }
    }
}

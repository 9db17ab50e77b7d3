//! Command line argument parsing for the Tastebud CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// Tastebud - sentiment classification for restaurant reviews
#[derive(Parser, Debug, Clone)]
#[command(name = "tastebud")]
#[command(about = "Train and serve a restaurant review sentiment classifier")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct TastebudArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl TastebudArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train a model and write its artifacts
    Train(TrainArgs),

    /// Run the HTTP prediction service
    Serve(ServeArgs),

    /// Predict the sentiment of reviews with trained artifacts
    Predict(PredictArgs),

    /// Show the processed form of texts
    Preprocess(PreprocessArgs),
}

/// Arguments for training
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// Training configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Tab separated dataset with a `Review` column
    #[arg(short, long, value_name = "DATASET")]
    pub dataset: Option<PathBuf>,

    /// Directory to write the artifacts to
    #[arg(short, long, value_name = "MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    /// Vocabulary cap of the vectorizer
    #[arg(long)]
    pub max_features: Option<usize>,

    /// Fraction of samples held out for evaluation
    #[arg(long)]
    pub test_size: Option<f64>,

    /// Seed of the train/test shuffle
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of cross-validation folds
    #[arg(long)]
    pub cv_folds: Option<usize>,

    /// Smoothing values to search (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub alpha: Vec<f64>,
}

/// Arguments for the HTTP service
#[derive(Parser, Debug, Clone)]
pub struct ServeArgs {
    /// Service configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Directory holding the artifacts
    #[arg(short, long, value_name = "MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    /// Start even if the artifacts cannot be loaded
    #[arg(long)]
    pub allow_unloaded: bool,
}

/// Arguments for offline prediction
#[derive(Parser, Debug, Clone)]
pub struct PredictArgs {
    /// Directory holding the artifacts
    #[arg(short, long, value_name = "MODEL_DIR", default_value = "models")]
    pub model_dir: PathBuf,

    /// Reviews to classify
    #[arg(value_name = "REVIEW", required = true)]
    pub reviews: Vec<String>,
}

/// Arguments for preprocessing
#[derive(Parser, Debug, Clone)]
pub struct PreprocessArgs {
    /// Texts to process
    #[arg(value_name = "TEXT", required = true)]
    pub texts: Vec<String>,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

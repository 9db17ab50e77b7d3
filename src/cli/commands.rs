//! Command implementations for the Tastebud CLI.

use log::info;

use crate::analysis::analyzer::ReviewAnalyzer;
use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::{ArtifactPaths, ServiceConfig, TrainingConfig};
use crate::error::Result;
use crate::inference::SentimentPredictor;
use crate::server;
use crate::training::Trainer;

/// Execute a CLI command.
pub fn execute_command(args: TastebudArgs) -> Result<()> {
    match &args.command {
        Command::Train(train_args) => train(train_args, &args),
        Command::Serve(serve_args) => serve(serve_args),
        Command::Predict(predict_args) => predict(predict_args, &args),
        Command::Preprocess(preprocess_args) => preprocess(preprocess_args, &args),
    }
}

/// Merge a config file (if any) with command line overrides.
pub fn training_config(args: &TrainArgs) -> Result<TrainingConfig> {
    let mut config = match &args.config {
        Some(path) => TrainingConfig::from_file(path)?,
        None => TrainingConfig::default(),
    };
    if let Some(dataset) = &args.dataset {
        config.dataset = dataset.clone();
    }
    if let Some(model_dir) = &args.model_dir {
        config.artifacts.model_dir = model_dir.clone();
    }
    if let Some(max_features) = args.max_features {
        config.max_features = max_features;
    }
    if let Some(test_size) = args.test_size {
        config.test_size = test_size;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(cv_folds) = args.cv_folds {
        config.cv_folds = cv_folds;
    }
    if !args.alpha.is_empty() {
        config.alpha_grid = args.alpha.clone();
    }
    config.validate()?;
    Ok(config)
}

/// Merge a config file (if any) with command line overrides.
pub fn service_config(args: &ServeArgs) -> Result<ServiceConfig> {
    let mut config = match &args.config {
        Some(path) => ServiceConfig::from_file(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(model_dir) = &args.model_dir {
        config.artifacts.model_dir = model_dir.clone();
    }
    if args.allow_unloaded {
        config.allow_unloaded = true;
    }
    config.validate()?;
    Ok(config)
}

/// Train a model.
fn train(args: &TrainArgs, cli_args: &TastebudArgs) -> Result<()> {
    let config = training_config(args)?;
    if cli_args.verbosity() > 1 {
        println!("Training on: {}", config.dataset.display());
    }

    let report = Trainer::new(config.clone())?.run()?;

    output_result("Training completed successfully", &report, cli_args)?;
    if cli_args.verbosity() > 0 && cli_args.output_format == OutputFormat::Human {
        let paths = &config.artifacts;
        println!();
        println!("Model saved to: {}", paths.model_path().display());
        println!("Vectorizer saved to: {}", paths.vectorizer_path().display());
        println!("Metrics saved to: {}", paths.metrics_path().display());
    }
    Ok(())
}

/// Run the HTTP service on a multi-threaded runtime.
fn serve(args: &ServeArgs) -> Result<()> {
    let config = service_config(args)?;
    info!("Starting service on {}", config.bind_address());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(server::serve(config))
}

/// Classify reviews with persisted artifacts.
fn predict(args: &PredictArgs, cli_args: &TastebudArgs) -> Result<()> {
    let predictor = SentimentPredictor::load(&ArtifactPaths::in_dir(&args.model_dir))?;
    let results = predictor.predict_batch(args.reviews.as_slice())?;

    output_result(
        "Predictions",
        &PredictionOutput {
            total: results.len(),
            results,
        },
        cli_args,
    )
}

/// Show what the review pipeline makes of each text.
fn preprocess(args: &PreprocessArgs, cli_args: &TastebudArgs) -> Result<()> {
    let analyzer = ReviewAnalyzer::new()?;
    let texts = args
        .texts
        .iter()
        .map(|text| {
            Ok(ProcessedText {
                text: text.clone(),
                processed: analyzer.process(text)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    output_result(
        "Processed texts",
        &PreprocessOutput {
            pipeline: analyzer.fingerprint().to_string(),
            texts,
        },
        cli_args,
    )
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;

    use super::*;

    fn train_args(argv: &[&str]) -> TrainArgs {
        let mut full = vec!["tastebud", "train"];
        full.extend_from_slice(argv);
        match TastebudArgs::try_parse_from(full).unwrap().command {
            Command::Train(args) => args,
            _ => panic!("Expected Train command"),
        }
    }

    #[test]
    fn test_training_overrides() {
        let config = training_config(&train_args(&[
            "--max-features",
            "500",
            "--cv-folds",
            "3",
            "-m",
            "artifacts",
        ]))
        .unwrap();
        assert_eq!(config.max_features, 500);
        assert_eq!(config.cv_folds, 3);
        assert_eq!(config.artifacts.model_dir, PathBuf::from("artifacts"));
        assert_eq!(config.alpha_grid, TrainingConfig::default().alpha_grid);
    }

    #[test]
    fn test_training_overrides_are_validated() {
        assert!(training_config(&train_args(&["--test-size", "1.5"])).is_err());
        assert!(training_config(&train_args(&["--cv-folds", "1"])).is_err());
    }

    #[test]
    fn test_service_overrides() {
        let args = ServeArgs {
            config: None,
            host: Some("127.0.0.1".to_string()),
            port: Some(8080),
            model_dir: None,
            allow_unloaded: true,
        };
        let config = service_config(&args).unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert!(config.allow_unloaded);
        assert_eq!(config.artifacts, ArtifactPaths::default());
    }
}

//! Output formatting for CLI commands.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, TastebudArgs};
use crate::error::Result;
use crate::inference::BatchItem;

/// Predictions for the reviews given on the command line.
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionOutput {
    pub results: Vec<BatchItem>,
    pub total: usize,
}

impl fmt::Display for PredictionOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in &self.results {
            match item {
                BatchItem::Prediction(p) => writeln!(
                    f,
                    "{:<8} {:.4}  {}",
                    p.sentiment.as_str(),
                    p.confidence,
                    p.review
                )?,
                BatchItem::Failed { review, error } => {
                    writeln!(f, "{:<8} {:<6}  {review:?} ({error})", "error", "-")?
                }
            }
        }
        write!(f, "Total: {}", self.total)
    }
}

/// One text and its processed form.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessedText {
    pub text: String,
    pub processed: String,
}

/// Result of the preprocess command.
#[derive(Debug, Serialize, Deserialize)]
pub struct PreprocessOutput {
    /// Fingerprint of the pipeline that produced the output.
    pub pipeline: String,
    pub texts: Vec<ProcessedText>,
}

impl fmt::Display for PreprocessOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in &self.texts {
            writeln!(f, "{}", item.text)?;
            writeln!(f, "  -> {:?}", item.processed)?;
        }
        write!(f, "Pipeline: {}", self.pipeline)
    }
}

/// Output a result in the specified format.
pub fn output_result<T>(message: &str, result: &T, args: &TastebudArgs) -> Result<()>
where
    T: Serialize + fmt::Display,
{
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in human-readable format.
fn output_human<T: fmt::Display>(message: &str, result: &T, args: &TastebudArgs) -> Result<()> {
    if args.verbosity() > 0 {
        println!("{message}");
        println!();
    }
    println!("{result}");
    Ok(())
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &TastebudArgs) -> Result<()> {
    println!("{}", to_json(result, args.pretty)?);
    Ok(())
}

fn to_json<T: Serialize>(result: &T, pretty: bool) -> Result<String> {
    Ok(if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{PredictionResult, Sentiment};

    fn sample() -> PredictionOutput {
        PredictionOutput {
            results: vec![
                BatchItem::Prediction(PredictionResult {
                    review: "Great food".to_string(),
                    sentiment: Sentiment::Positive,
                    confidence: 0.9,
                    prediction: 1,
                }),
                BatchItem::Failed {
                    review: String::new(),
                    error: "Empty review text".to_string(),
                },
            ],
            total: 2,
        }
    }

    #[test]
    fn test_prediction_human() {
        let text = sample().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "positive 0.9000  Great food");
        assert!(lines[1].starts_with("error"));
        assert!(lines[1].contains("Empty review text"));
        assert_eq!(lines[2], "Total: 2");
    }

    #[test]
    fn test_prediction_json() {
        let json: serde_json::Value =
            serde_json::from_str(&to_json(&sample(), false).unwrap()).unwrap();
        assert_eq!(json["total"], 2);
        assert_eq!(json["results"][0]["sentiment"], "positive");
        assert_eq!(json["results"][1]["error"], "Empty review text");
    }

    #[test]
    fn test_preprocess_human() {
        let output = PreprocessOutput {
            pipeline: "review-v1-00000000".to_string(),
            texts: vec![ProcessedText {
                text: "Loved it!".to_string(),
                processed: "love".to_string(),
            }],
        };
        assert_eq!(
            output.to_string(),
            "Loved it!\n  -> \"love\"\nPipeline: review-v1-00000000"
        );
    }
}

//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, VeracityArgs};
use crate::error::Result;
use crate::ml::evaluation::Metrics;
use crate::ml::pipeline::{LoadSummary, TrainingReport};

/// One classified text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledPrediction {
    pub text: String,
    pub label: String,
}

/// Result structure for the train command.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainingOutput {
    pub data: LoadSummary,
    pub report: TrainingReport,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub predictions: Vec<LabeledPrediction>,
}

/// Result structure for the predict command.
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionOutput {
    pub data: LoadSummary,
    pub model_type: String,
    pub predictions: Vec<LabeledPrediction>,
}

/// Print training results in the requested format.
pub fn output_training(result: &TrainingOutput, args: &VeracityArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Json => output_json(result, args),
        OutputFormat::Human => {
            print!("{}", render_training(result, args.verbosity()));
            Ok(())
        }
    }
}

/// Print predictions in the requested format.
pub fn output_predictions(result: &PredictionOutput, args: &VeracityArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Json => output_json(result, args),
        OutputFormat::Human => {
            print!("{}", render_predictions(result, args.verbosity()));
            Ok(())
        }
    }
}

fn output_json<T: Serialize>(result: &T, args: &VeracityArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    println!("{json}");
    Ok(())
}

/// Human-readable rendering of a training run.
pub fn render_training(result: &TrainingOutput, verbosity: u8) -> String {
    let report = &result.report;
    let summary = &report.summary;
    let mut out = String::new();

    out.push_str(&format!("{}\n", report.train_result_message));
    if verbosity > 0 {
        out.push_str(&format!(
            "records: {} accepted, {} dropped\n",
            result.data.accepted, result.data.dropped
        ));
        out.push_str(&format!(
            "split: {} train / {} validation / {} test, vocabulary {} terms, {} ms\n",
            summary.train_size,
            summary.validation_size,
            summary.test_size,
            summary.vocabulary_size,
            summary.duration_ms
        ));
    }

    out.push_str("\nTest metrics\n");
    out.push_str(&render_metrics(&report.metrics, verbosity));
    if let Some(validation) = &report.validation_metrics {
        out.push_str("\nValidation metrics\n");
        out.push_str(&render_metrics(validation, verbosity));
    }

    if !result.predictions.is_empty() {
        out.push_str("\nPredictions\n");
        out.push_str(&render_prediction_lines(&result.predictions));
    }
    out
}

fn render_metrics(metrics: &Metrics, verbosity: u8) -> String {
    if verbosity > 1 {
        metrics.to_string()
    } else {
        format!("{}\n", metrics.summary())
    }
}

/// Human-readable rendering of predictions.
pub fn render_predictions(result: &PredictionOutput, verbosity: u8) -> String {
    let mut out = String::new();
    if verbosity > 1 {
        out.push_str(&format!(
            "{} model trained on {} records ({} dropped)\n",
            result.model_type, result.data.accepted, result.data.dropped
        ));
    }
    out.push_str(&render_prediction_lines(&result.predictions));
    out
}

fn render_prediction_lines(predictions: &[LabeledPrediction]) -> String {
    predictions
        .iter()
        .map(|p| format!("{:<6} {}\n", p.label, p.text))
        .collect()
}

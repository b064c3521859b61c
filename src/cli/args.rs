//! Command line argument parsing for the Veracity CLI using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::ml::classifier::ModelType;

/// Veracity - train and query real/fake text classifiers
#[derive(Parser, Debug, Clone)]
#[command(name = "veracity")]
#[command(about = "Train TF-IDF text classifiers on labelled real/fake data")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct VeracityArgs {
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

impl VeracityArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train a model and report test metrics
    Train(TrainArgs),

    /// Train a model and classify the given texts
    Predict(PredictArgs),
}

/// Options shared by every command that trains a model
#[derive(Args, Debug, Clone)]
pub struct TrainingOptions {
    /// Labelled records, a JSON array of {"text", "label"} objects
    #[arg(value_name = "DATA_FILE")]
    pub data: PathBuf,

    /// Model type: knn, logistic_regression, random_forest or decision_tree
    #[arg(short, long, default_value = "knn")]
    pub model: ModelType,

    /// Pipeline configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Seed for the train/validation/test shuffle
    #[arg(long)]
    pub seed: Option<u64>,

    /// Use at most this many records
    #[arg(long)]
    pub max_samples: Option<usize>,
}

/// Arguments for training
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    #[command(flatten)]
    pub options: TrainingOptions,

    /// Texts to classify after training
    #[arg(short, long = "predict", value_name = "TEXT")]
    pub predict: Vec<String>,
}

/// Arguments for prediction
#[derive(Parser, Debug, Clone)]
pub struct PredictArgs {
    #[command(flatten)]
    pub options: TrainingOptions,

    /// Texts to classify
    #[arg(value_name = "TEXT", required = true, num_args = 1..)]
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

//! Command implementations for the Veracity CLI.

use anyhow::{Context, Result};
use log::info;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::ml::config::PipelineConfig;
use crate::ml::pipeline::{LoadSummary, Pipeline};
use crate::ml::types::load_labeled_texts;

/// Execute a CLI command.
pub async fn execute_command(args: VeracityArgs) -> Result<()> {
    match &args.command {
        Command::Train(train_args) => train(train_args.clone(), &args).await,
        Command::Predict(predict_args) => predict(predict_args.clone(), &args).await,
    }
}

/// Build the pipeline configuration from a file and command line overrides.
pub fn load_config(options: &TrainingOptions) -> Result<PipelineConfig> {
    let mut config = match &options.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(seed) = options.seed {
        config = config.with_seed(seed);
    }
    if let Some(max_samples) = options.max_samples {
        config = config.with_max_samples(max_samples);
    }
    config.validate()?;
    Ok(config)
}

/// Load the data file into a fresh pipeline.
fn prepare(options: &TrainingOptions) -> Result<(Pipeline, LoadSummary)> {
    let config = load_config(options)?;
    let records = load_labeled_texts(&options.data)
        .with_context(|| format!("failed to read records from {}", options.data.display()))?;
    info!(
        "read {} records from {}",
        records.len(),
        options.data.display()
    );

    let mut pipeline = Pipeline::new(options.model, config)?;
    let loaded = pipeline.load_data(records)?;
    Ok((pipeline, loaded))
}

fn classify(pipeline: &Pipeline, texts: &[String]) -> Result<Vec<LabeledPrediction>> {
    texts
        .iter()
        .map(|text| {
            let prediction = pipeline
                .predict(text)
                .with_context(|| format!("failed to classify '{text}'"))?;
            Ok(LabeledPrediction {
                text: text.clone(),
                label: prediction.label,
            })
        })
        .collect()
}

/// Train, evaluate and optionally classify extra texts.
async fn train(args: TrainArgs, cli_args: &VeracityArgs) -> Result<()> {
    let (mut pipeline, data) = prepare(&args.options)?;
    pipeline.fit().await.context("training failed")?;
    let report = pipeline.evaluate().context("evaluation failed")?;
    let predictions = classify(&pipeline, &args.predict)?;

    output_training(
        &TrainingOutput {
            data,
            report,
            predictions,
        },
        cli_args,
    )?;
    Ok(())
}

/// Train on the data file and classify the given texts.
async fn predict(args: PredictArgs, cli_args: &VeracityArgs) -> Result<()> {
    let (mut pipeline, data) = prepare(&args.options)?;
    pipeline.fit().await.context("training failed")?;
    let predictions = classify(&pipeline, &args.texts)?;

    output_predictions(
        &PredictionOutput {
            data,
            model_type: pipeline.model_type().to_string(),
            predictions,
        },
        cli_args,
    )?;
    Ok(())
}

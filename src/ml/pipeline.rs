//! Train/evaluate/predict orchestration.
//!
//! A [`Pipeline`] owns one vectorizer and one classifier and moves through
//! `Idle -> DataLoaded -> Fitted -> Evaluated`. Labels are translated to
//! class codes on the way in and back to strings on the way out; the
//! mapping is fixed by [`LabelCodec`] (code 1 is the positive class).
//!
//! # Examples
//!
//! ```
//! use veracity::ml::classifier::ModelType;
//! use veracity::ml::config::PipelineConfig;
//! use veracity::ml::pipeline::Pipeline;
//! use veracity::ml::split::SplitRatios;
//! use veracity::ml::types::LabeledText;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> veracity::error::Result<()> {
//! let config = PipelineConfig::default().with_split(SplitRatios::new(1.0, 0.0)?);
//! let mut pipeline = Pipeline::new(ModelType::Knn, config)?;
//!
//! pipeline.load_data(vec![
//!     LabeledText::new("good news today", "real"),
//!     LabeledText::new("fake scandal exposed", "fake"),
//!     LabeledText::new("great news update", "real"),
//!     LabeledText::new("scandal is fake", "fake"),
//! ])?;
//! pipeline.fit().await?;
//!
//! assert_eq!(pipeline.predict("good news today")?.label, "real");
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VeracityError};
use crate::ml::classifier::{Classifier, ModelType, build_classifier};
use crate::ml::config::PipelineConfig;
use crate::ml::evaluation::{self, Metrics};
use crate::ml::labels::LabelCodec;
use crate::ml::types::LabeledText;
use crate::ml::vectorizer::TfIdfVectorizer;

/// Lifecycle of a [`Pipeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    /// Nothing loaded yet.
    Idle,
    /// Records accepted, no model trained on them.
    DataLoaded,
    /// A model is trained and ready to predict.
    Fitted,
    /// The trained model has been scored.
    Evaluated,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::DataLoaded => "data_loaded",
            PipelineState::Fitted => "fitted",
            PipelineState::Evaluated => "evaluated",
        };
        f.write_str(name)
    }
}

/// Outcome of [`Pipeline::load_data`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSummary {
    /// Records kept for training.
    pub accepted: usize,
    /// Records dropped for a blank text or an unknown label.
    pub dropped: usize,
}

/// Facts about one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub model_type: ModelType,
    pub train_size: usize,
    pub validation_size: usize,
    pub test_size: usize,
    pub vocabulary_size: usize,
    /// Wall-clock training time in milliseconds.
    pub duration_ms: u64,
    pub trained_at: DateTime<Utc>,
}

/// Result of [`Pipeline::evaluate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Human-readable outcome of the training run.
    pub train_result_message: String,
    /// Scores on the test partition.
    pub metrics: Metrics,
    /// Scores on the validation partition, when it is not empty.
    pub validation_metrics: Option<Metrics>,
    pub summary: TrainingSummary,
}

/// A predicted class label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
}

/// Vectorized held-out partition.
#[derive(Debug, Default)]
struct HeldOut {
    features: Vec<Vec<f64>>,
    codes: Vec<u8>,
}

impl HeldOut {
    fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    fn score(&self, classifier: &dyn Classifier) -> Result<Metrics> {
        let predicted = classifier.predict_batch(&self.features)?;
        evaluation::evaluate(&self.codes, &predicted)
    }
}

/// Everything produced by one successful `fit`.
#[derive(Debug)]
struct TrainedModel {
    vectorizer: TfIdfVectorizer,
    classifier: Box<dyn Classifier>,
    validation: HeldOut,
    test: HeldOut,
    summary: TrainingSummary,
}

/// One independent training session.
#[derive(Debug)]
pub struct Pipeline {
    model_type: ModelType,
    config: PipelineConfig,
    state: PipelineState,
    texts: Vec<String>,
    codes: Vec<u8>,
    trained: Option<TrainedModel>,
    report: Option<TrainingReport>,
}

impl Pipeline {
    /// Create an idle pipeline for the given model type.
    pub fn new(model_type: ModelType, config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            model_type,
            config,
            state: PipelineState::Idle,
            texts: Vec::new(),
            codes: Vec::new(),
            trained: None,
            report: None,
        })
    }

    pub fn model_type(&self) -> ModelType {
        self.model_type
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn labels(&self) -> &LabelCodec {
        &self.config.labels
    }

    /// Number of records accepted by the last `load_data`.
    pub fn record_count(&self) -> usize {
        self.codes.len()
    }

    /// Whether a trained model is available for prediction.
    pub fn is_trained(&self) -> bool {
        self.trained.is_some()
    }

    /// Summary of the current model, if trained.
    pub fn summary(&self) -> Option<&TrainingSummary> {
        self.trained.as_ref().map(|trained| &trained.summary)
    }

    /// The last evaluation report, cleared whenever the model changes.
    pub fn report(&self) -> Option<&TrainingReport> {
        self.report.as_ref()
    }

    /// Vocabulary size of the current model, if trained.
    pub fn vocabulary_size(&self) -> Option<usize> {
        self.trained
            .as_ref()
            .map(|trained| trained.vectorizer.vocabulary_size())
    }

    /// Accept labelled records, replacing any previous data and model.
    ///
    /// Records with a blank text or a label outside the two class strings are
    /// dropped and logged. If nothing survives, `NoValidData` is returned and
    /// the pipeline is left as it was.
    pub fn load_data<I>(&mut self, records: I) -> Result<LoadSummary>
    where
        I: IntoIterator<Item = LabeledText>,
    {
        let mut texts = Vec::new();
        let mut codes = Vec::new();
        let mut dropped = 0;

        for (index, record) in records.into_iter().enumerate() {
            match self.parse_record(record) {
                Ok((text, code)) => {
                    texts.push(text);
                    codes.push(code);
                }
                Err(e) => {
                    debug_assert!(e.is_recoverable());
                    warn!("skipping record {index}: {e}");
                    dropped += 1;
                }
            }
        }

        if texts.is_empty() {
            return Err(VeracityError::no_valid_data(format!(
                "all {dropped} records were dropped"
            )));
        }

        let summary = LoadSummary {
            accepted: texts.len(),
            dropped,
        };
        info!(
            "loaded {} records for {} ({} dropped)",
            summary.accepted, self.model_type, summary.dropped
        );

        self.texts = texts;
        self.codes = codes;
        self.trained = None;
        self.report = None;
        self.state = PipelineState::DataLoaded;

        Ok(summary)
    }

    fn parse_record(&self, record: LabeledText) -> Result<(String, u8)> {
        if record.text.trim().is_empty() {
            return Err(VeracityError::parse_failure("text is blank"));
        }
        let code = self.config.labels.encode(&record.label).ok_or_else(|| {
            VeracityError::parse_failure(format!("unknown label '{}'", record.label))
        })?;
        Ok((record.text, code))
    }

    /// Split the loaded data, fit the vectorizer and train the classifier.
    ///
    /// Allowed after `load_data` and again after a previous fit. The new
    /// model replaces the old one only when every step succeeds; a previous
    /// evaluation report is discarded.
    pub async fn fit(&mut self) -> Result<TrainingSummary> {
        if self.state == PipelineState::Idle {
            return Err(VeracityError::invalid_state(
                "fit requires loaded data, call load_data first",
            ));
        }

        let started = Instant::now();
        let split = self
            .config
            .splitter()
            .split(self.texts.clone(), self.codes.clone())?;

        let mut vectorizer = TfIdfVectorizer::with_config(self.config.vectorizer.clone())?;
        let train_features = vectorizer.fit_transform(&split.train.items)?;

        let mut classifier = build_classifier(self.model_type, &self.config.classifier)?;
        classifier.fit(&train_features, &split.train.labels).await?;

        let validation = HeldOut {
            features: vectorizer.transform_batch(&split.validation.items)?,
            codes: split.validation.labels,
        };
        let test = HeldOut {
            features: vectorizer.transform_batch(&split.test.items)?,
            codes: split.test.labels,
        };

        let summary = TrainingSummary {
            model_type: self.model_type,
            train_size: split.train.items.len(),
            validation_size: validation.codes.len(),
            test_size: test.codes.len(),
            vocabulary_size: vectorizer.vocabulary_size(),
            duration_ms: started.elapsed().as_millis() as u64,
            trained_at: Utc::now(),
        };
        info!(
            "trained {} on {} samples (vocabulary {}, {} ms)",
            summary.model_type, summary.train_size, summary.vocabulary_size, summary.duration_ms
        );

        self.trained = Some(TrainedModel {
            vectorizer,
            classifier,
            validation,
            test,
            summary: summary.clone(),
        });
        self.report = None;
        self.state = PipelineState::Fitted;

        Ok(summary)
    }

    /// Score the trained model on the held-out partitions.
    pub fn evaluate(&mut self) -> Result<TrainingReport> {
        if !matches!(self.state, PipelineState::Fitted | PipelineState::Evaluated) {
            return Err(VeracityError::invalid_state(format!(
                "evaluate requires a fitted model, pipeline is {}",
                self.state
            )));
        }
        let trained = self
            .trained
            .as_ref()
            .ok_or_else(|| VeracityError::uninitialized("no trained model"))?;

        let metrics = trained.test.score(trained.classifier.as_ref())?;
        let validation_metrics = if trained.validation.is_empty() {
            None
        } else {
            Some(trained.validation.score(trained.classifier.as_ref())?)
        };
        if trained.test.is_empty() {
            warn!("test partition is empty, metrics default to zero");
        }

        let report = TrainingReport {
            train_result_message: format!(
                "Model {} trained successfully on {} samples!",
                self.model_type, trained.summary.train_size
            ),
            metrics,
            validation_metrics,
            summary: trained.summary.clone(),
        };
        info!("evaluated {}: {}", self.model_type, report.metrics.summary());

        self.report = Some(report.clone());
        self.state = PipelineState::Evaluated;
        Ok(report)
    }

    /// Load, fit and evaluate in one call.
    ///
    /// The cycle runs on a fresh pipeline that replaces this one only after
    /// every step succeeds. On error the previous data, model and report are
    /// untouched.
    pub async fn train_and_evaluate<I>(&mut self, records: I) -> Result<TrainingReport>
    where
        I: IntoIterator<Item = LabeledText>,
    {
        let mut next = Pipeline::new(self.model_type, self.config.clone())?;
        next.load_data(records)?;
        next.fit().await?;
        let report = next.evaluate()?;

        *self = next;
        Ok(report)
    }

    /// Predict the label of one text.
    pub fn predict(&self, text: &str) -> Result<Prediction> {
        let trained = self.trained.as_ref().ok_or_else(|| {
            VeracityError::uninitialized(format!(
                "{} pipeline has no trained model, call fit first",
                self.model_type
            ))
        })?;
        if text.trim().is_empty() {
            return Err(VeracityError::parse_failure("cannot classify blank text"));
        }

        let features = trained.vectorizer.transform(text)?;
        let code = trained.classifier.predict_one(&features)?;
        let label = self.config.labels.decode(code)?.to_string();
        debug!("predicted '{label}' for {} chars of text", text.len());

        Ok(Prediction { label })
    }

    /// Predict labels for several texts. Fails on the first bad text.
    pub fn predict_batch<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<Prediction>> {
        texts.iter().map(|text| self.predict(text.as_ref())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::split::SplitRatios;

    fn records() -> Vec<LabeledText> {
        vec![
            LabeledText::new("good news today", "real"),
            LabeledText::new("fake scandal exposed", "fake"),
            LabeledText::new("great news update", "real"),
            LabeledText::new("scandal is fake", "fake"),
        ]
    }

    fn train_everything() -> PipelineConfig {
        PipelineConfig::default().with_split(SplitRatios::new(1.0, 0.0).unwrap())
    }

    #[test]
    fn test_load_data_filters_records() {
        let mut pipeline = Pipeline::new(ModelType::Knn, PipelineConfig::default()).unwrap();
        let mut input = records();
        input.push(LabeledText::new("   ", "real"));
        input.push(LabeledText::new("satire piece", "satire"));
        input.push(LabeledText::new("Shouty news", " REAL "));

        let summary = pipeline.load_data(input).unwrap();
        assert_eq!(summary, LoadSummary { accepted: 5, dropped: 2 });
        assert_eq!(pipeline.state(), PipelineState::DataLoaded);
        assert_eq!(pipeline.record_count(), 5);
    }

    #[test]
    fn test_no_valid_data_keeps_state() {
        let mut pipeline = Pipeline::new(ModelType::Knn, PipelineConfig::default()).unwrap();
        let result = pipeline.load_data(vec![LabeledText::new("text", "unknown")]);

        assert!(matches!(result, Err(VeracityError::NoValidData(_))));
        assert_eq!(pipeline.state(), PipelineState::Idle);

        assert!(matches!(
            pipeline.load_data(Vec::new()),
            Err(VeracityError::NoValidData(_))
        ));
    }

    #[tokio::test]
    async fn test_state_transitions() {
        let mut pipeline = Pipeline::new(ModelType::DecisionTree, train_everything()).unwrap();

        assert!(matches!(pipeline.fit().await, Err(VeracityError::InvalidState(_))));
        assert!(matches!(pipeline.evaluate(), Err(VeracityError::InvalidState(_))));

        pipeline.load_data(records()).unwrap();
        assert!(matches!(pipeline.evaluate(), Err(VeracityError::InvalidState(_))));

        pipeline.fit().await.unwrap();
        assert_eq!(pipeline.state(), PipelineState::Fitted);

        pipeline.evaluate().unwrap();
        assert_eq!(pipeline.state(), PipelineState::Evaluated);
        assert!(pipeline.report().is_some());

        // re-evaluate is allowed
        pipeline.evaluate().unwrap();

        // retraining invalidates the report
        pipeline.fit().await.unwrap();
        assert_eq!(pipeline.state(), PipelineState::Fitted);
        assert!(pipeline.report().is_none());
    }

    #[tokio::test]
    async fn test_predict_round_trips_labels() {
        let mut pipeline = Pipeline::new(ModelType::Knn, train_everything()).unwrap();
        pipeline.load_data(records()).unwrap();
        pipeline.fit().await.unwrap();

        assert_eq!(pipeline.predict("good news today").unwrap().label, "real");
        assert_eq!(pipeline.predict("fake scandal exposed").unwrap().label, "fake");

        let batch = pipeline.predict_batch(&["great news update", "scandal is fake"]).unwrap();
        assert_eq!(batch[0].label, "real");
        assert_eq!(batch[1].label, "fake");
    }

    #[tokio::test]
    async fn test_predict_errors() {
        let mut pipeline = Pipeline::new(ModelType::Knn, train_everything()).unwrap();
        assert!(matches!(
            pipeline.predict("anything"),
            Err(VeracityError::Uninitialized(_))
        ));

        pipeline.load_data(records()).unwrap();
        pipeline.fit().await.unwrap();
        assert!(matches!(pipeline.predict("  "), Err(VeracityError::ParseFailure(_))));
        // unknown words still produce a prediction
        assert!(pipeline.predict("zebra").is_ok());
    }

    #[tokio::test]
    async fn test_failed_fit_keeps_previous_model() {
        let mut pipeline = Pipeline::new(ModelType::Knn, train_everything()).unwrap();
        pipeline.load_data(records()).unwrap();
        pipeline.fit().await.unwrap();
        pipeline.evaluate().unwrap();

        // an empty training partition makes the classifier refuse to fit
        pipeline.config.split = SplitRatios::new(0.0, 0.0).unwrap();
        assert!(matches!(
            pipeline.fit().await,
            Err(VeracityError::InsufficientData(_))
        ));

        assert_eq!(pipeline.state(), PipelineState::Evaluated);
        assert!(pipeline.report().is_some());
        assert_eq!(pipeline.predict("good news today").unwrap().label, "real");
    }

    #[tokio::test]
    async fn test_failed_cycle_keeps_previous_session() {
        let mut pipeline = Pipeline::new(ModelType::Knn, PipelineConfig::default()).unwrap();
        let mut corpus = records();
        for i in 0..8 {
            corpus.push(LabeledText::new(format!("official update {i}"), "real"));
            corpus.push(LabeledText::new(format!("hoax {i} exposed"), "fake"));
        }
        let report = pipeline.train_and_evaluate(corpus).await.unwrap();
        let before = pipeline.predict("good news today").unwrap();

        // one record leaves the default 70% train partition empty
        let result = pipeline
            .train_and_evaluate(vec![LabeledText::new("lone claim", "fake")])
            .await;
        assert!(matches!(result, Err(VeracityError::InsufficientData(_))));

        assert_eq!(pipeline.state(), PipelineState::Evaluated);
        assert_eq!(pipeline.record_count(), 20);
        assert_eq!(pipeline.report(), Some(&report));
        assert_eq!(pipeline.predict("good news today").unwrap(), before);

        // nothing valid leaves the session alone too
        let result = pipeline
            .train_and_evaluate(vec![LabeledText::new("", "real")])
            .await;
        assert!(matches!(result, Err(VeracityError::NoValidData(_))));
        assert_eq!(pipeline.report(), Some(&report));
    }

    #[tokio::test]
    async fn test_report_contents() {
        let config = PipelineConfig::default()
            .with_split(SplitRatios::new(0.5, 0.25).unwrap())
            .with_seed(5);
        let mut pipeline = Pipeline::new(ModelType::LogisticRegression, config).unwrap();

        let report = pipeline.train_and_evaluate(records()).await.unwrap();
        assert_eq!(report.summary.train_size, 2);
        assert_eq!(report.summary.validation_size, 1);
        assert_eq!(report.summary.test_size, 1);
        assert!(report.validation_metrics.is_some());
        assert_eq!(report.metrics.total(), 1);
        assert!(report.train_result_message.contains("logistic_regression"));
        assert!((0.0..=1.0).contains(&report.metrics.accuracy));
    }

    #[tokio::test]
    async fn test_load_data_resets_model() {
        let mut pipeline = Pipeline::new(ModelType::Knn, train_everything()).unwrap();
        pipeline.load_data(records()).unwrap();
        pipeline.fit().await.unwrap();
        assert!(pipeline.is_trained());

        pipeline.load_data(records()).unwrap();
        assert!(!pipeline.is_trained());
        assert_eq!(pipeline.state(), PipelineState::DataLoaded);
        assert!(matches!(pipeline.evaluate(), Err(VeracityError::InvalidState(_))));
    }
}

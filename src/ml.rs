//! Text classification: TF-IDF features, classifiers and the training pipeline.
//!
//! Data flows one way:
//!
//! ```text
//! LabeledText -> tokens -> TF-IDF vectors -> split -> classifier -> predictions -> metrics
//! ```
//!
//! [`pipeline::Pipeline`] drives the whole cycle for one session and
//! [`registry::SessionRegistry`] keeps independent pipelines apart.

pub mod classifier;
pub mod config;
pub mod evaluation;
pub mod labels;
pub mod pipeline;
pub mod registry;
pub mod split;
pub mod types;
pub mod vectorizer;

pub use classifier::{Classifier, ClassifierConfig, ModelType, PredictInput, PredictOutput};
pub use config::PipelineConfig;
pub use evaluation::{Metrics, evaluate};
pub use labels::LabelCodec;
pub use pipeline::{Pipeline, PipelineState, Prediction, TrainingReport, TrainingSummary};
pub use registry::{SessionId, SessionRegistry};
pub use split::{DatasetSplit, DatasetSplitter, SplitRatios};
pub use types::LabeledText;
pub use vectorizer::{IdfWeighting, TfIdfVectorizer, VectorizerConfig};

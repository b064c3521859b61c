//! # Veracity
//!
//! Classical text classification for labelled "real"/"fake" datasets.
//!
//! ## Features
//!
//! - Regex tokenizer and analyzer chain with optional tweet normalization
//! - TF-IDF vectorizer with fixed-width feature vectors
//! - Shuffled train/validation/test splitting
//! - k-NN, decision tree, random forest and logistic regression classifiers
//! - Confusion-matrix metrics with a per-class report
//! - A training pipeline state machine and a per-session registry

pub mod analysis;
pub mod cli;
pub mod error;
pub mod ml;

pub mod prelude {
    pub use crate::error::{Result, VeracityError};
    pub use crate::ml::{
        Classifier, LabeledText, Metrics, ModelType, Pipeline, PipelineConfig, Prediction,
        SessionRegistry, TfIdfVectorizer, TrainingReport,
    };
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Classifier adapter: one fit/predict contract over every model type.
//!
//! Features are TF-IDF vectors of a fixed width, labels are class codes
//! (`0`/`1`). Translation to semantic labels is the pipeline's job.
//!
//! # Examples
//!
//! ```
//! use veracity::ml::classifier::{ClassifierConfig, ModelType, PredictInput, PredictOutput, build_classifier};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> veracity::error::Result<()> {
//! let model_type: ModelType = "knn".parse()?;
//! let mut classifier = build_classifier(model_type, &ClassifierConfig::default())?;
//!
//! let features = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
//! classifier.fit(&features, &[1, 0]).await?;
//!
//! let output = classifier.predict(PredictInput::Single(&[0.9, 0.1]))?;
//! assert_eq!(output, PredictOutput::Single(1));
//! # Ok(())
//! # }
//! ```

pub mod forest;
pub mod knn;
pub mod logistic;
pub mod tree;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VeracityError};
use crate::ml::labels::{self, NEGATIVE, POSITIVE};

pub use forest::{RandomForestClassifier, RandomForestConfig};
pub use knn::{KnnClassifier, KnnConfig};
pub use logistic::{LogisticRegressionClassifier, LogisticRegressionConfig};
pub use tree::{DecisionTreeClassifier, DecisionTreeConfig};

/// Input accepted by [`Classifier::predict`].
#[derive(Debug, Clone, Copy)]
pub enum PredictInput<'a> {
    /// One feature vector.
    Single(&'a [f64]),
    /// Several feature vectors.
    Batch(&'a [Vec<f64>]),
}

/// Output of [`Classifier::predict`], shaped like the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictOutput {
    Single(u8),
    Batch(Vec<u8>),
}

/// Binary text classifier over fixed-width feature vectors.
///
/// `fit` is asynchronous for every implementation so callers drive all model
/// types the same way.
#[async_trait]
pub trait Classifier: Send + Sync + fmt::Debug {
    /// Train on parallel feature rows and class codes.
    ///
    /// Fails with `ShapeMismatch` on unequal lengths, `InsufficientData` on an
    /// empty set and `TypeMismatch` on ragged rows or non-binary codes. A
    /// failed fit leaves the previous model in place.
    async fn fit(&mut self, features: &[Vec<f64>], labels: &[u8]) -> Result<()>;

    /// Predict the class code of one feature vector.
    fn predict_one(&self, features: &[f64]) -> Result<u8>;

    /// Predict class codes for several feature vectors.
    fn predict_batch(&self, rows: &[Vec<f64>]) -> Result<Vec<u8>> {
        rows.iter().map(|row| self.predict_one(row)).collect()
    }

    /// Predict a single code or a batch of codes, depending on the input.
    fn predict(&self, input: PredictInput<'_>) -> Result<PredictOutput> {
        match input {
            PredictInput::Single(row) => self.predict_one(row).map(PredictOutput::Single),
            PredictInput::Batch(rows) => self.predict_batch(rows).map(PredictOutput::Batch),
        }
    }

    /// Whether `fit` has completed successfully.
    fn is_fitted(&self) -> bool;

    /// Feature width seen during training.
    fn n_features(&self) -> Option<usize>;

    /// The algorithm behind this classifier.
    fn model_type(&self) -> ModelType;
}

/// Supported classification algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    /// k-nearest neighbours over Euclidean distance.
    Knn,
    /// Logistic regression trained with batch gradient descent.
    LogisticRegression,
    /// Bagged decision trees with majority vote.
    RandomForest,
    /// Single CART tree with Gini impurity.
    DecisionTree,
}

impl ModelType {
    /// Every supported model type.
    pub const ALL: [ModelType; 4] = [
        ModelType::Knn,
        ModelType::LogisticRegression,
        ModelType::RandomForest,
        ModelType::DecisionTree,
    ];

    /// Canonical selector string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::Knn => "knn",
            ModelType::LogisticRegression => "logistic_regression",
            ModelType::RandomForest => "random_forest",
            ModelType::DecisionTree => "decision_tree",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelType {
    type Err = VeracityError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        ModelType::ALL
            .into_iter()
            .find(|model_type| model_type.as_str() == normalized)
            .ok_or_else(|| {
                VeracityError::invalid_config(format!(
                    "unknown model type '{s}', expected one of knn, logistic_regression, random_forest, decision_tree"
                ))
            })
    }
}

/// Hyperparameters for every model type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub knn: KnnConfig,
    pub logistic_regression: LogisticRegressionConfig,
    pub decision_tree: DecisionTreeConfig,
    pub random_forest: RandomForestConfig,
}

impl ClassifierConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.knn.validate()?;
        self.logistic_regression.validate()?;
        self.decision_tree.validate()?;
        self.random_forest.validate()
    }
}

/// Create an unfitted classifier of the requested type.
pub fn build_classifier(model_type: ModelType, config: &ClassifierConfig) -> Result<Box<dyn Classifier>> {
    let classifier: Box<dyn Classifier> = match model_type {
        ModelType::Knn => Box::new(KnnClassifier::new(config.knn.clone())?),
        ModelType::LogisticRegression => Box::new(LogisticRegressionClassifier::new(
            config.logistic_regression.clone(),
        )?),
        ModelType::RandomForest => Box::new(RandomForestClassifier::new(config.random_forest.clone())?),
        ModelType::DecisionTree => Box::new(DecisionTreeClassifier::new(config.decision_tree.clone())?),
    };
    Ok(classifier)
}

/// Check a training set and return its feature width.
pub fn validate_training_set(features: &[Vec<f64>], labels: &[u8]) -> Result<usize> {
    if features.len() != labels.len() {
        return Err(VeracityError::shape_mismatch(features.len(), labels.len()));
    }
    let Some(first) = features.first() else {
        return Err(VeracityError::insufficient_data(
            "classifier needs at least one training sample",
        ));
    };

    let n_features = first.len();
    for (row, values) in features.iter().enumerate() {
        if values.len() != n_features {
            return Err(VeracityError::type_mismatch(format!(
                "ragged training data: row {row} has {} features, expected {n_features}",
                values.len()
            )));
        }
    }
    for &label in labels {
        labels::check_code(label)?;
    }

    Ok(n_features)
}

/// Check a predict-time row against the fitted feature width.
pub fn check_dimensions(n_features: Option<usize>, row: &[f64]) -> Result<usize> {
    let Some(expected) = n_features else {
        return Err(VeracityError::uninitialized(
            "classifier must be fitted before predict",
        ));
    };
    if row.len() != expected {
        return Err(VeracityError::type_mismatch(format!(
            "feature vector has {} dimensions, model expects {expected}",
            row.len()
        )));
    }
    Ok(expected)
}

/// Majority class of a vote. Ties go to the positive class.
pub(crate) fn majority_vote(positive: usize, negative: usize) -> u8 {
    if positive >= negative { POSITIVE } else { NEGATIVE }
}

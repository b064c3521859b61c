//! Logistic regression trained with full-batch gradient descent.

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VeracityError};
use crate::ml::classifier::{Classifier, ModelType, check_dimensions, validate_training_set};
use crate::ml::labels::{NEGATIVE, POSITIVE};

/// Configuration for [`LogisticRegressionClassifier`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticRegressionConfig {
    /// Step size of each gradient update.
    pub learning_rate: f64,
    /// Upper bound on gradient descent iterations.
    pub max_iterations: usize,
    /// Training stops once the largest gradient component falls below this.
    pub tolerance: f64,
}

impl Default for LogisticRegressionConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.5,
            max_iterations: 1000,
            tolerance: 1e-6,
        }
    }
}

impl LogisticRegressionConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(VeracityError::invalid_config(format!(
                "logistic_regression.learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.max_iterations == 0 {
            return Err(VeracityError::invalid_config(
                "logistic_regression.max_iterations must be at least 1",
            ));
        }
        if self.tolerance < 0.0 {
            return Err(VeracityError::invalid_config(
                "logistic_regression.tolerance must not be negative",
            ));
        }
        Ok(())
    }
}

/// Learned weights of a fitted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub weights: Vec<f64>,
    pub bias: f64,
    /// Iterations run before convergence or the iteration cap.
    pub iterations: usize,
    /// Mean log loss on the training set after the last update.
    pub loss: f64,
}

impl LogisticModel {
    /// Probability of the positive class.
    pub fn probability(&self, features: &[f64]) -> f64 {
        sigmoid(dot(&self.weights, features) + self.bias)
    }
}

/// Numerically stable logistic function.
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn log_loss(probabilities: &[f64], labels: &[u8]) -> f64 {
    const EPS: f64 = 1e-12;
    let total: f64 = probabilities
        .iter()
        .zip(labels)
        .map(|(&p, &y)| {
            let p = p.clamp(EPS, 1.0 - EPS);
            if y == POSITIVE { -p.ln() } else { -(1.0 - p).ln() }
        })
        .sum();
    total / labels.len() as f64
}

/// Linear classifier with a 0.5 probability threshold.
#[derive(Debug, Clone)]
pub struct LogisticRegressionClassifier {
    config: LogisticRegressionConfig,
    model: Option<LogisticModel>,
}

impl LogisticRegressionClassifier {
    pub fn new(config: LogisticRegressionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            model: None,
        })
    }

    /// The fitted weights, if any.
    pub fn model(&self) -> Option<&LogisticModel> {
        self.model.as_ref()
    }

    /// Probability of the positive class for one feature vector.
    pub fn predict_probability(&self, features: &[f64]) -> Result<f64> {
        check_dimensions(self.n_features(), features)?;
        let model = self.model.as_ref().ok_or_else(|| {
            VeracityError::uninitialized("logistic regression must be fitted before predict")
        })?;
        Ok(model.probability(features))
    }

    fn train(&self, features: &[Vec<f64>], labels: &[u8], n_features: usize) -> LogisticModel {
        let n = features.len() as f64;
        let mut weights = vec![0.0; n_features];
        let mut bias = 0.0;
        let mut iterations = 0;
        let mut gradient = vec![0.0; n_features];

        while iterations < self.config.max_iterations {
            iterations += 1;
            gradient.iter_mut().for_each(|g| *g = 0.0);
            let mut bias_gradient = 0.0;

            for (row, &label) in features.iter().zip(labels) {
                let error = sigmoid(dot(&weights, row) + bias) - f64::from(label);
                for (g, x) in gradient.iter_mut().zip(row) {
                    *g += error * x;
                }
                bias_gradient += error;
            }

            let mut largest = (bias_gradient / n).abs();
            for (w, g) in weights.iter_mut().zip(&gradient) {
                let g = g / n;
                largest = largest.max(g.abs());
                *w -= self.config.learning_rate * g;
            }
            bias -= self.config.learning_rate * bias_gradient / n;

            if largest < self.config.tolerance {
                break;
            }
        }

        let probabilities: Vec<f64> = features
            .iter()
            .map(|row| sigmoid(dot(&weights, row) + bias))
            .collect();
        let loss = log_loss(&probabilities, labels);

        LogisticModel {
            weights,
            bias,
            iterations,
            loss,
        }
    }
}

#[async_trait]
impl Classifier for LogisticRegressionClassifier {
    async fn fit(&mut self, features: &[Vec<f64>], labels: &[u8]) -> Result<()> {
        let n_features = validate_training_set(features, labels)?;
        let model = self.train(features, labels, n_features);

        debug!(
            "logistic regression fitted in {} iterations, training log loss {:.4}",
            model.iterations, model.loss
        );

        self.model = Some(model);
        Ok(())
    }

    fn predict_one(&self, features: &[f64]) -> Result<u8> {
        let probability = self.predict_probability(features)?;
        Ok(if probability >= 0.5 { POSITIVE } else { NEGATIVE })
    }

    fn is_fitted(&self) -> bool {
        self.model.is_some()
    }

    fn n_features(&self) -> Option<usize> {
        self.model.as_ref().map(|model| model.weights.len())
    }

    fn model_type(&self) -> ModelType {
        ModelType::LogisticRegression
    }
}

//! k-nearest-neighbour classifier over Euclidean distance.

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VeracityError};
use crate::ml::classifier::{Classifier, ModelType, check_dimensions, validate_training_set};
use crate::ml::labels::{NEGATIVE, POSITIVE};

/// Configuration for [`KnnClassifier`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnnConfig {
    /// Number of neighbours consulted. Capped at the training set size.
    pub k: usize,
}

impl Default for KnnConfig {
    fn default() -> Self {
        Self { k: 8 }
    }
}

impl KnnConfig {
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(VeracityError::invalid_config("knn.k must be at least 1"));
        }
        Ok(())
    }
}

/// Lazy learner that memorizes the training set.
///
/// A vote tie is broken by the label of the single nearest neighbour.
#[derive(Debug, Clone)]
pub struct KnnClassifier {
    config: KnnConfig,
    samples: Vec<Vec<f64>>,
    labels: Vec<u8>,
    n_features: Option<usize>,
}

impl KnnClassifier {
    pub fn new(config: KnnConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            samples: Vec::new(),
            labels: Vec::new(),
            n_features: None,
        })
    }

    /// Number of neighbours actually consulted.
    pub fn effective_k(&self) -> usize {
        self.config.k.min(self.samples.len())
    }

    pub fn config(&self) -> &KnnConfig {
        &self.config
    }
}

fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

#[async_trait]
impl Classifier for KnnClassifier {
    async fn fit(&mut self, features: &[Vec<f64>], labels: &[u8]) -> Result<()> {
        let n_features = validate_training_set(features, labels)?;

        self.samples = features.to_vec();
        self.labels = labels.to_vec();
        self.n_features = Some(n_features);

        debug!(
            "knn memorized {} samples, k = {}",
            self.samples.len(),
            self.effective_k()
        );
        Ok(())
    }

    fn predict_one(&self, features: &[f64]) -> Result<u8> {
        check_dimensions(self.n_features, features)?;

        let mut neighbours: Vec<(f64, u8)> = self
            .samples
            .iter()
            .zip(&self.labels)
            .map(|(sample, &label)| (euclidean_distance(sample, features), label))
            .collect();
        // Stable sort keeps training order among equidistant samples.
        neighbours.sort_by(|a, b| a.0.total_cmp(&b.0));
        neighbours.truncate(self.effective_k());

        let positive = neighbours.iter().filter(|(_, label)| *label == POSITIVE).count();
        let negative = neighbours.len() - positive;

        let code = if positive > negative {
            POSITIVE
        } else if negative > positive {
            NEGATIVE
        } else {
            neighbours.first().map(|(_, label)| *label).unwrap_or(NEGATIVE)
        };
        Ok(code)
    }

    fn is_fitted(&self) -> bool {
        self.n_features.is_some()
    }

    fn n_features(&self) -> Option<usize> {
        self.n_features
    }

    fn model_type(&self) -> ModelType {
        ModelType::Knn
    }
}

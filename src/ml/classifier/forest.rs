//! Random forest: bagged decision trees with feature subsampling.
//!
//! Each tree draws its own bootstrap sample and a random subset of
//! `ceil(max_features * n_features)` columns from a generator seeded with
//! `seed + tree_index`, so a fixed seed gives the same forest regardless of
//! how rayon schedules the work.

use async_trait::async_trait;
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VeracityError};
use crate::ml::classifier::tree::{self, DecisionTreeConfig, TreeNode};
use crate::ml::classifier::{
    Classifier, ModelType, check_dimensions, majority_vote, validate_training_set,
};
use crate::ml::labels::POSITIVE;

/// Configuration for [`RandomForestClassifier`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomForestConfig {
    /// Number of trees.
    pub n_estimators: usize,
    /// Fraction of features offered to each tree, in `(0, 1]`.
    pub max_features: f64,
    pub max_depth: usize,
    pub min_samples_split: usize,
    /// Sample rows with replacement for each tree.
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for RandomForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 10,
            max_features: 0.5,
            max_depth: 10,
            min_samples_split: 3,
            bootstrap: true,
            seed: 3,
        }
    }
}

impl RandomForestConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(VeracityError::invalid_config(
                "random_forest.n_estimators must be at least 1",
            ));
        }
        if !(self.max_features > 0.0 && self.max_features <= 1.0) {
            return Err(VeracityError::invalid_config(format!(
                "random_forest.max_features must be within (0, 1], got {}",
                self.max_features
            )));
        }
        self.tree_config().validate()
    }

    fn tree_config(&self) -> DecisionTreeConfig {
        DecisionTreeConfig {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
        }
    }

    /// Number of columns each tree may split on.
    pub fn features_per_tree(&self, n_features: usize) -> usize {
        if n_features == 0 {
            return 0;
        }
        ((self.max_features * n_features as f64).ceil() as usize).clamp(1, n_features)
    }
}

/// Ensemble of decision trees combined by majority vote.
#[derive(Debug, Clone)]
pub struct RandomForestClassifier {
    config: RandomForestConfig,
    trees: Vec<TreeNode>,
    n_features: Option<usize>,
}

impl RandomForestClassifier {
    pub fn new(config: RandomForestConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            trees: Vec::new(),
            n_features: None,
        })
    }

    /// Fitted trees.
    pub fn trees(&self) -> &[TreeNode] {
        &self.trees
    }

    pub fn config(&self) -> &RandomForestConfig {
        &self.config
    }

    fn grow_tree(&self, features: &[Vec<f64>], labels: &[u8], n_features: usize, index: usize) -> TreeNode {
        let mut rng = StdRng::seed_from_u64(self.config.seed.wrapping_add(index as u64));
        let n_samples = features.len();

        let rows: Vec<usize> = if self.config.bootstrap {
            (0..n_samples)
                .map(|_| rng.random_range(0..n_samples))
                .collect()
        } else {
            (0..n_samples).collect()
        };

        let mut columns: Vec<usize> = (0..n_features).collect();
        columns.shuffle(&mut rng);
        columns.truncate(self.config.features_per_tree(n_features));
        columns.sort_unstable();

        tree::grow(features, labels, &rows, &columns, &self.config.tree_config())
    }
}

#[async_trait]
impl Classifier for RandomForestClassifier {
    async fn fit(&mut self, features: &[Vec<f64>], labels: &[u8]) -> Result<()> {
        let n_features = validate_training_set(features, labels)?;

        let this = &*self;
        let trees: Vec<TreeNode> = (0..this.config.n_estimators)
            .into_par_iter()
            .map(|index| this.grow_tree(features, labels, n_features, index))
            .collect();

        debug!(
            "random forest fitted: {} trees over {} samples, {} features per tree",
            trees.len(),
            features.len(),
            self.config.features_per_tree(n_features)
        );

        self.trees = trees;
        self.n_features = Some(n_features);
        Ok(())
    }

    fn predict_one(&self, features: &[f64]) -> Result<u8> {
        check_dimensions(self.n_features, features)?;
        if self.trees.is_empty() {
            return Err(VeracityError::uninitialized(
                "random forest must be fitted before predict",
            ));
        }

        let positive = self
            .trees
            .iter()
            .filter(|tree| tree.classify(features) == POSITIVE)
            .count();
        Ok(majority_vote(positive, self.trees.len() - positive))
    }

    fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    fn n_features(&self) -> Option<usize> {
        self.n_features
    }

    fn model_type(&self) -> ModelType {
        ModelType::RandomForest
    }
}

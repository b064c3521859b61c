//! CART decision tree with Gini impurity.
//!
//! Splits are axis-aligned: a sample goes left when `x[feature] <= threshold`.
//! Thresholds are midpoints between consecutive distinct values. Growth stops
//! at `max_depth`, below `min_samples_split` samples, on pure nodes, or when no
//! split lowers the impurity.

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VeracityError};
use crate::ml::classifier::{
    Classifier, ModelType, check_dimensions, majority_vote, validate_training_set,
};
use crate::ml::labels::POSITIVE;

/// Configuration for [`DecisionTreeClassifier`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionTreeConfig {
    /// Maximum depth of the tree. The root is depth 0.
    pub max_depth: usize,
    /// Nodes with fewer samples become leaves.
    pub min_samples_split: usize,
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            min_samples_split: 3,
        }
    }
}

impl DecisionTreeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_samples_split < 2 {
            return Err(VeracityError::invalid_config(
                "decision_tree.min_samples_split must be at least 2",
            ));
        }
        Ok(())
    }
}

/// A node of a fitted tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        class: u8,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    /// Walk the tree for one sample.
    pub fn classify(&self, features: &[f64]) -> u8 {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { class } => return *class,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if features[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    /// Depth of the deepest leaf.
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }
}

/// Best split found for a node.
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

fn gini(positive: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let p = positive as f64 / total as f64;
    1.0 - p * p - (1.0 - p) * (1.0 - p)
}

fn count_positive(labels: &[u8], rows: &[usize]) -> usize {
    rows.iter().filter(|&&row| labels[row] == POSITIVE).count()
}

/// Grow a tree over `rows`, considering only `features_subset` columns.
pub(crate) fn grow(
    features: &[Vec<f64>],
    labels: &[u8],
    rows: &[usize],
    feature_subset: &[usize],
    config: &DecisionTreeConfig,
) -> TreeNode {
    grow_node(features, labels, rows, feature_subset, config, 0)
}

fn grow_node(
    features: &[Vec<f64>],
    labels: &[u8],
    rows: &[usize],
    feature_subset: &[usize],
    config: &DecisionTreeConfig,
    depth: usize,
) -> TreeNode {
    let positive = count_positive(labels, rows);
    let negative = rows.len() - positive;
    let leaf = TreeNode::Leaf {
        class: majority_vote(positive, negative),
    };

    if depth >= config.max_depth
        || rows.len() < config.min_samples_split
        || positive == 0
        || negative == 0
    {
        return leaf;
    }

    let parent_impurity = gini(positive, rows.len());
    let Some(best) = best_split(features, labels, rows, feature_subset) else {
        return leaf;
    };
    if best.impurity >= parent_impurity {
        return leaf;
    }

    let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
        .iter()
        .partition(|&&row| features[row][best.feature] <= best.threshold);

    TreeNode::Split {
        feature: best.feature,
        threshold: best.threshold,
        left: Box::new(grow_node(
            features,
            labels,
            &left_rows,
            feature_subset,
            config,
            depth + 1,
        )),
        right: Box::new(grow_node(
            features,
            labels,
            &right_rows,
            feature_subset,
            config,
            depth + 1,
        )),
    }
}

/// Lowest weighted Gini impurity split over the candidate features.
fn best_split(
    features: &[Vec<f64>],
    labels: &[u8],
    rows: &[usize],
    feature_subset: &[usize],
) -> Option<SplitCandidate> {
    let total = rows.len();
    let total_positive = count_positive(labels, rows);
    let mut best: Option<SplitCandidate> = None;
    let mut column: Vec<(f64, u8)> = Vec::with_capacity(total);

    for &feature in feature_subset {
        column.clear();
        column.extend(rows.iter().map(|&row| (features[row][feature], labels[row])));
        column.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut left_positive = 0;
        for i in 0..total - 1 {
            if column[i].1 == POSITIVE {
                left_positive += 1;
            }
            let (value, next) = (column[i].0, column[i + 1].0);
            if value == next {
                continue;
            }

            let left_total = i + 1;
            let right_total = total - left_total;
            let impurity = (left_total as f64 * gini(left_positive, left_total)
                + right_total as f64 * gini(total_positive - left_positive, right_total))
                / total as f64;

            if best.as_ref().is_none_or(|b| impurity < b.impurity) {
                best = Some(SplitCandidate {
                    feature,
                    threshold: (value + next) / 2.0,
                    impurity,
                });
            }
        }
    }

    best
}

/// Single decision tree classifier.
#[derive(Debug, Clone)]
pub struct DecisionTreeClassifier {
    config: DecisionTreeConfig,
    root: Option<TreeNode>,
    n_features: Option<usize>,
}

impl DecisionTreeClassifier {
    pub fn new(config: DecisionTreeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            root: None,
            n_features: None,
        })
    }

    /// The fitted tree, if any.
    pub fn root(&self) -> Option<&TreeNode> {
        self.root.as_ref()
    }

    pub fn config(&self) -> &DecisionTreeConfig {
        &self.config
    }
}

#[async_trait]
impl Classifier for DecisionTreeClassifier {
    async fn fit(&mut self, features: &[Vec<f64>], labels: &[u8]) -> Result<()> {
        let n_features = validate_training_set(features, labels)?;

        let rows: Vec<usize> = (0..features.len()).collect();
        let all_features: Vec<usize> = (0..n_features).collect();
        let root = grow(features, labels, &rows, &all_features, &self.config);

        debug!(
            "decision tree fitted: depth {}, {} leaves",
            root.depth(),
            root.leaf_count()
        );

        self.root = Some(root);
        self.n_features = Some(n_features);
        Ok(())
    }

    fn predict_one(&self, features: &[f64]) -> Result<u8> {
        check_dimensions(self.n_features, features)?;
        let root = self.root.as_ref().ok_or_else(|| {
            VeracityError::uninitialized("decision tree must be fitted before predict")
        })?;
        Ok(root.classify(features))
    }

    fn is_fitted(&self) -> bool {
        self.root.is_some()
    }

    fn n_features(&self) -> Option<usize> {
        self.n_features
    }

    fn model_type(&self) -> ModelType {
        ModelType::DecisionTree
    }
}

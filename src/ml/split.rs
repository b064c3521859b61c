//! Shuffled train/validation/test partitioning.
//!
//! The splitter draws one random permutation of the input indices and applies
//! it to items and labels alike, so pairs stay aligned. Partition sizes are
//! `floor(train * n)`, `floor(validation * n)` and the remainder.

use log::debug;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VeracityError};

/// Fractions of the data assigned to training and validation. The test
/// partition receives whatever is left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitRatios {
    /// Fraction used for training.
    pub train: f64,
    /// Fraction used for validation.
    pub validation: f64,
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self {
            train: 0.7,
            validation: 0.1,
        }
    }
}

impl SplitRatios {
    /// Create validated split ratios.
    pub fn new(train: f64, validation: f64) -> Result<Self> {
        let ratios = Self { train, validation };
        ratios.validate()?;
        Ok(ratios)
    }

    /// Fraction left for the test partition.
    pub fn test(&self) -> f64 {
        (1.0 - self.train - self.validation).max(0.0)
    }

    /// Each ratio must lie in `[0, 1]` and their sum must not exceed 1.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("train", self.train), ("validation", self.validation)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(VeracityError::invalid_config(format!(
                    "{name} ratio must be within [0, 1], got {value}"
                )));
            }
        }
        if self.train + self.validation > 1.0 + f64::EPSILON {
            return Err(VeracityError::invalid_config(format!(
                "train + validation ratios must not exceed 1, got {}",
                self.train + self.validation
            )));
        }
        Ok(())
    }

    /// Partition sizes `(train, validation, test)` for `n` samples.
    pub fn sizes(&self, n: usize) -> (usize, usize, usize) {
        let train = floor_fraction(self.train, n).min(n);
        let validation = floor_fraction(self.validation, n).min(n - train);
        (train, validation, n - train - validation)
    }
}

/// `floor(ratio * n)`, tolerant of the representation error in products such
/// as `0.7 * 10`.
fn floor_fraction(ratio: f64, n: usize) -> usize {
    (ratio * n as f64 + 1e-9).floor() as usize
}

/// One partition of a split.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition<T, L> {
    /// Items in shuffled order.
    pub items: Vec<T>,
    /// Labels aligned with `items`.
    pub labels: Vec<L>,
    /// Positions of the items in the unshuffled input.
    pub indices: Vec<usize>,
}

impl<T, L> Partition<T, L> {
    fn empty() -> Self {
        Self {
            items: Vec::new(),
            labels: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Number of items in the partition.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the partition holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The three partitions produced by [`DatasetSplitter::split`].
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSplit<T, L> {
    pub train: Partition<T, L>,
    pub validation: Partition<T, L>,
    pub test: Partition<T, L>,
}

impl<T, L> DatasetSplit<T, L> {
    /// Total number of items across all partitions.
    pub fn len(&self) -> usize {
        self.train.len() + self.validation.len() + self.test.len()
    }

    /// Whether every partition is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shuffles parallel item/label sequences and partitions them.
///
/// # Examples
///
/// ```
/// use veracity::ml::split::{DatasetSplitter, SplitRatios};
///
/// # fn main() -> veracity::error::Result<()> {
/// let splitter = DatasetSplitter::new(SplitRatios::default()).with_seed(7);
/// let items: Vec<u32> = (0..10).collect();
/// let labels = vec![0u8, 1, 0, 1, 0, 1, 0, 1, 0, 1];
///
/// let split = splitter.split(items, labels)?;
/// assert_eq!((split.train.len(), split.validation.len(), split.test.len()), (7, 1, 2));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct DatasetSplitter {
    ratios: SplitRatios,
    seed: Option<u64>,
    max_samples: Option<usize>,
}

impl DatasetSplitter {
    /// Create a splitter using an unseeded random generator.
    pub fn new(ratios: SplitRatios) -> Self {
        Self {
            ratios,
            seed: None,
            max_samples: None,
        }
    }

    /// Use a seeded generator so splits are reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Keep at most `max_samples` items after shuffling.
    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = Some(max_samples);
        self
    }

    /// The configured ratios.
    pub fn ratios(&self) -> &SplitRatios {
        &self.ratios
    }

    /// Shuffle and partition `items` and `labels`.
    pub fn split<T, L>(&self, items: Vec<T>, labels: Vec<L>) -> Result<DatasetSplit<T, L>> {
        match self.seed {
            Some(seed) => self.split_with_rng(items, labels, &mut StdRng::seed_from_u64(seed)),
            None => self.split_with_rng(items, labels, &mut rand::rng()),
        }
    }

    /// Shuffle and partition using the supplied random generator.
    pub fn split_with_rng<T, L, R: Rng + ?Sized>(
        &self,
        items: Vec<T>,
        labels: Vec<L>,
        rng: &mut R,
    ) -> Result<DatasetSplit<T, L>> {
        if items.len() != labels.len() {
            return Err(VeracityError::shape_mismatch(items.len(), labels.len()));
        }
        self.ratios.validate()?;

        let mut permutation: Vec<usize> = (0..items.len()).collect();
        permutation.shuffle(rng);
        if let Some(max_samples) = self.max_samples {
            permutation.truncate(max_samples);
        }

        let n = permutation.len();
        let (train_size, validation_size, test_size) = self.ratios.sizes(n);

        let mut slots: Vec<Option<(T, L)>> = items.into_iter().zip(labels).map(Some).collect();
        let mut split = DatasetSplit {
            train: Partition::empty(),
            validation: Partition::empty(),
            test: Partition::empty(),
        };

        for (rank, &index) in permutation.iter().enumerate() {
            let Some((item, label)) = slots[index].take() else {
                continue;
            };
            let partition = if rank < train_size {
                &mut split.train
            } else if rank < train_size + validation_size {
                &mut split.validation
            } else {
                &mut split.test
            };
            partition.items.push(item);
            partition.labels.push(label);
            partition.indices.push(index);
        }

        debug!(
            "split {} samples into train={}, validation={}, test={}",
            n, train_size, validation_size, test_size
        );

        Ok(split)
    }
}

//! Configuration for a training pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VeracityError};
use crate::ml::classifier::ClassifierConfig;
use crate::ml::labels::LabelCodec;
use crate::ml::split::{DatasetSplitter, SplitRatios};
use crate::ml::vectorizer::VectorizerConfig;

/// Configuration for [`crate::ml::pipeline::Pipeline`].
///
/// Every section has defaults, so a JSON file only needs the keys it
/// overrides:
///
/// ```
/// use veracity::ml::config::PipelineConfig;
///
/// let config = PipelineConfig::from_json_str(r#"{"seed": 7, "classifier": {"knn": {"k": 1}}}"#).unwrap();
/// assert_eq!(config.seed, Some(7));
/// assert_eq!(config.classifier.knn.k, 1);
/// assert_eq!(config.split.train, 0.7);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Train/validation fractions; the test partition gets the rest.
    pub split: SplitRatios,

    /// Seed for the shuffle. If None, every split differs.
    pub seed: Option<u64>,

    /// Keep at most this many records after shuffling.
    pub max_samples: Option<usize>,

    /// Class strings for codes 1 and 0.
    pub labels: LabelCodec,

    /// Tokenizing and IDF options.
    pub vectorizer: VectorizerConfig,

    /// Per-model hyperparameters.
    pub classifier: ClassifierConfig,
}

impl PipelineConfig {
    /// Load a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: PipelineConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.split.validate()?;
        self.labels.validate()?;
        self.vectorizer.validate()?;
        self.classifier.validate()?;
        if self.max_samples == Some(0) {
            return Err(VeracityError::invalid_config(
                "max_samples must be at least 1 when set",
            ));
        }
        Ok(())
    }

    /// Set the shuffle seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the split ratios.
    pub fn with_split(mut self, split: SplitRatios) -> Self {
        self.split = split;
        self
    }

    /// Cap the number of records used per cycle.
    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = Some(max_samples);
        self
    }

    /// Build the splitter described by this configuration.
    pub fn splitter(&self) -> DatasetSplitter {
        let mut splitter = DatasetSplitter::new(self.split);
        if let Some(seed) = self.seed {
            splitter = splitter.with_seed(seed);
        }
        if let Some(max_samples) = self.max_samples {
            splitter = splitter.with_max_samples(max_samples);
        }
        splitter
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::ml::vectorizer::IdfWeighting;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.split, SplitRatios::default());
        assert_eq!(config.labels.positive, "real");
        assert_eq!(config.classifier.knn.k, 8);
        assert_eq!(config.classifier.random_forest.n_estimators, 10);
        assert_eq!(config.max_samples, None);
    }

    #[test]
    fn test_partial_json() {
        let config = PipelineConfig::from_json_str(
            r#"{
                "split": {"train": 0.8},
                "vectorizer": {"idf": "smoothed", "normalize_tweets": true},
                "labels": {"positive": "true", "negative": "false"}
            }"#,
        )
        .unwrap();

        assert_eq!(config.split.train, 0.8);
        assert_eq!(config.split.validation, 0.1);
        assert_eq!(config.vectorizer.idf, IdfWeighting::Smoothed);
        assert!(config.vectorizer.normalize_tweets);
        assert_eq!(config.labels.encode("TRUE"), Some(1));
    }

    #[test]
    fn test_invalid_json_values() {
        assert!(matches!(
            PipelineConfig::from_json_str(r#"{"split": {"train": 0.95, "validation": 0.1}}"#),
            Err(VeracityError::InvalidConfig(_))
        ));
        assert!(matches!(
            PipelineConfig::from_json_str(r#"{"max_samples": 0}"#),
            Err(VeracityError::InvalidConfig(_))
        ));
        assert!(matches!(
            PipelineConfig::from_json_str("[1, 2]"),
            Err(VeracityError::Json(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"seed": 11, "max_samples": 1000}}"#).unwrap();

        let config = PipelineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.seed, Some(11));
        assert_eq!(config.max_samples, Some(1000));
    }
}

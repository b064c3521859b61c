//! TF-IDF vectorizer for text feature extraction.
//!
//! `fit` learns a vocabulary (first-seen order) and one IDF weight per term;
//! `transform` turns any text into a vector whose length is the vocabulary
//! size and whose position `i` holds `tf(term_i) * idf(term_i)`.
//!
//! # Examples
//!
//! ```
//! use veracity::ml::vectorizer::TfIdfVectorizer;
//!
//! # fn main() -> veracity::error::Result<()> {
//! let mut vectorizer = TfIdfVectorizer::new()?;
//! vectorizer.fit(&["good news today", "scandal is fake"])?;
//!
//! let features = vectorizer.transform("good news")?;
//! assert_eq!(features.len(), vectorizer.vocabulary_size());
//! assert_eq!(vectorizer.vocabulary_index("news"), Some(1));
//! # Ok(())
//! # }
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::standard::StandardAnalyzer;
use crate::error::{Result, VeracityError};

/// How document frequency is turned into an IDF weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdfWeighting {
    /// `ln(N / (df + 1))`. Zero or negative for terms found in (nearly) every
    /// document; those weights are kept as computed.
    #[default]
    Unsmoothed,
    /// `ln((N + 1) / (df + 1)) + 1`, always positive.
    Smoothed,
}

impl IdfWeighting {
    /// Compute the IDF weight of a term seen in `document_frequency` of
    /// `n_documents` documents.
    pub fn weight(&self, n_documents: usize, document_frequency: usize) -> f64 {
        let n = n_documents as f64;
        let df = document_frequency as f64;
        match self {
            IdfWeighting::Unsmoothed => (n / (df + 1.0)).ln(),
            IdfWeighting::Smoothed => ((n + 1.0) / (df + 1.0)).ln() + 1.0,
        }
    }
}

/// Configuration for [`TfIdfVectorizer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    /// IDF formula.
    pub idf: IdfWeighting,
    /// Tokens shorter than this many characters are ignored.
    pub min_token_length: usize,
    /// Normalize URLs, mentions and hashtags before tokenizing.
    pub normalize_tweets: bool,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            idf: IdfWeighting::Unsmoothed,
            min_token_length: 1,
            normalize_tweets: false,
        }
    }
}

impl VectorizerConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.min_token_length == 0 {
            return Err(VeracityError::invalid_config(
                "min_token_length must be at least 1",
            ));
        }
        Ok(())
    }

    /// Build the analyzer described by this configuration.
    pub fn build_analyzer(&self) -> Result<Arc<dyn Analyzer>> {
        let analyzer = if self.normalize_tweets {
            StandardAnalyzer::for_tweets()?
        } else {
            StandardAnalyzer::new()?
        };
        Ok(Arc::new(analyzer.with_min_token_length(self.min_token_length)))
    }
}

/// TF-IDF vectorizer for text feature extraction.
pub struct TfIdfVectorizer {
    /// Vocabulary: term -> index mapping.
    vocabulary: HashMap<String, usize>,
    /// Terms in index order.
    terms: Vec<String>,
    /// Inverse document frequency for each term, by index.
    idf: Vec<f64>,
    /// Total number of documents seen during fitting.
    n_documents: usize,
    /// Whether `fit` has completed at least once.
    fitted: bool,
    config: VectorizerConfig,
    /// Analyzer for tokenization.
    analyzer: Arc<dyn Analyzer>,
}

impl std::fmt::Debug for TfIdfVectorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfIdfVectorizer")
            .field("vocabulary_size", &self.vocabulary.len())
            .field("n_documents", &self.n_documents)
            .field("fitted", &self.fitted)
            .field("config", &self.config)
            .field("analyzer", &self.analyzer.name())
            .finish()
    }
}

impl TfIdfVectorizer {
    /// Create a vectorizer with the default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(VectorizerConfig::default())
    }

    /// Create a vectorizer from a configuration.
    pub fn with_config(config: VectorizerConfig) -> Result<Self> {
        config.validate()?;
        let analyzer = config.build_analyzer()?;
        Ok(Self::with_analyzer(config, analyzer))
    }

    /// Create a vectorizer that tokenizes with a custom analyzer.
    pub fn with_analyzer(config: VectorizerConfig, analyzer: Arc<dyn Analyzer>) -> Self {
        Self {
            vocabulary: HashMap::new(),
            terms: Vec::new(),
            idf: Vec::new(),
            n_documents: 0,
            fitted: false,
            config,
            analyzer,
        }
    }

    /// Fit the vectorizer on training documents.
    ///
    /// Any previous vocabulary and IDF table are replaced. On error the
    /// previous state is left untouched.
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<()> {
        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut terms: Vec<String> = Vec::new();
        let mut document_frequency: Vec<usize> = Vec::new();

        for doc in documents {
            let tokens = self.analyzer.terms(doc.as_ref())?;
            let mut seen: HashSet<usize> = HashSet::new();

            for token in tokens {
                let idx = match vocabulary.get(&token) {
                    Some(&idx) => idx,
                    None => {
                        let idx = terms.len();
                        vocabulary.insert(token.clone(), idx);
                        terms.push(token);
                        document_frequency.push(0);
                        idx
                    }
                };
                if seen.insert(idx) {
                    document_frequency[idx] += 1;
                }
            }
        }

        let n_documents = documents.len();
        let idf: Vec<f64> = document_frequency
            .iter()
            .map(|&df| self.config.idf.weight(n_documents, df))
            .collect();

        self.vocabulary = vocabulary;
        self.terms = terms;
        self.idf = idf;
        self.n_documents = n_documents;
        self.fitted = true;

        debug!(
            "fitted tf-idf vectorizer on {} documents, vocabulary size {}",
            self.n_documents,
            self.terms.len()
        );

        Ok(())
    }

    /// Transform a document into a TF-IDF feature vector.
    ///
    /// The vector has one entry per vocabulary term. Terms the vectorizer
    /// has never seen are dropped.
    pub fn transform(&self, document: &str) -> Result<Vec<f64>> {
        if !self.fitted {
            return Err(VeracityError::uninitialized(
                "TF-IDF vectorizer must be fitted before transform",
            ));
        }

        let tokens = self.analyzer.terms(document)?;
        let mut features = vec![0.0; self.terms.len()];

        // Count term frequencies
        for token in &tokens {
            if let Some(&idx) = self.vocabulary.get(token) {
                features[idx] += 1.0;
            }
        }

        // Normalize by document length, unknown tokens included
        let doc_length = tokens.len() as f64;
        if doc_length > 0.0 {
            for (idx, value) in features.iter_mut().enumerate() {
                *value = *value / doc_length * self.idf[idx];
            }
        }

        Ok(features)
    }

    /// Transform several documents.
    pub fn transform_batch<S: AsRef<str>>(&self, documents: &[S]) -> Result<Vec<Vec<f64>>> {
        documents
            .iter()
            .map(|doc| self.transform(doc.as_ref()))
            .collect()
    }

    /// Fit on the documents and return their vectors.
    pub fn fit_transform<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<Vec<Vec<f64>>> {
        self.fit(documents)?;
        self.transform_batch(documents)
    }

    /// Get the size of the vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.terms.len()
    }

    /// Index of a term in the vocabulary.
    pub fn vocabulary_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Vocabulary terms in index order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// IDF weight of a term, if it was seen during fitting.
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary_index(term).map(|idx| self.idf[idx])
    }

    /// Number of documents in the fitted corpus.
    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    /// Whether `fit` has been called.
    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    /// The vectorizer configuration.
    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tokenize;

    fn corpus() -> Vec<&'static str> {
        vec![
            "good news today",
            "fake scandal exposed",
            "great news update",
            "scandal is fake",
        ]
    }

    fn fitted() -> TfIdfVectorizer {
        let mut vectorizer = TfIdfVectorizer::new().unwrap();
        vectorizer.fit(&corpus()).unwrap();
        vectorizer
    }

    #[test]
    fn test_transform_before_fit() {
        let vectorizer = TfIdfVectorizer::new().unwrap();
        let result = vectorizer.transform("good news");
        assert!(matches!(result, Err(VeracityError::Uninitialized(_))));
    }

    #[test]
    fn test_vocabulary_is_first_seen_order() {
        let vectorizer = fitted();
        assert_eq!(
            vectorizer.terms(),
            &[
                "good", "news", "today", "fake", "scandal", "exposed", "great", "update", "is"
            ]
        );
        for (idx, term) in vectorizer.terms().iter().enumerate() {
            assert_eq!(vectorizer.vocabulary_index(term), Some(idx));
        }
    }

    #[test]
    fn test_vocabulary_size_counts_distinct_tokens() {
        let vectorizer = fitted();
        let distinct: HashSet<String> = corpus().iter().flat_map(|d| tokenize(d)).collect();
        assert_eq!(vectorizer.vocabulary_size(), distinct.len());
        assert_eq!(vectorizer.n_documents(), 4);
    }

    #[test]
    fn test_idf_values() {
        let vectorizer = fitted();
        // "good" appears in 1 of 4 documents
        assert!((vectorizer.idf("good").unwrap() - (4.0f64 / 2.0).ln()).abs() < 1e-12);
        // "news" appears in 2 of 4 documents
        assert!((vectorizer.idf("news").unwrap() - (4.0f64 / 3.0).ln()).abs() < 1e-12);
        assert_eq!(vectorizer.idf("unseen"), None);
    }

    #[test]
    fn test_document_frequency_counts_documents_not_occurrences() {
        let mut vectorizer = TfIdfVectorizer::new().unwrap();
        vectorizer.fit(&["fake fake fake", "real news"]).unwrap();
        // df(fake) = 1, N = 2 -> ln(2 / 2) = 0
        assert_eq!(vectorizer.idf("fake"), Some(0.0));
    }

    #[test]
    fn test_term_in_every_document_gets_negative_idf() {
        let mut vectorizer = TfIdfVectorizer::new().unwrap();
        vectorizer.fit(&["news a", "news b", "news c"]).unwrap();
        assert!(vectorizer.idf("news").unwrap() < 0.0);
    }

    #[test]
    fn test_transform_values() {
        let vectorizer = fitted();
        let features = vectorizer.transform("good news today").unwrap();

        let expected_good = (1.0 / 3.0) * (2.0f64).ln();
        let expected_news = (1.0 / 3.0) * (4.0f64 / 3.0).ln();
        assert!((features[0] - expected_good).abs() < 1e-12);
        assert!((features[1] - expected_news).abs() < 1e-12);
        assert_eq!(features[3], 0.0);
    }

    #[test]
    fn test_nonzero_positions_match_document_tokens() {
        let vectorizer = fitted();
        for doc in corpus() {
            let features = vectorizer.transform(doc).unwrap();
            let expected: HashSet<usize> = tokenize(doc)
                .iter()
                .filter_map(|t| vectorizer.vocabulary_index(t))
                .collect();
            let nonzero: HashSet<usize> = features
                .iter()
                .enumerate()
                .filter(|(_, v)| **v != 0.0)
                .map(|(i, _)| i)
                .collect();
            assert_eq!(nonzero, expected, "document: {doc}");
        }
    }

    #[test]
    fn test_unknown_tokens_are_dropped_but_count_toward_length() {
        let vectorizer = fitted();
        let features = vectorizer.transform("good zebra").unwrap();
        assert_eq!(features.len(), vectorizer.vocabulary_size());
        assert!((features[0] - 0.5 * (2.0f64).ln()).abs() < 1e-12);

        let empty = vectorizer.transform("").unwrap();
        assert!(empty.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_transform_is_order_independent() {
        let vectorizer = fitted();
        let first = vectorizer.transform("scandal news").unwrap();
        vectorizer.transform("great update").unwrap();
        vectorizer.transform("totally unrelated words").unwrap();
        let second = vectorizer.transform("scandal news").unwrap();
        assert_eq!(first, second);
        assert!((vectorizer.idf("scandal").unwrap() - (4.0f64 / 3.0).ln()).abs() < 1e-12);
    }

    #[test]
    fn test_refit_replaces_vocabulary() {
        let mut vectorizer = fitted();
        vectorizer.fit(&["brand new corpus"]).unwrap();
        assert_eq!(vectorizer.vocabulary_size(), 3);
        assert_eq!(vectorizer.vocabulary_index("news"), None);
        assert_eq!(vectorizer.n_documents(), 1);
    }

    #[test]
    fn test_smoothed_idf() {
        let config = VectorizerConfig {
            idf: IdfWeighting::Smoothed,
            ..Default::default()
        };
        let mut vectorizer = TfIdfVectorizer::with_config(config).unwrap();
        vectorizer.fit(&["news a", "news b", "news c"]).unwrap();
        // ln(4 / 4) + 1
        assert!((vectorizer.idf("news").unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_min_token_length() {
        let config = VectorizerConfig {
            min_token_length: 2,
            ..Default::default()
        };
        let mut vectorizer = TfIdfVectorizer::with_config(config).unwrap();
        vectorizer.fit(&["a big story", "i saw it"]).unwrap();
        assert_eq!(vectorizer.terms(), &["big", "story", "saw", "it"]);
    }

    #[test]
    fn test_fit_transform() {
        let mut vectorizer = TfIdfVectorizer::new().unwrap();
        let vectors = vectorizer.fit_transform(&corpus()).unwrap();
        assert_eq!(vectors.len(), 4);
        assert!(vectors.iter().all(|v| v.len() == 9));
    }

    #[test]
    fn test_invalid_config() {
        let config = VectorizerConfig {
            min_token_length: 0,
            ..Default::default()
        };
        assert!(matches!(
            TfIdfVectorizer::with_config(config),
            Err(VeracityError::InvalidConfig(_))
        ));
    }
}

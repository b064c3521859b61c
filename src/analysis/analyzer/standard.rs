//! Standard analyzer used by the TF-IDF vectorizer.
//!
//! # Pipeline
//!
//! 1. Char filters, in the order they were added (none by default)
//! 2. Lowercasing
//! 3. RegexTokenizer (`\b\w+\b`)
//! 4. Minimum token length (characters, default 1)
//!
//! [`crate::analysis::tokenize`] runs this analyzer with the defaults.
//!
//! # Examples
//!
//! ```
//! use veracity::analysis::analyzer::Analyzer;
//! use veracity::analysis::analyzer::standard::StandardAnalyzer;
//!
//! let analyzer = StandardAnalyzer::for_tweets().unwrap();
//! let terms = analyzer.terms("Check https://t.co/abc #FakeNews").unwrap();
//! assert_eq!(terms, vec!["check", "url", "fakenews"]);
//! ```

use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::char_filter::CharFilter;
use crate::analysis::char_filter::tweet::TweetNormalizer;
use crate::analysis::token::{Token, TokenStream};
use crate::analysis::tokenizer::{RegexTokenizer, Tokenizer};
use crate::error::Result;

/// Analyzer combining char filters, lowercasing and a tokenizer.
pub struct StandardAnalyzer {
    char_filters: Vec<Arc<dyn CharFilter>>,
    tokenizer: Arc<dyn Tokenizer>,
    min_token_length: usize,
}

impl StandardAnalyzer {
    /// Create a new standard analyzer with default settings.
    pub fn new() -> Result<Self> {
        Ok(Self::with_tokenizer(Arc::new(RegexTokenizer::new()?)))
    }

    /// Create an analyzer that normalizes tweets before tokenizing.
    pub fn for_tweets() -> Result<Self> {
        Ok(Self::new()?.add_char_filter(Arc::new(TweetNormalizer::new())))
    }

    /// Create an analyzer around a custom tokenizer.
    pub fn with_tokenizer(tokenizer: Arc<dyn Tokenizer>) -> Self {
        StandardAnalyzer {
            char_filters: Vec::new(),
            tokenizer,
            min_token_length: 1,
        }
    }

    /// Append a char filter to the chain.
    pub fn add_char_filter(mut self, filter: Arc<dyn CharFilter>) -> Self {
        self.char_filters.push(filter);
        self
    }

    /// Drop tokens shorter than `min_token_length` characters.
    pub fn with_min_token_length(mut self, min_token_length: usize) -> Self {
        self.min_token_length = min_token_length.max(1);
        self
    }

    /// Minimum token length in characters.
    pub fn min_token_length(&self) -> usize {
        self.min_token_length
    }
}

impl Analyzer for StandardAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        let mut filtered = text.to_string();
        for filter in &self.char_filters {
            filtered = filter.filter(&filtered);
        }
        let lowered = filtered.to_lowercase();

        let min_len = self.min_token_length;
        let tokens: Vec<Token> = self
            .tokenizer
            .tokenize(&lowered)?
            .filter(|token| token.char_len() >= min_len)
            .enumerate()
            .map(|(position, mut token)| {
                token.position = position;
                token
            })
            .collect();

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        if self.char_filters.is_empty() {
            "standard"
        } else {
            "standard_filtered"
        }
    }
}

impl Default for StandardAnalyzer {
    fn default() -> Self {
        Self::new().expect("Standard analyzer should be creatable with default settings")
    }
}

impl std::fmt::Debug for StandardAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let filters: Vec<&str> = self.char_filters.iter().map(|f| f.name()).collect();
        f.debug_struct("StandardAnalyzer")
            .field("char_filters", &filters)
            .field("tokenizer", &self.tokenizer.name())
            .field("min_token_length", &self.min_token_length)
            .finish()
    }
}

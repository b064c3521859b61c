//! Text analysis for Veracity.
//!
//! Raw documents are turned into normalized word tokens here before they reach
//! the TF-IDF vectorizer. The pieces mirror a classic analysis chain:
//!
//! ```text
//! Raw Text → CharFilter(s) → lowercase → Tokenizer → Token Stream
//! ```
//!
//! Most callers only need [`tokenize`], which lowercases its input and
//! extracts maximal runs of word characters. The [`Analyzer`] trait exists so
//! the vectorizer can be driven by a configurable chain (for example one that
//! normalizes tweets first).
//!
//! # Examples
//!
//! ```
//! use veracity::analysis::tokenize;
//!
//! assert_eq!(tokenize("Breaking: FAKE news!"), vec!["breaking", "fake", "news"]);
//! assert!(tokenize("").is_empty());
//! ```

pub mod analyzer;
pub mod char_filter;
pub mod token;
pub mod tokenizer;

pub use analyzer::Analyzer;
pub use analyzer::standard::StandardAnalyzer;
pub use char_filter::CharFilter;
pub use char_filter::tweet::TweetNormalizer;
pub use token::{Token, TokenStream};
pub use tokenizer::{RegexTokenizer, Tokenizer};

use lazy_static::lazy_static;

/// Pattern matching maximal runs of word characters.
pub const WORD_PATTERN: &str = r"\b\w+\b";

lazy_static! {
    static ref DEFAULT_ANALYZER: StandardAnalyzer =
        StandardAnalyzer::new().expect("Default analyzer should build");
}

/// Split text into lowercased word tokens.
///
/// Runs the default [`StandardAnalyzer`], the same chain the vectorizer uses
/// unless configured otherwise. Letters, digits and underscores form tokens;
/// everything else separates them. Empty input yields an empty vector.
pub fn tokenize(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    // the regex tokenizer cannot fail once built
    DEFAULT_ANALYZER.terms(text).unwrap_or_default()
}

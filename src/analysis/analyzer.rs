//! Core analyzer trait definition.
//!
//! Analyzers are the complete text processing chain used by the vectorizer:
//!
//! ```text
//! Raw Text → Analyzer → Token Stream → TF-IDF
//!             ↓
//!         CharFilter(s)
//!             ↓
//!         lowercase
//!             ↓
//!         Tokenizer
//! ```
//!
//! # Examples
//!
//! ```
//! use veracity::analysis::analyzer::Analyzer;
//! use veracity::analysis::analyzer::standard::StandardAnalyzer;
//!
//! let analyzer = StandardAnalyzer::new().unwrap();
//! let tokens: Vec<_> = analyzer.analyze("Hello World").unwrap().collect();
//!
//! assert_eq!(tokens[0].text, "hello");
//! assert_eq!(tokens[1].text, "world");
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for analyzers that convert text into processed tokens.
///
/// The trait requires `Send + Sync` so a vectorizer holding an analyzer can
/// live inside a session shared across tasks.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer (for debugging and configuration).
    fn name(&self) -> &'static str;

    /// Analyze the text and collect the token texts.
    fn terms(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.analyze(text)?.map(|token| token.text).collect())
    }
}

pub mod standard;

//! Char filters that rewrite text before it is tokenized.
//!
//! # Available Filters
//!
//! - [`tweet::TweetNormalizer`] - URL, mention and hashtag normalization for short social posts

/// Trait for character filters that transform text before tokenization.
pub trait CharFilter: Send + Sync {
    /// Apply this filter to the input text and return the rewritten text.
    fn filter(&self, input: &str) -> String;

    /// Get the name of this char filter.
    fn name(&self) -> &'static str;
}

pub mod tweet;

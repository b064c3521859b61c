//! Normalization for tweets and other short social-media posts.
//!
//! # Examples
//!
//! ```
//! use veracity::analysis::char_filter::CharFilter;
//! use veracity::analysis::char_filter::tweet::TweetNormalizer;
//!
//! let filter = TweetNormalizer::new();
//! assert_eq!(
//!     filter.filter("BREAKING via @Reuters: https://t.co/x1 #Election"),
//!     "breaking via reuters url election"
//! );
//! ```

use lazy_static::lazy_static;
use regex::Regex;

use crate::analysis::char_filter::CharFilter;

lazy_static! {
    static ref URL_REGEX: Regex = Regex::new(r"https?://\S+").expect("URL pattern should be valid");
    static ref MENTION_REGEX: Regex = Regex::new(r"@(\w+)").expect("Mention pattern should be valid");
    static ref HASHTAG_REGEX: Regex = Regex::new(r"#(\w+)").expect("Hashtag pattern should be valid");
    static ref PUNCTUATION_REGEX: Regex =
        Regex::new(r"[^\w\s]").expect("Punctuation pattern should be valid");
    static ref WHITESPACE_REGEX: Regex = Regex::new(r"\s+").expect("Whitespace pattern should be valid");
}

/// Placeholder token substituted for every link.
pub const URL_PLACEHOLDER: &str = "url";

/// Char filter that flattens tweet-specific syntax into plain words.
///
/// Applied in order:
///
/// 1. lowercase
/// 2. `http://…`/`https://…` links become [`URL_PLACEHOLDER`]
/// 3. `@name` becomes `name`, `#topic` becomes `topic`
/// 4. remaining punctuation becomes a space
/// 5. whitespace runs collapse to one space, ends trimmed
#[derive(Clone, Debug, Default)]
pub struct TweetNormalizer;

impl TweetNormalizer {
    /// Create a new tweet normalizer.
    pub fn new() -> Self {
        TweetNormalizer
    }
}

impl CharFilter for TweetNormalizer {
    fn filter(&self, input: &str) -> String {
        if input.is_empty() {
            return String::new();
        }

        let text = input.to_lowercase();
        let text = URL_REGEX.replace_all(&text, URL_PLACEHOLDER);
        let text = MENTION_REGEX.replace_all(&text, "$1");
        let text = HASHTAG_REGEX.replace_all(&text, "$1");
        let text = PUNCTUATION_REGEX.replace_all(&text, " ");
        let text = WHITESPACE_REGEX.replace_all(&text, " ");

        text.trim().to_string()
    }

    fn name(&self) -> &'static str {
        "tweet"
    }
}

//! Error types for the Veracity library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`VeracityError`] enum. Variants follow the pipeline's failure taxonomy:
//! per-record parse failures are recovered by the caller, everything else
//! aborts the current operation.
//!
//! # Examples
//!
//! ```
//! use veracity::error::{Result, VeracityError};
//!
//! fn example_operation() -> Result<()> {
//!     Err(VeracityError::uninitialized("vectorizer has not been fitted"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Veracity operations.
#[derive(Error, Debug)]
pub enum VeracityError {
    /// A single input record could not be used (unknown label, blank text).
    #[error("Parse failure: {0}")]
    ParseFailure(String),

    /// Filtering left nothing to train on.
    #[error("No valid data: {0}")]
    NoValidData(String),

    /// A component was used before it was fitted.
    #[error("Uninitialized: {0}")]
    Uninitialized(String),

    /// Two parallel sequences have different lengths.
    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// A classifier was asked to fit on an empty training set.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Malformed predict input (ragged rows, wrong dimensionality, bad code).
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// A pipeline operation was called out of order.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Configuration values are out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A session or other keyed resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Analysis-related errors (tokenizer construction and the like)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with VeracityError.
pub type Result<T> = std::result::Result<T, VeracityError>;

impl VeracityError {
    /// Create a new parse failure.
    pub fn parse_failure<S: Into<String>>(msg: S) -> Self {
        VeracityError::ParseFailure(msg.into())
    }

    /// Create a new no-valid-data error.
    pub fn no_valid_data<S: Into<String>>(msg: S) -> Self {
        VeracityError::NoValidData(msg.into())
    }

    /// Create a new uninitialized error.
    pub fn uninitialized<S: Into<String>>(msg: S) -> Self {
        VeracityError::Uninitialized(msg.into())
    }

    /// Create a new shape mismatch error.
    pub fn shape_mismatch(expected: usize, actual: usize) -> Self {
        VeracityError::ShapeMismatch { expected, actual }
    }

    /// Create a new insufficient data error.
    pub fn insufficient_data<S: Into<String>>(msg: S) -> Self {
        VeracityError::InsufficientData(msg.into())
    }

    /// Create a new type mismatch error.
    pub fn type_mismatch<S: Into<String>>(msg: S) -> Self {
        VeracityError::TypeMismatch(msg.into())
    }

    /// Create a new invalid state error.
    pub fn invalid_state<S: Into<String>>(msg: S) -> Self {
        VeracityError::InvalidState(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        VeracityError::InvalidConfig(msg.into())
    }

    /// Create a new not-found error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        VeracityError::NotFound(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        VeracityError::Analysis(msg.into())
    }

    /// Whether the error is scoped to a single record and may be skipped.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, VeracityError::ParseFailure(_))
    }
}

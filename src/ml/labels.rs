//! Translation between semantic class labels and numeric class codes.
//!
//! The mapping is fixed, never inferred from data order: code [`POSITIVE`]
//! (`1`) is the first class string ("real" by default) and code [`NEGATIVE`]
//! (`0`) is the second ("fake" by default).

use serde::{Deserialize, Serialize};

use crate::error::{Result, VeracityError};

/// Numeric code of the positive class.
pub const POSITIVE: u8 = 1;

/// Numeric code of the negative class.
pub const NEGATIVE: u8 = 0;

/// Check that a numeric class code is binary.
pub fn check_code(code: u8) -> Result<u8> {
    match code {
        NEGATIVE | POSITIVE => Ok(code),
        other => Err(VeracityError::type_mismatch(format!(
            "class code must be 0 or 1, got {other}"
        ))),
    }
}

/// Bidirectional mapping between the two class strings and their codes.
///
/// # Examples
///
/// ```
/// use veracity::ml::labels::LabelCodec;
///
/// let codec = LabelCodec::default();
/// assert_eq!(codec.encode(" REAL "), Some(1));
/// assert_eq!(codec.encode("fake"), Some(0));
/// assert_eq!(codec.encode("satire"), None);
/// assert_eq!(codec.decode(1).unwrap(), "real");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelCodec {
    /// Label mapped to code 1.
    pub positive: String,
    /// Label mapped to code 0.
    pub negative: String,
}

impl Default for LabelCodec {
    fn default() -> Self {
        Self {
            positive: "real".to_string(),
            negative: "fake".to_string(),
        }
    }
}

impl LabelCodec {
    /// Create a codec for a custom pair of class strings.
    pub fn new<P: Into<String>, N: Into<String>>(positive: P, negative: N) -> Result<Self> {
        let codec = Self {
            positive: positive.into(),
            negative: negative.into(),
        };
        codec.validate()?;
        Ok(codec)
    }

    /// Both labels must be non-blank and distinct ignoring case.
    pub fn validate(&self) -> Result<()> {
        let positive = normalize(&self.positive);
        let negative = normalize(&self.negative);

        if positive.is_empty() || negative.is_empty() {
            return Err(VeracityError::invalid_config("class labels must not be blank"));
        }
        if positive == negative {
            return Err(VeracityError::invalid_config(format!(
                "class labels must differ, both are '{positive}'"
            )));
        }
        Ok(())
    }

    /// Map a label to its code, case-insensitively. Unknown labels yield `None`.
    pub fn encode(&self, label: &str) -> Option<u8> {
        let label = normalize(label);
        if label == normalize(&self.positive) {
            Some(POSITIVE)
        } else if label == normalize(&self.negative) {
            Some(NEGATIVE)
        } else {
            None
        }
    }

    /// Map a code back to its label.
    pub fn decode(&self, code: u8) -> Result<&str> {
        match check_code(code)? {
            POSITIVE => Ok(self.positive.as_str()),
            _ => Ok(self.negative.as_str()),
        }
    }
}

fn normalize(label: &str) -> String {
    label.trim().to_lowercase()
}

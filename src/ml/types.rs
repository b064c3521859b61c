//! Input record types shared by the pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A labelled document as supplied by the caller.
///
/// Upload layers that speak in terms of tweets can use `tweet` as the text
/// field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledText {
    /// Document text.
    #[serde(alias = "tweet")]
    pub text: String,
    /// Class label, for example "real" or "fake".
    pub label: String,
}

impl LabeledText {
    /// Create a new labelled document.
    pub fn new<T: Into<String>, L: Into<String>>(text: T, label: L) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }
}

/// Load labelled documents from a JSON array file.
pub fn load_labeled_texts<P: AsRef<Path>>(path: P) -> Result<Vec<LabeledText>> {
    let content = std::fs::read_to_string(path)?;
    let records: Vec<LabeledText> = serde_json::from_str(&content)?;
    Ok(records)
}

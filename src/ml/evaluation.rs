//! Confusion-matrix metrics for binary predictions.
//!
//! Every metric is a fraction in `[0, 1]`. A zero denominator yields `0`
//! instead of NaN, so empty test partitions report an accuracy of zero.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VeracityError};
use crate::ml::labels::{self, POSITIVE};

/// Confusion counts with `1` as the positive class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionCounts {
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl ConfusionCounts {
    /// Count outcomes pairwise. Inputs must already be validated.
    fn tally(actual: &[u8], predicted: &[u8]) -> Self {
        let mut counts = ConfusionCounts::default();
        for (&a, &p) in actual.iter().zip(predicted) {
            match (a == POSITIVE, p == POSITIVE) {
                (true, true) => counts.true_positives += 1,
                (false, false) => counts.true_negatives += 1,
                (false, true) => counts.false_positives += 1,
                (true, false) => counts.false_negatives += 1,
            }
        }
        counts
    }

    /// Total number of scored pairs.
    pub fn total(&self) -> usize {
        self.true_positives + self.true_negatives + self.false_positives + self.false_negatives
    }

    /// The same counts seen from the negative class.
    pub fn swapped(&self) -> Self {
        Self {
            true_positives: self.true_negatives,
            true_negatives: self.true_positives,
            false_positives: self.false_negatives,
            false_negatives: self.false_positives,
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    let denominator = precision + recall;
    if denominator == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / denominator
    }
}

/// Precision, recall and F1 of one class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    /// Number of actual instances of the class.
    pub support: usize,
}

impl ClassMetrics {
    fn from_counts(counts: &ConfusionCounts) -> Self {
        let precision = ratio(counts.true_positives, counts.true_positives + counts.false_positives);
        let recall = ratio(counts.true_positives, counts.true_positives + counts.false_negatives);
        Self {
            precision,
            recall,
            f1_score: f1(precision, recall),
            support: counts.true_positives + counts.false_negatives,
        }
    }
}

/// Per-class breakdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassReport {
    /// Metrics for code `1`.
    pub positive: ClassMetrics,
    /// Metrics for code `0`.
    pub negative: ClassMetrics,
}

impl ClassReport {
    /// Unweighted mean of the two classes. `support` is the total count.
    pub fn macro_average(&self) -> ClassMetrics {
        let (p, n) = (&self.positive, &self.negative);
        ClassMetrics {
            precision: (p.precision + n.precision) / 2.0,
            recall: (p.recall + n.recall) / 2.0,
            f1_score: (p.f1_score + n.f1_score) / 2.0,
            support: p.support + n.support,
        }
    }
}

/// Result of [`evaluate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub confusion: ConfusionCounts,
    pub class_report: ClassReport,
    /// Macro average over both classes.
    pub macro_average: ClassMetrics,
}

impl Metrics {
    /// Number of scored predictions.
    pub fn total(&self) -> usize {
        self.confusion.total()
    }

    /// One-line percentage summary for display.
    pub fn summary(&self) -> String {
        format!(
            "accuracy {:.2}%, precision {:.2}%, recall {:.2}%, f1 {:.2}%, macro f1 {:.2}%",
            self.accuracy * 100.0,
            self.precision * 100.0,
            self.recall * 100.0,
            self.f1_score * 100.0,
            self.macro_average.f1_score * 100.0
        )
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary())?;
        let c = &self.confusion;
        writeln!(
            f,
            "confusion: tp={} tn={} fp={} fn={}",
            c.true_positives, c.true_negatives, c.false_positives, c.false_negatives
        )?;
        for (name, class) in [
            ("positive", &self.class_report.positive),
            ("negative", &self.class_report.negative),
            ("macro", &self.macro_average),
        ] {
            writeln!(
                f,
                "{name:>8}: precision {:.2}%, recall {:.2}%, f1 {:.2}%, support {}",
                class.precision * 100.0,
                class.recall * 100.0,
                class.f1_score * 100.0,
                class.support
            )?;
        }
        Ok(())
    }
}

/// Score predicted class codes against actual ones.
///
/// # Examples
///
/// ```
/// use veracity::ml::evaluation::evaluate;
///
/// let metrics = evaluate(&[1, 1, 0, 0], &[1, 0, 0, 1]).unwrap();
/// assert_eq!(metrics.accuracy, 0.5);
/// assert_eq!(metrics.f1_score, 0.5);
/// ```
pub fn evaluate(actual: &[u8], predicted: &[u8]) -> Result<Metrics> {
    if actual.len() != predicted.len() {
        return Err(VeracityError::shape_mismatch(actual.len(), predicted.len()));
    }
    for &code in actual.iter().chain(predicted) {
        labels::check_code(code)?;
    }

    let confusion = ConfusionCounts::tally(actual, predicted);
    let positive = ClassMetrics::from_counts(&confusion);
    let negative = ClassMetrics::from_counts(&confusion.swapped());
    let class_report = ClassReport { positive, negative };

    Ok(Metrics {
        accuracy: ratio(
            confusion.true_positives + confusion.true_negatives,
            confusion.total(),
        ),
        precision: positive.precision,
        recall: positive.recall,
        f1_score: positive.f1_score,
        confusion,
        class_report,
        macro_average: class_report.macro_average(),
    })
}

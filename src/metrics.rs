//! Binary classification tallies, accuracy and F1.

use crate::records::BinaryLabel;
use serde::Serialize;

/// Accumulates (predicted, truth) pairs for one ground truth.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinaryTally {
    correct: usize,
    incorrect: usize,
    true_positives: usize,
    false_positives: usize,
    false_negatives: usize,
}

impl BinaryTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one prediction against its ground truth.
    pub fn record(&mut self, predicted: BinaryLabel, truth: BinaryLabel) {
        if predicted == truth {
            self.correct += 1;
        } else {
            self.incorrect += 1;
        }
        match (predicted, truth) {
            (BinaryLabel::Yes, BinaryLabel::Yes) => self.true_positives += 1,
            (BinaryLabel::Yes, BinaryLabel::No) => self.false_positives += 1,
            (BinaryLabel::No, BinaryLabel::Yes) => self.false_negatives += 1,
            (BinaryLabel::No, BinaryLabel::No) => {}
        }
    }

    pub fn total(&self) -> usize {
        self.correct + self.incorrect
    }

    /// Fraction of exact matches; NaN when nothing was recorded.
    pub fn accuracy(&self) -> f64 {
        if self.total() == 0 {
            return f64::NAN;
        }
        self.correct as f64 / self.total() as f64
    }

    /// F1 with `Yes` as the positive class.
    ///
    /// NaN when nothing was recorded. Otherwise zero division yields 0: a
    /// tally with no positive predictions and no positive truths scores 0.
    pub fn f1(&self) -> f64 {
        if self.total() == 0 {
            return f64::NAN;
        }
        let denominator = 2 * self.true_positives + self.false_positives + self.false_negatives;
        if denominator == 0 {
            return 0.0;
        }
        (2 * self.true_positives) as f64 / denominator as f64
    }

    /// Freeze into reportable numbers.
    pub fn summary(&self) -> ScoreSummary {
        ScoreSummary {
            accuracy: self.accuracy(),
            f1: self.f1(),
            correct_count: self.correct,
            incorrect_count: self.incorrect,
            total: self.total(),
        }
    }
}

/// Accuracy, F1 and counts against one ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub accuracy: f64,
    pub f1: f64,
    pub correct_count: usize,
    pub incorrect_count: usize,
    pub total: usize,
}

//! Combination of repeated runs of one experiment.

use crate::evaluate::RunMetrics;
use crate::metrics::ScoreSummary;
use serde::Serialize;

/// Mean and sample standard deviation of one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeanStd {
    pub mean: f64,
    pub std: f64,
}

impl MeanStd {
    /// Arithmetic mean and sample (n - 1) standard deviation.
    ///
    /// The deviation is 0 for a single value; both are NaN for no values.
    pub fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                mean: f64::NAN,
                std: f64::NAN,
            };
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std = if values.len() < 2 {
            0.0
        } else {
            let squared: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (squared / (n - 1.0)).sqrt()
        };

        Self { mean, std }
    }
}

/// Accuracy and F1 statistics against one ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreStats {
    pub accuracy: MeanStd,
    pub f1: MeanStd,
}

impl ScoreStats {
    fn of<'a>(summaries: impl Iterator<Item = &'a ScoreSummary> + Clone) -> Self {
        let accuracies: Vec<f64> = summaries.clone().map(|s| s.accuracy).collect();
        let f1s: Vec<f64> = summaries.map(|s| s.f1).collect();
        Self {
            accuracy: MeanStd::of(&accuracies),
            f1: MeanStd::of(&f1s),
        }
    }
}

/// Aggregate over the runs of one experiment, with the per-run metrics kept
/// in run-index order for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedMetrics {
    pub image: ScoreStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anatomy: Option<ScoreStats>,
    pub runs: Vec<RunMetrics>,
}

impl AggregatedMetrics {
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }
}

/// Aggregate per-run metrics. The statistics do not depend on input order.
///
/// Anatomy statistics are present only when every run carries anatomy
/// scores.
pub fn aggregate_runs(runs: Vec<RunMetrics>) -> AggregatedMetrics {
    let image = ScoreStats::of(runs.iter().map(|r| &r.image));

    let anatomy = if !runs.is_empty() && runs.iter().all(|r| r.anatomy.is_some()) {
        Some(ScoreStats::of(runs.iter().filter_map(|r| r.anatomy.as_ref())))
    } else {
        None
    };

    AggregatedMetrics {
        image,
        anatomy,
        runs,
    }
}

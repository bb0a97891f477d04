//! Result rows per experiment, written as CSV or JSON.

use crate::aggregate::{AggregatedMetrics, MeanStd};
use crate::error::{Result, ScoreError};
use crate::evaluate::RunMetrics;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Which evaluation produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Image,
    Anatomy,
}

impl ReportKind {
    fn file_suffix(self) -> &'static str {
        match self {
            ReportKind::Image => "Image",
            ReportKind::Anatomy => "Anatomy-vs-Image_Left-Right-Questions",
        }
    }
}

/// Aggregated results of one experiment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentReport {
    pub base_name: String,
    pub kind: ReportKind,
    pub aggregated: AggregatedMetrics,
}

/// Output format for [`save_reports`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Csv,
}

impl ReportFormat {
    /// Determine format from file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => ReportFormat::Csv,
            _ => ReportFormat::Json,
        }
    }
}

/// File name for a report. Experiment names only appear when there is more
/// than one experiment in the directory.
pub fn report_file_name(kind: ReportKind, base_name: &str, single_experiment: bool) -> String {
    if single_experiment {
        format!("Results_{}.csv", kind.file_suffix())
    } else {
        format!("Results_{}_{}.csv", base_name, kind.file_suffix())
    }
}

fn numbered(prefix: &str, slots: usize) -> impl Iterator<Item = String> + '_ {
    (1..=slots).map(move |i| format!("{}_run{}", prefix, i))
}

fn per_run(
    report: &ExperimentReport,
    slots: usize,
    value: impl Fn(&RunMetrics) -> Option<usize>,
) -> Vec<String> {
    let runs = &report.aggregated.runs;
    (0..slots)
        .map(|i| {
            runs.get(i)
                .and_then(&value)
                .map(|v| v.to_string())
                .unwrap_or_default()
        })
        .collect()
}

fn stats(stats: &MeanStd) -> [String; 2] {
    [stats.mean.to_string(), stats.std.to_string()]
}

impl ExperimentReport {
    /// Column headers for `slots` per-run columns.
    pub fn header(&self, slots: usize) -> Vec<String> {
        let mut header: Vec<String> = Vec::new();
        match self.kind {
            ReportKind::Image => {
                header.extend(
                    ["Accuracy_Mean", "Accuracy_Std", "F1_Mean", "F1_Std", ""]
                        .map(String::from),
                );
                header.extend(numbered("correct", slots));
                header.extend(numbered("incorrect", slots));
                header.extend(numbered("unsure", slots));
            }
            ReportKind::Anatomy => {
                header.extend(
                    [
                        "Anatomy_Accuracy_Mean",
                        "Anatomy_Accuracy_Std",
                        "Anatomy_F1_Mean",
                        "Anatomy_F1_Std",
                        "",
                    ]
                    .map(String::from),
                );
                header.extend(numbered("Anatomy_correct", slots));
                header.extend(numbered("Anatomy_incorrect", slots));
                header.extend(
                    [
                        "",
                        "Image_Accuracy_Mean",
                        "Image_Accuracy_Std",
                        "Image_F1_Mean",
                        "Image_F1_Std",
                    ]
                    .map(String::from),
                );
            }
        }
        header
    }

    /// The result row matching [`ExperimentReport::header`]. Missing runs are
    /// empty cells.
    pub fn row(&self, slots: usize) -> Vec<String> {
        let agg = &self.aggregated;
        let mut row: Vec<String> = Vec::new();
        match self.kind {
            ReportKind::Image => {
                row.extend(stats(&agg.image.accuracy));
                row.extend(stats(&agg.image.f1));
                row.push(String::new());
                row.extend(per_run(self, slots, |r| Some(r.image.correct_count)));
                row.extend(per_run(self, slots, |r| Some(r.image.incorrect_count)));
                row.extend(per_run(self, slots, |r| Some(r.unsure_count)));
            }
            ReportKind::Anatomy => {
                let nan = MeanStd {
                    mean: f64::NAN,
                    std: f64::NAN,
                };
                let anatomy = agg.anatomy.as_ref();
                row.extend(stats(anatomy.map(|a| &a.accuracy).unwrap_or(&nan)));
                row.extend(stats(anatomy.map(|a| &a.f1).unwrap_or(&nan)));
                row.push(String::new());
                row.extend(per_run(self, slots, |r| {
                    r.anatomy.as_ref().map(|a| a.correct_count)
                }));
                row.extend(per_run(self, slots, |r| {
                    r.anatomy.as_ref().map(|a| a.incorrect_count)
                }));
                row.push(String::new());
                row.extend(stats(&agg.image.accuracy));
                row.extend(stats(&agg.image.f1));
            }
        }
        row
    }

    /// Number of per-run column slots: at least `runs_per_experiment`, more
    /// if the experiment has more runs.
    pub fn slots(&self, runs_per_experiment: usize) -> usize {
        runs_per_experiment.max(self.aggregated.run_count())
    }

    /// Write header and row as a CSV file.
    pub fn write_csv(&self, path: &Path, runs_per_experiment: usize) -> Result<()> {
        ensure_parent(path)?;
        let slots = self.slots(runs_per_experiment);
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(self.header(slots))?;
        writer.write_record(self.row(slots))?;
        writer.flush().map_err(|e| ScoreError::io(path, e))?;
        Ok(())
    }

    /// Print a summary to stdout.
    pub fn print_summary(&self) {
        let agg = &self.aggregated;
        println!("\n========== {} ==========", self.base_name);
        println!("Runs: {}", agg.run_count());
        println!("----------------------------------------");
        if let Some(anatomy) = &agg.anatomy {
            println!(
                "Anatomy accuracy: {:.4} ± {:.4}",
                anatomy.accuracy.mean, anatomy.accuracy.std
            );
            println!(
                "Anatomy F1:       {:.4} ± {:.4}",
                anatomy.f1.mean, anatomy.f1.std
            );
        }
        println!(
            "Image accuracy:   {:.4} ± {:.4}",
            agg.image.accuracy.mean, agg.image.accuracy.std
        );
        println!(
            "Image F1:         {:.4} ± {:.4}",
            agg.image.f1.mean, agg.image.f1.std
        );
        println!("----------------------------------------");
        for (i, run) in agg.runs.iter().enumerate() {
            print!(
                "run {}: {} correct, {} incorrect, {} unsure",
                i + 1,
                run.image.correct_count,
                run.image.incorrect_count,
                run.unsure_count
            );
            match &run.anatomy {
                Some(anatomy) => println!(
                    " | anatomy {} correct, {} incorrect",
                    anatomy.correct_count, anatomy.incorrect_count
                ),
                None => println!(),
            }
        }
        println!("========================================");
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| ScoreError::io(parent, e))?;
        }
    }
    Ok(())
}

/// Save all reports to one file, as pretty JSON or as CSV (one row per
/// experiment, prefixed by the experiment name).
pub fn save_reports(
    reports: &[ExperimentReport],
    path: &Path,
    runs_per_experiment: usize,
) -> Result<()> {
    ensure_parent(path)?;
    match ReportFormat::from_path(path) {
        ReportFormat::Json => {
            let content = serde_json::to_string_pretty(reports)
                .map_err(|e| ScoreError::Report(e.to_string()))?;
            fs::write(path, content).map_err(|e| ScoreError::io(path, e))
        }
        ReportFormat::Csv => {
            let slots = reports
                .iter()
                .map(|r| r.slots(runs_per_experiment))
                .max()
                .unwrap_or(runs_per_experiment);
            let mut writer = csv::Writer::from_path(path)?;
            if let Some(first) = reports.first() {
                let mut header = vec!["Experiment".to_string()];
                header.extend(first.header(slots));
                writer.write_record(header)?;
            }
            for report in reports {
                let mut row = vec![report.base_name.clone()];
                row.extend(report.row(slots));
                writer.write_record(row)?;
            }
            writer.flush().map_err(|e| ScoreError::io(path, e))?;
            Ok(())
        }
    }
}

/// Write each report to its own CSV file in `output_dir`. Returns the paths
/// written, in input order.
pub fn write_experiment_csvs(
    reports: &[ExperimentReport],
    output_dir: &Path,
    runs_per_experiment: usize,
) -> Result<Vec<PathBuf>> {
    let single = reports.len() == 1;
    let mut written = Vec::with_capacity(reports.len());
    for report in reports {
        let path = output_dir.join(report_file_name(report.kind, &report.base_name, single));
        report.write_csv(&path, runs_per_experiment)?;
        tracing::info!("Report saved to {}", path.display());
        written.push(path);
    }
    Ok(written)
}

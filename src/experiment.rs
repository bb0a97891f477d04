//! Scoring of every experiment in an answers directory.

use crate::aggregate::aggregate_runs;
use crate::error::Result;
use crate::evaluate::{EvaluationMode, evaluate_file};
use crate::report::{ExperimentReport, ReportKind};
use crate::runs::{NamingPolicy, discover_run_files, group_runs};
use std::path::Path;

/// Discover, group, score and aggregate all runs under `answers_dir`.
///
/// All run files are discovered and grouped before the first one is scored,
/// so naming problems abort the whole evaluation up front. Anatomy
/// evaluation requires every JSON file to follow the run naming convention.
pub fn score_directory(
    answers_dir: &Path,
    mode: EvaluationMode<'_>,
) -> Result<Vec<ExperimentReport>> {
    let (policy, kind) = match mode {
        EvaluationMode::Image => (NamingPolicy::Lenient, ReportKind::Image),
        EvaluationMode::AnatomyDual(_) => (NamingPolicy::Strict, ReportKind::Anatomy),
    };

    let files = discover_run_files(answers_dir)?;
    let groups = group_runs(&files, policy)?;
    tracing::info!(
        "Scoring {} experiments from {} run files",
        groups.len(),
        files.len()
    );

    let mut reports = Vec::with_capacity(groups.len());
    for (base_name, runs) in groups {
        let run_metrics = runs
            .iter()
            .map(|run| evaluate_file(&run.path, mode))
            .collect::<Result<Vec<_>>>()?;

        reports.push(ExperimentReport {
            base_name,
            kind,
            aggregated: aggregate_runs(run_metrics),
        });
    }

    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScoreError;
    use crate::records::ObjectCenterMap;
    use std::fs;
    use tempfile::TempDir;

    fn run_json(answers: &[(&str, &str, u8)]) -> String {
        let records: Vec<serde_json::Value> = answers
            .iter()
            .map(|(question, answer, expected)| {
                serde_json::json!({
                    "question": question,
                    "model_answer": answer,
                    "expected_answer": expected,
                    "entire_prompt": "Answer strictly with '1' for Yes or '0' for No."
                })
            })
            .collect();
        serde_json::json!([{ "file_name": "img.png", "results_call": records }]).to_string()
    }

    const LR: &str = "Is the liver to the left of the spleen?";

    #[test]
    fn test_score_directory_image() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("exp_run_0.json"),
            run_json(&[(LR, "1", 1), (LR, "No", 0)]),
        )
        .unwrap();
        fs::write(
            dir.path().join("exp_run_1.json"),
            run_json(&[(LR, "1", 1), (LR, "It is hard to tell.", 0)]),
        )
        .unwrap();
        fs::write(dir.path().join("notes.json"), "{}").unwrap();

        let reports = score_directory(dir.path(), EvaluationMode::Image).unwrap();
        assert_eq!(reports.len(), 1);

        let report = &reports[0];
        assert_eq!(report.base_name, "exp");
        assert_eq!(report.kind, ReportKind::Image);

        let runs = &report.aggregated.runs;
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].image.accuracy, 1.0);
        assert_eq!(runs[0].image.f1, 1.0);
        assert_eq!(runs[1].unsure_count, 1);
        assert_eq!(runs[1].image.accuracy, 0.5);
        // Unparseable against a No truth is forced to Yes: tp=1, fp=1.
        assert!((runs[1].image.f1 - 2.0 / 3.0).abs() < 1e-12);
        assert!((report.aggregated.image.accuracy.mean - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_score_directory_anatomy_strict_naming() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("exp_run_0.json"), run_json(&[(LR, "1", 1)])).unwrap();
        fs::write(dir.path().join("notes.json"), "[]").unwrap();

        let centers = ObjectCenterMap::default();
        let result = score_directory(dir.path(), EvaluationMode::AnatomyDual(&centers));
        assert!(matches!(result, Err(ScoreError::InvalidRunFileName(_))));
    }

    #[test]
    fn test_score_directory_anatomy() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("exp_run_0.json"),
            run_json(&[(LR, "1", 0), ("Is the liver above the spleen?", "1", 1)]),
        )
        .unwrap();
        let centers = ObjectCenterMap::from_json_str(
            r#"[{"filename": "img.png", "label_info": [
                {"class_name": "liver", "center_x": 120, "center_y": 0},
                {"class_name": "spleen", "center_x": 80, "center_y": 0}
            ]}]"#,
        )
        .unwrap();

        let reports = score_directory(dir.path(), EvaluationMode::AnatomyDual(&centers)).unwrap();
        let report = &reports[0];
        assert_eq!(report.kind, ReportKind::Anatomy);

        let run = &report.aggregated.runs[0];
        assert_eq!(run.image.total, 1);
        assert_eq!(run.image.correct_count, 0);
        let anatomy = run.anatomy.unwrap();
        assert_eq!(anatomy.correct_count, 1);
        assert_eq!(anatomy.accuracy, 1.0);
        assert!(report.aggregated.anatomy.is_some());
    }

    #[test]
    fn test_malformed_run_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("exp_run_0.json"), "not json").unwrap();

        let result = score_directory(dir.path(), EvaluationMode::Image);
        assert!(matches!(result, Err(ScoreError::Json { .. })));
    }
}

//! Scoring of a single run against image and anatomy ground truth.

use crate::anatomy::{derive_ground_truth, is_left_right_question};
use crate::answer::parse;
use crate::error::Result;
use crate::metrics::{BinaryTally, ScoreSummary};
use crate::records::{ObjectCenterMap, RunFile};
use serde::Serialize;
use std::path::Path;

/// Which ground truths a run is scored against.
#[derive(Debug, Clone, Copy)]
pub enum EvaluationMode<'a> {
    /// Every record against its recorded `expected_answer`.
    Image,
    /// Left/right records only, against both the recorded answer and the
    /// answer derived from the structure centers.
    AnatomyDual(&'a ObjectCenterMap),
}

impl EvaluationMode<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            EvaluationMode::Image => "image",
            EvaluationMode::AnatomyDual(_) => "anatomy_dual",
        }
    }
}

/// Metrics of one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunMetrics {
    /// Scores against the image ground truth.
    pub image: ScoreSummary,
    /// Replies no parser tier could decide. Already counted as incorrect.
    pub unsure_count: usize,
    /// Scores against the anatomy ground truth, in anatomy mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anatomy: Option<ScoreSummary>,
}

/// Score every record of a run.
///
/// Unparseable replies are scored as the opposite of the expected answer, so
/// they always count as incorrect, and are tallied in `unsure_count`. In
/// anatomy mode, records whose anatomy truth cannot be derived still count
/// toward the image scores.
pub fn evaluate_run(run: &RunFile, mode: EvaluationMode<'_>) -> RunMetrics {
    let mut image = BinaryTally::new();
    let mut anatomy = BinaryTally::new();
    let mut unsure_count = 0;

    for (image_key, record) in run.records() {
        let centers = match mode {
            EvaluationMode::Image => None,
            EvaluationMode::AnatomyDual(centers) => {
                if !is_left_right_question(&record.question) {
                    continue;
                }
                Some(centers)
            }
        };

        let expected = record.expected_answer;
        let parsed = parse(&record.model_answer, &record.question, &record.entire_prompt);
        let predicted = match parsed.label {
            Some(label) => label,
            None => {
                unsure_count += 1;
                tracing::debug!(
                    image = image_key,
                    question = %record.question,
                    "Unparseable answer: {:?}",
                    parsed.residual_text.as_deref().unwrap_or_default()
                );
                expected.opposite()
            }
        };
        image.record(predicted, expected);

        if let Some(centers) = centers {
            match derive_ground_truth(
                &record.question,
                record.object1_name.as_deref(),
                record.object2_name.as_deref(),
                centers,
                image_key,
            ) {
                Some(truth) => anatomy.record(predicted, truth),
                None => tracing::debug!(
                    image = image_key,
                    question = %record.question,
                    "Anatomy ground truth unavailable"
                ),
            }
        }
    }

    RunMetrics {
        image: image.summary(),
        unsure_count,
        anatomy: match mode {
            EvaluationMode::Image => None,
            EvaluationMode::AnatomyDual(_) => Some(anatomy.summary()),
        },
    }
}

/// Load and score one run file.
pub fn evaluate_file(path: &Path, mode: EvaluationMode<'_>) -> Result<RunMetrics> {
    let run = RunFile::load_json(path)?;
    tracing::debug!(
        "Loaded {} records from {} images in {}",
        run.record_count(),
        run.entries.len(),
        path.display()
    );
    let metrics = evaluate_run(&run, mode);

    tracing::info!(
        "{} ({} mode): {} records scored, accuracy {:.4}, f1 {:.4}, {} unsure",
        path.display(),
        mode.name(),
        metrics.image.total,
        metrics.image.accuracy,
        metrics.image.f1,
        metrics.unsure_count
    );
    if let Some(anatomy) = &metrics.anatomy {
        tracing::info!(
            "{}: anatomy accuracy {:.4}, f1 {:.4} over {} records",
            path.display(),
            anatomy.accuracy,
            anatomy.f1,
            anatomy.total
        );
    }

    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{BinaryLabel, Point, QaRecord, RunEntry};

    fn record(question: &str, answer: &str, expected: BinaryLabel) -> QaRecord {
        QaRecord {
            question: question.to_string(),
            expected_answer: expected,
            model_answer: answer.to_string(),
            entire_prompt: String::new(),
            object1_name: None,
            object2_name: None,
        }
    }

    fn run(file_name: &str, records: Vec<QaRecord>) -> RunFile {
        RunFile {
            entries: vec![RunEntry {
                file_name: file_name.to_string(),
                results_call: records,
            }],
        }
    }

    #[test]
    fn test_all_correct() {
        let run = run(
            "a.png",
            vec![
                record("Is the liver above the spleen?", "1", BinaryLabel::Yes),
                record("Is the liver below the spleen?", "No", BinaryLabel::No),
            ],
        );
        let metrics = evaluate_run(&run, EvaluationMode::Image);

        assert_eq!(metrics.image.accuracy, 1.0);
        assert_eq!(metrics.image.f1, 1.0);
        assert_eq!(metrics.image.correct_count, 2);
        assert_eq!(metrics.image.incorrect_count, 0);
        assert_eq!(metrics.unsure_count, 0);
        assert!(metrics.anatomy.is_none());
    }

    #[test]
    fn test_unparseable_scored_incorrect() {
        let run = run(
            "a.png",
            vec![record(
                "Is the liver to the left of the spleen?",
                "I think it's hard to tell.",
                BinaryLabel::Yes,
            )],
        );
        let metrics = evaluate_run(&run, EvaluationMode::Image);

        assert_eq!(metrics.unsure_count, 1);
        assert_eq!(metrics.image.incorrect_count, 1);
        assert_eq!(metrics.image.correct_count, 0);
        assert_eq!(metrics.image.accuracy, 0.0);
        // Forced prediction is No against a Yes truth: no true positives.
        assert_eq!(metrics.image.f1, 0.0);
    }

    #[test]
    fn test_empty_run() {
        let metrics = evaluate_run(&RunFile::default(), EvaluationMode::Image);
        assert!(metrics.image.accuracy.is_nan());
        assert!(metrics.image.f1.is_nan());
        assert_eq!(metrics.image.total, 0);
        assert_eq!(metrics.unsure_count, 0);
    }

    #[test]
    fn test_anatomy_dual() {
        let mut centers = ObjectCenterMap::default();
        centers.insert("a.png", "liver", Point { x: 120.0, y: 10.0 });
        centers.insert("a.png", "spleen", Point { x: 80.0, y: 10.0 });

        let run = run(
            "a.png",
            vec![
                // Image says no, anatomy says yes (120 > 80); model says no.
                record("Is the liver to the left of the spleen?", "0", BinaryLabel::No),
                // Not a left/right question: ignored in this mode.
                record("Is the liver above the spleen?", "1", BinaryLabel::Yes),
                // No centers for the pancreas: image only.
                record("Is the pancreas to the right of the spleen?", "1", BinaryLabel::Yes),
            ],
        );
        let metrics = evaluate_run(&run, EvaluationMode::AnatomyDual(&centers));

        assert_eq!(metrics.image.total, 2);
        assert_eq!(metrics.image.correct_count, 2);
        assert_eq!(metrics.image.accuracy, 1.0);

        let anatomy = metrics.anatomy.unwrap();
        assert_eq!(anatomy.total, 1);
        assert_eq!(anatomy.correct_count, 0);
        assert_eq!(anatomy.incorrect_count, 1);
        assert_eq!(anatomy.accuracy, 0.0);
        assert_eq!(anatomy.f1, 0.0);
    }

    #[test]
    fn test_anatomy_truth_follows_stored_convention() {
        let mut centers = ObjectCenterMap::default();
        centers.insert("a.png", "liver", Point { x: 120.0, y: 10.0 });
        centers.insert("a.png", "spleen", Point { x: 80.0, y: 10.0 });

        let run = run(
            "a.png",
            vec![record(
                "Is the liver to the left of the spleen?",
                "1",
                BinaryLabel::No,
            )],
        );
        let metrics = evaluate_run(&run, EvaluationMode::AnatomyDual(&centers));

        let anatomy = metrics.anatomy.unwrap();
        assert_eq!(anatomy.correct_count, 1);
        assert_eq!(anatomy.f1, 1.0);
        assert_eq!(metrics.image.incorrect_count, 1);
    }

    #[test]
    fn test_anatomy_mode_without_any_lookup() {
        let centers = ObjectCenterMap::default();
        let run = run(
            "a.png",
            vec![record(
                "Is the liver to the left of the spleen?",
                "maybe",
                BinaryLabel::No,
            )],
        );
        let metrics = evaluate_run(&run, EvaluationMode::AnatomyDual(&centers));

        assert_eq!(metrics.unsure_count, 1);
        assert_eq!(metrics.image.incorrect_count, 1);
        let anatomy = metrics.anatomy.unwrap();
        assert_eq!(anatomy.total, 0);
        assert!(anatomy.accuracy.is_nan());
    }
}

//! MIRP Scorer - offline scoring of yes/no spatial-relation answers.
//!
//! Vision-language models are asked binary questions about abdominal CT
//! slices ("Is the left kidney below the inferior vena cava?") and told to
//! reply with a single `1` or `0`. They often do not. This crate turns the
//! recorded free-text replies into binary labels and scores them against
//! the image ground truth and, for left/right questions, against a ground
//! truth derived from standard anatomy.
//!
//! # Quick Start
//!
//! ```no_run
//! use mirp_scorer::{
//!     evaluate::EvaluationMode,
//!     experiment::score_directory,
//!     records::ObjectCenterMap,
//! };
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let centers = ObjectCenterMap::load_json(Path::new("centers.json"))?;
//!     let reports = score_directory(Path::new("answers"), EvaluationMode::AnatomyDual(&centers))?;
//!
//!     for report in &reports {
//!         report.print_summary();
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **answer**: tiered parser from raw reply to label, with a direction-word fallback
//! - **anatomy**: ground truth from structure centers
//! - **evaluate**: per-run tallies, accuracy and F1
//! - **aggregate**: mean and standard deviation over repeated runs
//! - **runs** / **experiment**: `*_run_<n>.json` discovery and grouping
//! - **report**: CSV and JSON output

pub mod aggregate;
pub mod anatomy;
pub mod answer;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod experiment;
pub mod metrics;
pub mod records;
pub mod report;
pub mod runs;

// Re-export commonly used types
pub use aggregate::{AggregatedMetrics, aggregate_runs};
pub use answer::{ParseResult, parse};
pub use config::Config;
pub use error::{Result, ScoreError};
pub use evaluate::{EvaluationMode, RunMetrics, evaluate_run};
pub use records::{BinaryLabel, ObjectCenterMap, QaRecord, RunFile};
pub use report::ExperimentReport;

//! Error types for the scorer.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our custom error.
pub type Result<T> = std::result::Result<T, ScoreError>;

/// Errors that can occur while loading or scoring runs.
///
/// Unparseable model answers and unresolvable anatomy lookups are not errors;
/// they are ordinary outcomes of scoring.
#[derive(Error, Debug)]
pub enum ScoreError {
    /// Error reading or writing files.
    #[error("I/O error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON input file could not be decoded.
    #[error("Invalid JSON in '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The answers directory does not exist or is not a directory.
    #[error("Answers directory not found: '{0}'")]
    AnswersDirNotFound(PathBuf),

    /// The object-center file does not exist.
    #[error("Centers JSON not found: '{0}'")]
    CentersNotFound(PathBuf),

    /// No run files were found in the answers directory.
    #[error("No run JSON files found in '{0}'")]
    NoRunFiles(PathBuf),

    /// A run file does not follow the `*_run_<n>.json` naming convention.
    #[error("File does not match '*_run_<n>.json' pattern: '{0}'")]
    InvalidRunFileName(PathBuf),

    /// A ground-truth label outside {0, 1}.
    #[error("Expected answer must be 0 or 1, got {0}")]
    InvalidLabel(i64),

    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to write a report.
    #[error("Report error: {0}")]
    Report(String),
}

impl ScoreError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a JSON decoding error with path context.
    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

impl From<csv::Error> for ScoreError {
    fn from(err: csv::Error) -> Self {
        ScoreError::Report(err.to_string())
    }
}

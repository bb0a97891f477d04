//! Configuration for the scorer.
//!
//! Supports both environment variables and YAML config file.
//! Environment variables take precedence over config file values, and
//! command-line flags take precedence over both.

use crate::error::{Result, ScoreError};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Default file name of the object-center reference data.
pub const DEFAULT_CENTERS_FILE: &str =
    "center_of_anatomical_stuctures_in_standard_radiological_orientation.json";

/// Evaluation inputs and report layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Directory holding the `*_run_<n>.json` files.
    #[serde(default = "default_answers_dir")]
    pub answers_dir: PathBuf,

    /// Object-center JSON used by the anatomy evaluation.
    #[serde(default = "default_centers_path")]
    pub centers_path: PathBuf,

    /// Where reports are written. Defaults to the parent of `answers_dir`.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Number of per-run column slots in the report.
    #[serde(default = "default_runs_per_experiment")]
    pub runs_per_experiment: usize,
}

fn default_answers_dir() -> PathBuf {
    PathBuf::from("./answers")
}

fn default_centers_path() -> PathBuf {
    PathBuf::from(DEFAULT_CENTERS_FILE)
}

fn default_runs_per_experiment() -> usize {
    3
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            answers_dir: default_answers_dir(),
            centers_path: default_centers_path(),
            output_dir: None,
            runs_per_experiment: default_runs_per_experiment(),
        }
    }
}

impl EvaluationConfig {
    /// Directory the reports go to.
    ///
    /// Falls back to the parent of the answers directory, or the current
    /// directory when the answers directory has no parent component.
    pub fn resolved_output_dir(&self) -> PathBuf {
        if let Some(dir) = &self.output_dir {
            return dir.clone();
        }
        match self.answers_dir.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

/// Full application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Evaluation settings
    #[serde(default)]
    pub evaluation: EvaluationConfig,
}

/// Configuration file structure (YAML format).
#[derive(Debug, Deserialize)]
struct ConfigFile {
    evaluation: Option<EvaluationFileSection>,
}

#[derive(Debug, Deserialize)]
struct EvaluationFileSection {
    answers_dir: Option<PathBuf>,
    centers_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    runs_per_experiment: Option<usize>,
}

impl Config {
    /// Load configuration from environment variables and optional config file.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (MIRP_ANSWERS_DIR, MIRP_CENTERS_PATH, ...)
    /// 2. Config file (~/.config/mirp-scorer/config.yaml)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                config = Self::load_from_file(&config_path)?;
                tracing::debug!("Loaded configuration from {}", config_path.display());
            }
        }

        if let Ok(answers_dir) = env::var("MIRP_ANSWERS_DIR") {
            config.evaluation.answers_dir = PathBuf::from(answers_dir);
        }

        if let Ok(centers_path) = env::var("MIRP_CENTERS_PATH") {
            config.evaluation.centers_path = PathBuf::from(centers_path);
        }

        if let Ok(output_dir) = env::var("MIRP_OUTPUT_DIR") {
            config.evaluation.output_dir = Some(PathBuf::from(output_dir));
        }

        if let Ok(runs) = env::var("MIRP_RUNS_PER_EXPERIMENT") {
            if let Ok(runs) = runs.parse() {
                config.evaluation.runs_per_experiment = runs;
            } else {
                tracing::warn!("Ignoring non-numeric MIRP_RUNS_PER_EXPERIMENT={}", runs);
            }
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ScoreError::io(path, e))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text, filling gaps with defaults.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let file_config: ConfigFile = serde_yaml::from_str(content)
            .map_err(|e| ScoreError::Config(format!("Failed to parse config file: {}", e)))?;

        let mut config = Config::default();

        if let Some(evaluation) = file_config.evaluation {
            if let Some(answers_dir) = evaluation.answers_dir {
                config.evaluation.answers_dir = answers_dir;
            }
            if let Some(centers_path) = evaluation.centers_path {
                config.evaluation.centers_path = centers_path;
            }
            if evaluation.output_dir.is_some() {
                config.evaluation.output_dir = evaluation.output_dir;
            }
            if let Some(runs) = evaluation.runs_per_experiment {
                config.evaluation.runs_per_experiment = runs;
            }
        }

        Ok(config)
    }

    /// Get the default config file path.
    pub fn config_file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "mirp-scorer")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.evaluation.answers_dir.as_os_str().is_empty() {
            return Err(ScoreError::Config(
                "Answers directory is required. Set MIRP_ANSWERS_DIR or add to config file."
                    .to_string(),
            ));
        }

        if self.evaluation.centers_path.as_os_str().is_empty() {
            return Err(ScoreError::Config(
                "Centers path must not be empty.".to_string(),
            ));
        }

        if self.evaluation.runs_per_experiment == 0 {
            return Err(ScoreError::Config(
                "runs_per_experiment must be at least 1.".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.evaluation.answers_dir, PathBuf::from("./answers"));
        assert_eq!(
            config.evaluation.centers_path,
            PathBuf::from(DEFAULT_CENTERS_FILE)
        );
        assert!(config.evaluation.output_dir.is_none());
        assert_eq!(config.evaluation.runs_per_experiment, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_runs() {
        let mut config = Config::default();
        config.evaluation.runs_per_experiment = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_yaml_partial() {
        let yaml = "evaluation:\n  answers_dir: /data/answers\n  runs_per_experiment: 5\n";
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.evaluation.answers_dir, PathBuf::from("/data/answers"));
        assert_eq!(config.evaluation.runs_per_experiment, 5);
        assert_eq!(
            config.evaluation.centers_path,
            PathBuf::from(DEFAULT_CENTERS_FILE)
        );
    }

    #[test]
    fn test_from_yaml_invalid() {
        assert!(Config::from_yaml("evaluation: [unclosed").is_err());
    }

    #[test]
    fn test_resolved_output_dir() {
        let mut evaluation = EvaluationConfig::default();
        assert_eq!(evaluation.resolved_output_dir(), PathBuf::from("."));

        evaluation.answers_dir = PathBuf::from("/data/exp/answers");
        assert_eq!(evaluation.resolved_output_dir(), PathBuf::from("/data/exp"));

        evaluation.output_dir = Some(PathBuf::from("/tmp/out"));
        assert_eq!(evaluation.resolved_output_dir(), PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_resolved_output_dir_bare_name() {
        let evaluation = EvaluationConfig {
            answers_dir: PathBuf::from("answers"),
            ..Default::default()
        };
        assert_eq!(evaluation.resolved_output_dir(), PathBuf::from("."));
    }
}

//! Discovery of run files and grouping into experiments.
//!
//! Run files are named `<experiment>_run_<n>.json`; all files sharing the
//! experiment prefix are repeated runs of the same configuration.

use crate::error::{Result, ScoreError};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

static RUN_FILE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.*)_run_(\d+)\.json$").expect("run file pattern must compile")
});

/// Prefix of earlier result files written next to the run files.
const RESULT_FILE_PREFIX: &str = "Result_";

/// What to do with JSON files that do not follow the naming convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingPolicy {
    /// Fail with [`ScoreError::InvalidRunFileName`].
    Strict,
    /// Skip with a warning.
    Lenient,
}

/// One run file of an experiment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPath {
    pub index: u64,
    pub path: PathBuf,
}

/// Split a run file name into its experiment name and run index.
pub fn parse_run_file_name(file_name: &str) -> Option<(String, u64)> {
    let captures = RUN_FILE_NAME.captures(file_name)?;
    let index = captures[2].parse().ok()?;
    Some((captures[1].to_string(), index))
}

/// List the JSON files directly inside `dir`, in file-name order.
///
/// Files starting with `Result_` are skipped.
pub fn discover_run_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ScoreError::AnswersDirNotFound(dir.to_path_buf()));
    }

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            ScoreError::io(path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.to_lowercase().ends_with(".json") || name.starts_with(RESULT_FILE_PREFIX) {
            continue;
        }
        files.push(entry.into_path());
    }

    if files.is_empty() {
        return Err(ScoreError::NoRunFiles(dir.to_path_buf()));
    }

    tracing::debug!("Found {} run files in {}", files.len(), dir.display());
    Ok(files)
}

/// Group run files by experiment name, each group sorted by run index.
pub fn group_runs(
    files: &[PathBuf],
    policy: NamingPolicy,
) -> Result<BTreeMap<String, Vec<RunPath>>> {
    let mut groups: BTreeMap<String, Vec<RunPath>> = BTreeMap::new();

    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match parse_run_file_name(&name) {
            Some((base, index)) => groups.entry(base).or_default().push(RunPath {
                index,
                path: path.clone(),
            }),
            None => match policy {
                NamingPolicy::Strict => {
                    return Err(ScoreError::InvalidRunFileName(path.clone()));
                }
                NamingPolicy::Lenient => {
                    tracing::warn!(
                        "Skipping {}: does not match '*_run_<n>.json'",
                        path.display()
                    );
                }
            },
        }
    }

    for runs in groups.values_mut() {
        runs.sort_by_key(|r| r.index);
    }

    Ok(groups)
}

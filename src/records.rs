//! Data model for run files and object-center reference data.
//!
//! Run files are produced by the inference driver: one JSON array per run,
//! one entry per image, one [`QaRecord`] per question asked about that image.

use crate::error::{Result, ScoreError};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// A binary answer: `1` for yes, `0` for no.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub enum BinaryLabel {
    No,
    Yes,
}

impl BinaryLabel {
    /// Numeric value of the label.
    pub fn as_u8(self) -> u8 {
        match self {
            BinaryLabel::No => 0,
            BinaryLabel::Yes => 1,
        }
    }

    /// The other label.
    pub fn opposite(self) -> Self {
        match self {
            BinaryLabel::No => BinaryLabel::Yes,
            BinaryLabel::Yes => BinaryLabel::No,
        }
    }

    pub fn from_bool(yes: bool) -> Self {
        if yes { BinaryLabel::Yes } else { BinaryLabel::No }
    }
}

impl TryFrom<i64> for BinaryLabel {
    type Error = ScoreError;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            0 => Ok(BinaryLabel::No),
            1 => Ok(BinaryLabel::Yes),
            other => Err(ScoreError::InvalidLabel(other)),
        }
    }
}

impl From<BinaryLabel> for u8 {
    fn from(label: BinaryLabel) -> Self {
        label.as_u8()
    }
}

impl std::fmt::Display for BinaryLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// One question asked about one image, with the model's raw reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaRecord {
    /// The question text.
    #[serde(default)]
    pub question: String,
    /// Ground truth from the image.
    pub expected_answer: BinaryLabel,
    /// Raw model output. `null` in the file reads as an empty string.
    #[serde(default, deserialize_with = "string_or_null")]
    pub model_answer: String,
    /// The full prompt sent to the model.
    #[serde(default, deserialize_with = "string_or_null")]
    pub entire_prompt: String,
    /// First structure named in the question, if the driver recorded it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object1_name: Option<String>,
    /// Second structure named in the question, if the driver recorded it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object2_name: Option<String>,
}

fn string_or_null<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// All questions asked about one image in one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEntry {
    /// Image file name; also the key into the [`ObjectCenterMap`].
    pub file_name: String,
    /// Per-question results.
    #[serde(default)]
    pub results_call: Vec<QaRecord>,
}

/// One complete pass over an experiment's QA set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunFile {
    pub entries: Vec<RunEntry>,
}

impl RunFile {
    /// Load a run file from JSON.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ScoreError::io(path, e))?;
        serde_json::from_str(&content).map_err(|e| ScoreError::json(path, e))
    }

    /// Iterate over `(image file name, record)` pairs in file order.
    pub fn records(&self) -> impl Iterator<Item = (&str, &QaRecord)> {
        self.entries.iter().flat_map(|entry| {
            entry
                .results_call
                .iter()
                .map(move |record| (entry.file_name.as_str(), record))
        })
    }

    /// Total number of records across all entries.
    pub fn record_count(&self) -> usize {
        self.entries.iter().map(|e| e.results_call.len()).sum()
    }
}

/// A 2D pixel position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Image file name -> canonical structure name -> center.
///
/// Loaded once and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct ObjectCenterMap {
    images: HashMap<String, HashMap<String, Point>>,
}

#[derive(Debug, Deserialize)]
struct RawCenterEntry {
    filename: String,
    #[serde(default)]
    label_info: Vec<RawLabelInfo>,
}

#[derive(Debug, Deserialize)]
struct RawLabelInfo {
    class_name: String,
    center_x: f64,
    center_y: f64,
}

impl ObjectCenterMap {
    /// Load the centers JSON: `[{filename, label_info: [{class_name, center_x, center_y}]}]`.
    pub fn load_json(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(ScoreError::CentersNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|e| ScoreError::io(path, e))?;
        Self::from_json_str(&content).map_err(|e| ScoreError::json(path, e))
    }

    /// Parse the centers JSON from a string.
    pub fn from_json_str(content: &str) -> serde_json::Result<Self> {
        let raw: Vec<RawCenterEntry> = serde_json::from_str(content)?;
        let mut map = Self::default();
        for entry in raw {
            let centers = map.images.entry(entry.filename).or_default();
            for label in entry.label_info {
                centers.insert(
                    label.class_name,
                    Point {
                        x: label.center_x,
                        y: label.center_y,
                    },
                );
            }
        }
        Ok(map)
    }

    /// Add or replace one center.
    pub fn insert(&mut self, image: &str, structure: &str, center: Point) {
        self.images
            .entry(image.to_string())
            .or_default()
            .insert(structure.to_string(), center);
    }

    /// Center of `structure` in `image`, if both are known.
    pub fn center(&self, image: &str, structure: &str) -> Option<Point> {
        self.images.get(image)?.get(structure).copied()
    }

    /// Number of images with center data.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

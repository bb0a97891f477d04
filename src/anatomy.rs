//! Anatomy-based ground truth for left/right questions.
//!
//! The image ground truth records what a (possibly flipped or altered)
//! image shows. The anatomy ground truth instead asks what standard anatomy
//! says, using the labeled structure centers of the reference orientation.

use crate::records::{BinaryLabel, ObjectCenterMap};
use regex::Regex;
use std::sync::LazyLock;

static LEFT_RIGHT_QUESTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)is the (.+?) to the (left|right) of the (.+?)\?")
        .expect("question pattern must compile")
});

/// Whether a question asks about left/right at all.
pub fn is_left_right_question(question: &str) -> bool {
    let question = question.to_lowercase();
    question.contains("left") || question.contains("right")
}

/// Pull both structure names out of "is the X to the left/right of the Y?".
pub fn extract_objects(question: &str) -> Option<(String, String)> {
    let captures = LEFT_RIGHT_QUESTION.captures(question)?;
    Some((
        captures[1].trim().to_string(),
        captures[3].trim().to_string(),
    ))
}

/// Canonical key of a structure name in the centers data.
///
/// Lower-cases and splits on whitespace. A leading `left`/`right` moves to
/// the end, so `"Left Kidney"` becomes `"kidney_left"`; other names are just
/// joined with underscores. This is one-way: `"kidney_left"` maps to itself
/// only because it has no leading side word.
pub fn canonical_name(name: &str) -> String {
    let name = name.trim().to_lowercase();
    let parts: Vec<&str> = name.split_whitespace().collect();

    match parts.split_first() {
        None => String::new(),
        Some((&side, rest)) if side == "left" || side == "right" => {
            format!("{}_{}", rest.join("_"), side)
        }
        Some(_) => parts.join("_"),
    }
}

/// Derive the anatomy ground truth for one question about one image.
///
/// Explicit object names are used when both are given; otherwise both are
/// extracted from the question. Returns `None` when the names cannot be
/// resolved or either center is missing for `image_key`.
///
/// The answer is `Yes` iff the question asks "to the left of" and the first
/// object's x is greater than the second's, or asks "to the right of" and it
/// is smaller. The stored centers use the radiological convention, in which
/// the patient's left is drawn on the right of the image.
pub fn derive_ground_truth(
    question: &str,
    object1: Option<&str>,
    object2: Option<&str>,
    centers: &ObjectCenterMap,
    image_key: &str,
) -> Option<BinaryLabel> {
    let (object1, object2) = match (object1, object2) {
        (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => (a.to_string(), b.to_string()),
        _ => extract_objects(question)?,
    };
    if object1.is_empty() || object2.is_empty() {
        return None;
    }

    let first = centers.center(image_key, &canonical_name(&object1))?;
    let second = centers.center(image_key, &canonical_name(&object2))?;

    let question = question.to_lowercase();
    let asks_left = question.contains(" to the left of ");
    let asks_right = question.contains(" to the right of ");

    Some(BinaryLabel::from_bool(
        (asks_left && first.x > second.x) || (asks_right && first.x < second.x),
    ))
}

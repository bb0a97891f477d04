//! Direction-word fallback for spatial-relation questions.

use crate::records::BinaryLabel;

/// Direction word asked about, paired with its opposite. Scanned in order.
const DIRECTION_PAIRS: [(&str, &str); 4] = [
    ("above", "below"),
    ("below", "above"),
    ("left", "right"),
    ("right", "left"),
];

/// Decide a question from the direction words in `text`.
///
/// For the first pair whose direction word occurs in the question, the
/// answer is `Yes` if `text` repeats that word and `No` if it contains the
/// opposite. If `text` has neither, the next pair is tried. Returns `None`
/// when no pair settles it. Matching is case-insensitive substring search.
pub fn infer_spatial_relation(question: &str, text: &str) -> Option<BinaryLabel> {
    let question = question.to_lowercase();
    let text = text.to_lowercase();

    for (direction, opposite) in DIRECTION_PAIRS {
        if !question.contains(direction) {
            continue;
        }
        if text.contains(direction) {
            return Some(BinaryLabel::Yes);
        }
        if text.contains(opposite) {
            return Some(BinaryLabel::No);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_direction_is_yes() {
        let q = "Is the liver above the left kidney?";
        assert_eq!(
            infer_spatial_relation(q, "The liver is above it."),
            Some(BinaryLabel::Yes)
        );
    }

    #[test]
    fn test_opposite_direction_is_no() {
        let q = "Is the liver to the left of the spleen?";
        assert_eq!(
            infer_spatial_relation(q, "It is on the RIGHT side."),
            Some(BinaryLabel::No)
        );
    }

    #[test]
    fn test_falls_through_to_next_pair() {
        // "below" is asked first, but the reply only talks about left/right.
        let q = "Is the left kidney below the aorta?";
        assert_eq!(
            infer_spatial_relation(q, "It is further left."),
            Some(BinaryLabel::Yes)
        );
        assert_eq!(
            infer_spatial_relation(q, "It sits above the aorta."),
            Some(BinaryLabel::No)
        );
    }

    #[test]
    fn test_first_matching_pair_wins() {
        // Both "below" and "left" occur in the question; "below" is scanned first.
        let q = "Is the left kidney below the aorta?";
        assert_eq!(
            infer_spatial_relation(q, "below, and not to the right"),
            Some(BinaryLabel::Yes)
        );
    }

    #[test]
    fn test_no_direction_in_question() {
        assert_eq!(
            infer_spatial_relation("Is the liver visible?", "left"),
            None
        );
    }

    #[test]
    fn test_no_direction_in_text() {
        assert_eq!(
            infer_spatial_relation("Is the liver to the left of the spleen?", "hard to tell"),
            None
        );
    }
}

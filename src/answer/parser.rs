//! Heuristic cascade for turning a raw model reply into a binary label.
//!
//! The prompt asks for a single `1` or `0`, but replies range from exactly
//! that to paragraphs that echo the prompt back. Tiers run from most to least
//! specific and the first tier that decides wins; later tiers never override
//! an earlier decision.

use super::spatial::infer_spatial_relation;
use crate::records::BinaryLabel;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Replies at least this many characters long skip the short-sentence tier.
const SHORT_SENTENCE_MAX_CHARS: usize = 150;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("answer pattern must compile")
}

static EXACT_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"^[(\[{'".\s]*(0|1)[)\]}'".\s]*$"#));

static EXACT_YES_NO: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"(?i)^[(\[{'".\s]*(yes|no)[)\]}'".\s]*$"#));

static LEADING_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"(?i)^[(\[{'".\s]*(0|1|yes|no)"#));

static TRAILING_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"(?i)(0|1|yes|no)[)\]}'".\s]*$"#));

static FIRST_CLAUSE: LazyLock<Regex> = LazyLock::new(|| compile(r"[^.!?]+[.!?]?"));

static KEYWORD_DIGIT: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)(?:answer|correct answer|final answer|solution|response)(?: is|:)?\s*([10])")
});

/// One step of the cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// The whole reply is `0` or `1`, optionally wrapped in quotes, brackets or dots.
    ExactDigit,
    /// The whole reply is `yes` or `no`, same wrapping.
    ExactYesNo,
    /// A `0|1|yes|no` token at the very start or very end of the reply.
    BoundaryToken,
    /// A short one-sentence reply that names a direction from the question.
    ShortSentence,
    /// The first clause left after removing echoed prompt lines names a direction.
    PromptStripped,
    /// A digit following "answer", "final answer", "solution" or similar.
    KeywordDigit,
}

impl Tier {
    /// Tiers in evaluation order.
    pub const CASCADE: [Tier; 6] = [
        Tier::ExactDigit,
        Tier::ExactYesNo,
        Tier::BoundaryToken,
        Tier::ShortSentence,
        Tier::PromptStripped,
        Tier::KeywordDigit,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Tier::ExactDigit => "exact_digit",
            Tier::ExactYesNo => "exact_yes_no",
            Tier::BoundaryToken => "boundary_token",
            Tier::ShortSentence => "short_sentence",
            Tier::PromptStripped => "prompt_stripped",
            Tier::KeywordDigit => "keyword_digit",
        }
    }

    /// Whether a decision from this tier reports the prompt-stripped text.
    pub fn reports_residual(self) -> bool {
        matches!(self, Tier::PromptStripped | Tier::KeywordDigit)
    }

    /// Run this tier alone. `None` means the tier has no opinion.
    pub fn decide(self, input: &ParseInput<'_>) -> Option<BinaryLabel> {
        match self {
            Tier::ExactDigit => EXACT_DIGIT
                .captures(input.text)
                .and_then(|c| token_label(&c[1])),
            Tier::ExactYesNo => EXACT_YES_NO
                .captures(input.text)
                .and_then(|c| token_label(&c[1])),
            Tier::BoundaryToken => LEADING_TOKEN
                .captures(input.text)
                .or_else(|| TRAILING_TOKEN.captures(input.text))
                .and_then(|c| token_label(&c[1])),
            Tier::ShortSentence => {
                if is_short_sentence(input.text) {
                    infer_spatial_relation(input.question, input.text)
                } else {
                    None
                }
            }
            Tier::PromptStripped => FIRST_CLAUSE
                .find(&input.cleaned)
                .and_then(|m| infer_spatial_relation(input.question, m.as_str().trim())),
            Tier::KeywordDigit => KEYWORD_DIGIT
                .captures(&input.cleaned)
                .and_then(|c| token_label(&c[1])),
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The reply as seen by every tier.
#[derive(Debug, Clone)]
pub struct ParseInput<'a> {
    /// The reply with surrounding whitespace trimmed.
    pub text: &'a str,
    /// The question the reply answers.
    pub question: &'a str,
    /// `text` with every echoed prompt line removed.
    pub cleaned: String,
}

impl<'a> ParseInput<'a> {
    pub fn new(raw_answer: &'a str, question: &'a str, prompt_text: &str) -> Self {
        let text = raw_answer.trim();
        Self {
            text,
            question,
            cleaned: strip_prompt(text, prompt_text),
        }
    }
}

/// Outcome of parsing one reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    /// The decision; `None` means unparseable.
    pub label: Option<BinaryLabel>,
    /// The prompt-stripped text the decision was made from, for tiers that
    /// work on it and for unparseable replies.
    pub residual_text: Option<String>,
    /// The tier that decided, if any.
    pub tier: Option<Tier>,
}

impl ParseResult {
    pub fn is_unparseable(&self) -> bool {
        self.label.is_none()
    }
}

/// Parse one raw model reply into a binary label.
///
/// Never fails: any input, including empty or non-text garbage, yields a
/// result, defaulting to unparseable.
pub fn parse(raw_answer: &str, question: &str, prompt_text: &str) -> ParseResult {
    let input = ParseInput::new(raw_answer, question, prompt_text);

    for tier in Tier::CASCADE {
        if let Some(label) = tier.decide(&input) {
            let residual_text = tier.reports_residual().then(|| input.cleaned.clone());
            return ParseResult {
                label: Some(label),
                residual_text,
                tier: Some(tier),
            };
        }
    }

    ParseResult {
        label: None,
        residual_text: Some(input.cleaned),
        tier: None,
    }
}

/// Characters that end a line of the prompt, including a lone `\r`, the
/// ASCII group separators and the Unicode line and paragraph separators.
const LINE_BREAKS: [char; 10] = [
    '\n', '\r', '\u{b}', '\u{c}', '\u{1c}', '\u{1d}', '\u{1e}', '\u{85}', '\u{2028}',
    '\u{2029}',
];

/// Remove every non-blank line of `prompt` (trimmed, verbatim) from `text`.
pub fn strip_prompt(text: &str, prompt: &str) -> String {
    let mut cleaned = text.to_string();
    for line in prompt.split(&LINE_BREAKS[..]) {
        let line = line.trim();
        if !line.is_empty() {
            cleaned = cleaned.replace(line, "");
        }
    }
    cleaned
}

fn token_label(token: &str) -> Option<BinaryLabel> {
    match token.to_lowercase().as_str() {
        "1" | "yes" => Some(BinaryLabel::Yes),
        "0" | "no" => Some(BinaryLabel::No),
        _ => None,
    }
}

/// No line break, at most one sentence terminator, under the length limit.
fn is_short_sentence(text: &str) -> bool {
    !text.contains('\n')
        && text.chars().filter(|c| matches!(c, '.' | '!' | '?')).count() <= 1
        && text.chars().count() < SHORT_SENTENCE_MAX_CHARS
}

//! Extraction of binary decisions from free-text model answers.
//!
//! - [`parser`]: the ordered heuristic cascade turning one reply into a label
//! - [`spatial`]: the direction-word fallback shared with anatomy scoring

pub mod parser;
pub mod spatial;

pub use parser::{ParseResult, Tier, parse, strip_prompt};
pub use spatial::infer_spatial_relation;

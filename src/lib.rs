pub mod align;
pub mod cli;
pub mod config;
pub mod confusion;
pub mod corrector;
pub mod error;
pub mod merge;
pub mod normalize;
pub mod reconcile;

pub use config::Config;
pub use confusion::ConfusionDictionary;
pub use corrector::registry::CorrectorRegistry;
pub use error::CorrectError;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a single correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Typo,
    Semantic,
    Grammar,
    Punctuation,
    Redundant,
    Missing,
    Unknown,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::Typo => "typo",
            ErrorCategory::Semantic => "semantic",
            ErrorCategory::Grammar => "grammar",
            ErrorCategory::Punctuation => "punctuation",
            ErrorCategory::Redundant => "redundant",
            ErrorCategory::Missing => "missing",
            ErrorCategory::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// One correction, anchored at a zero-based character offset into the source
/// text. For a non-empty `original`, the source characters at
/// `position..position + original.chars().count()` are exactly `original`.
/// Semantic findings carry an empty `corrected`: the model flags the span
/// without prescribing a fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub original: String,
    pub corrected: String,
    pub position: usize,
    pub category: ErrorCategory,
    pub explanation: String,
}

impl ErrorRecord {
    /// Whether `position` actually anchors `original` inside `source`.
    /// Vacuously true for an empty `original`.
    pub fn position_valid(&self, source: &str) -> bool {
        if self.original.is_empty() {
            return true;
        }
        char_slice(source, self.position, self.original.chars().count())
            .is_some_and(|slice| slice == self.original)
    }
}

/// Correction outcome for one text: the original, the corrected text, and
/// the errors sorted ascending by position. Records may share a position
/// only when their `(original, corrected)` pairs differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionResult {
    pub source: String,
    pub target: String,
    pub errors: Vec<ErrorRecord>,
}

impl CorrectionResult {
    /// A result reporting no errors: target is the source unchanged.
    pub fn unchanged(source: &str) -> Self {
        Self {
            source: source.to_string(),
            target: source.to_string(),
            errors: Vec::new(),
        }
    }
}

/// Slice a string by character offsets. Returns `None` when the range runs
/// past the end of the text.
pub(crate) fn char_slice(text: &str, start: usize, len: usize) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    if start + len > chars.len() {
        return None;
    }
    Some(chars[start..start + len].iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_roundtrip() {
        let json = serde_json::to_string(&ErrorCategory::Redundant).unwrap();
        assert_eq!(json, "\"redundant\"");
        let back: ErrorCategory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ErrorCategory::Redundant);
    }

    #[test]
    fn test_char_slice_multibyte() {
        assert_eq!(char_slice("今天心情很好", 2, 2).unwrap(), "心情");
        assert!(char_slice("好", 1, 1).is_none());
    }
}

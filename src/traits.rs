/// Shared record types and the dataset loading seam
///
/// Training code only ever sees `CanonicalRecord`s; where they come from
/// (a directory of CSV exports, an in-memory fixture) is hidden behind
/// `DatasetLoader` so the pipeline can be exercised without touching disk.
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Labels
// ============================================================================

/// Binary class of an email. The discriminant is the class index used by the
/// classifier and in probability arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Legitimate = 0,
    Phishing = 1,
}

impl Label {
    pub const ALL: [Label; 2] = [Label::Legitimate, Label::Phishing];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Label::Legitimate),
            1 => Some(Label::Phishing),
            _ => None,
        }
    }

    /// Parse a label cell from a source dataset.
    ///
    /// Accepts numeric encodings (`0`, `1`, `0.0`, `1.0`), booleans and the
    /// common textual class names. Anything else is treated as missing.
    pub fn parse(raw: &str) -> Option<Self> {
        let value = raw.trim().to_lowercase();
        match value.as_str() {
            "1" | "1.0" | "true" | "phishing" | "spam" => Some(Label::Phishing),
            "0" | "0.0" | "false" | "legitimate" | "ham" | "safe" => Some(Label::Legitimate),
            _ => None,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Legitimate => write!(f, "Legitimate"),
            Label::Phishing => write!(f, "Phishing"),
        }
    }
}

// ============================================================================
// Dataset Loader Trait
// ============================================================================

/// One normalized training row
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    pub text: String,
    pub label: Label,
}

impl CanonicalRecord {
    pub fn new(text: impl Into<String>, label: Label) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }
}

/// Trait for producing the merged training corpus
///
/// Implementations can load from:
/// - A directory of heterogeneous CSV exports
/// - In-memory test data
pub trait DatasetLoader: Send + Sync {
    /// Load every usable record, in a stable order.
    ///
    /// Returns `DetectorError::Configuration` when nothing usable was found.
    fn load_records(&self) -> Result<Vec<CanonicalRecord>>;

    /// Get the dataset name (for reporting)
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_parse() {
        assert_eq!(Label::parse("1"), Some(Label::Phishing));
        assert_eq!(Label::parse(" 0 "), Some(Label::Legitimate));
        assert_eq!(Label::parse("1.0"), Some(Label::Phishing));
        assert_eq!(Label::parse("Spam"), Some(Label::Phishing));
        assert_eq!(Label::parse("ham"), Some(Label::Legitimate));
        assert_eq!(Label::parse(""), None);
        assert_eq!(Label::parse("2"), None);
        assert_eq!(Label::parse("maybe"), None);
    }

    #[test]
    fn test_label_index_round_trip() {
        for label in Label::ALL {
            assert_eq!(Label::from_index(label.index()), Some(label));
        }
        assert_eq!(Label::from_index(2), None);
    }
}

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── OPTION LABELS ─────────────────────────────────────────────────────────────
//

/// Label of an answer option slot, `A` through `F`.
///
/// A question exposes between two and six options; the label order matches the
/// order of the option texts.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum OptionLabel {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl OptionLabel {
    /// All labels in slot order.
    pub const ALL: [OptionLabel; 6] = [
        OptionLabel::A,
        OptionLabel::B,
        OptionLabel::C,
        OptionLabel::D,
        OptionLabel::E,
        OptionLabel::F,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OptionLabel::A => "A",
            OptionLabel::B => "B",
            OptionLabel::C => "C",
            OptionLabel::D => "D",
            OptionLabel::E => "E",
            OptionLabel::F => "F",
        }
    }

    /// Zero-based slot index of this label.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            OptionLabel::A => 0,
            OptionLabel::B => 1,
            OptionLabel::C => 2,
            OptionLabel::D => 3,
            OptionLabel::E => 4,
            OptionLabel::F => 5,
        }
    }

    /// Label for a zero-based slot index, if it is within `A..=F`.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for parsing an `OptionLabel` from a string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid option label: {raw}")]
pub struct ParseLabelError {
    pub raw: String,
}

impl FromStr for OptionLabel {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(OptionLabel::A),
            "B" => Ok(OptionLabel::B),
            "C" => Ok(OptionLabel::C),
            "D" => Ok(OptionLabel::D),
            "E" => Ok(OptionLabel::E),
            "F" => Ok(OptionLabel::F),
            _ => Err(ParseLabelError { raw: s.to_string() }),
        }
    }
}

//
// ─── ANSWER KEYS ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnswerKeyError {
    #[error("answer key cannot be empty")]
    Empty,

    #[error(transparent)]
    InvalidLabel(#[from] ParseLabelError),

    #[error("answer key repeats label {label}")]
    DuplicateLabel { label: OptionLabel },
}

/// Canonical correct answer for a question.
///
/// Stored as a single label (`"C"`) or a comma-separated label set (`"B,D"`).
/// A question whose key is `Multiple` requires an explicit submit step;
/// a `Single` key finalizes on first selection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerKey {
    Single(OptionLabel),
    Multiple(BTreeSet<OptionLabel>),
}

impl AnswerKey {
    /// Parse the storage form of a key.
    ///
    /// Whitespace around labels is tolerated. A comma-set containing exactly
    /// one label normalizes to `Single`.
    ///
    /// # Errors
    ///
    /// Returns `AnswerKeyError::Empty` for a blank key,
    /// `AnswerKeyError::InvalidLabel` for an unknown label, and
    /// `AnswerKeyError::DuplicateLabel` when a label repeats.
    pub fn parse(raw: &str) -> Result<Self, AnswerKeyError> {
        let mut labels = BTreeSet::new();
        let mut count = 0usize;
        for part in raw.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let label: OptionLabel = part.parse()?;
            if !labels.insert(label) {
                return Err(AnswerKeyError::DuplicateLabel { label });
            }
            count += 1;
        }

        match count {
            0 => Err(AnswerKeyError::Empty),
            1 => {
                let label = labels
                    .into_iter()
                    .next()
                    .expect("one label was just inserted");
                Ok(AnswerKey::Single(label))
            }
            _ => Ok(AnswerKey::Multiple(labels)),
        }
    }

    /// True when this key requires multiple selections.
    #[must_use]
    pub fn is_multi(&self) -> bool {
        matches!(self, AnswerKey::Multiple(_))
    }

    /// The canonical label set.
    #[must_use]
    pub fn labels(&self) -> BTreeSet<OptionLabel> {
        match self {
            AnswerKey::Single(label) => BTreeSet::from([*label]),
            AnswerKey::Multiple(set) => set.clone(),
        }
    }

    /// True when `label` is part of the canonical set.
    #[must_use]
    pub fn contains(&self, label: OptionLabel) -> bool {
        match self {
            AnswerKey::Single(key) => *key == label,
            AnswerKey::Multiple(set) => set.contains(&label),
        }
    }

    /// The highest label named by the key. Used to check keys against the
    /// number of options a question actually has.
    #[must_use]
    pub fn max_label(&self) -> OptionLabel {
        match self {
            AnswerKey::Single(label) => *label,
            AnswerKey::Multiple(set) => *set
                .iter()
                .next_back()
                .expect("a multiple key holds at least two labels"),
        }
    }

    /// Evaluate a submitted label set against this key.
    ///
    /// Correctness is order-insensitive exact set equality: a proper subset,
    /// superset, or disjoint set is incorrect.
    #[must_use]
    pub fn matches(&self, selected: &BTreeSet<OptionLabel>) -> bool {
        match self {
            AnswerKey::Single(label) => selected.len() == 1 && selected.contains(label),
            AnswerKey::Multiple(set) => selected == set,
        }
    }
}

impl fmt::Display for AnswerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerKey::Single(label) => f.write_str(label.as_str()),
            AnswerKey::Multiple(set) => {
                let mut first = true;
                for label in set {
                    if !first {
                        f.write_str(",")?;
                    }
                    f.write_str(label.as_str())?;
                    first = false;
                }
                Ok(())
            }
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

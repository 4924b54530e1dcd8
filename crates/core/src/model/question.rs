use thiserror::Error;
use url::Url;

use crate::model::answer::{AnswerKey, AnswerKeyError, OptionLabel};
use crate::model::ids::QuestionId;

/// Minimum number of options a question may expose.
pub const MIN_OPTIONS: usize = 2;
/// Maximum number of options a question may expose (labels `A..=F`).
pub const MAX_OPTIONS: usize = 6;

//
// ─── QUESTION KINDS ────────────────────────────────────────────────────────────
//

/// Presentation kind of a question.
///
/// All kinds are answered by label selection; `Simulation` and `DragDrop`
/// carry extra display metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuestionKind {
    MultipleChoice,
    TrueFalse,
    Simulation,
    DragDrop,
}

impl QuestionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice => "multiple-choice",
            QuestionKind::TrueFalse => "true-false",
            QuestionKind::Simulation => "simulation",
            QuestionKind::DragDrop => "drag-drop",
        }
    }
}

/// Error type for parsing a `QuestionKind` from its storage form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid question kind: {raw}")]
pub struct ParseKindError {
    pub raw: String,
}

impl std::str::FromStr for QuestionKind {
    type Err = ParseKindError;

    // Must stay consistent with `as_str`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "multiple-choice" => Ok(QuestionKind::MultipleChoice),
            "true-false" => Ok(QuestionKind::TrueFalse),
            "simulation" => Ok(QuestionKind::Simulation),
            "drag-drop" => Ok(QuestionKind::DragDrop),
            _ => Err(ParseKindError { raw: s.to_string() }),
        }
    }
}

/// Display metadata for a simulation question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationMeta {
    pub instructions: String,
    pub assets: Vec<Url>,
}

//
// ─── QUESTION TYPES ────────────────────────────────────────────────────────────
//

/// Unvalidated question data as it arrives from storage or a remote bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub number: u32,
    pub text: String,
    pub options: Vec<String>,
    pub key: String,
    pub explanation: String,
    pub kind: QuestionKind,
    pub image: Option<String>,
    pub simulation: Option<SimulationDraft>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationDraft {
    pub instructions: String,
    pub assets: Vec<String>,
}

impl QuestionDraft {
    /// Plain multiple-choice draft, the common case for seeds and tests.
    #[must_use]
    pub fn multiple_choice(
        number: u32,
        text: impl Into<String>,
        options: Vec<String>,
        key: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            number,
            text: text.into(),
            options,
            key: key.into(),
            explanation: explanation.into(),
            kind: QuestionKind::MultipleChoice,
            image: None,
            simulation: None,
        }
    }

    /// Validate the draft into a [`ValidatedQuestion`].
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the prompt is blank, the option count is
    /// outside `2..=6`, the answer key fails to parse or names a label beyond
    /// the last option, or an image/asset URL is malformed.
    pub fn validate(self) -> Result<ValidatedQuestion, QuestionError> {
        if self.number == 0 {
            return Err(QuestionError::InvalidNumber);
        }
        if self.text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if self.options.len() < MIN_OPTIONS || self.options.len() > MAX_OPTIONS {
            return Err(QuestionError::OptionCount {
                count: self.options.len(),
            });
        }
        for (index, option) in self.options.iter().enumerate() {
            if option.trim().is_empty() {
                let label = OptionLabel::from_index(index)
                    .expect("option index was checked against MAX_OPTIONS");
                return Err(QuestionError::EmptyOption { label });
            }
        }

        let key = AnswerKey::parse(&self.key)?;
        let max = key.max_label();
        if max.index() >= self.options.len() {
            return Err(QuestionError::KeyOutOfRange {
                label: max,
                options: self.options.len(),
            });
        }

        let image = self
            .image
            .map(|raw| Url::parse(&raw).map_err(|_| QuestionError::InvalidImageUrl { raw }))
            .transpose()?;

        let simulation = self
            .simulation
            .map(|draft| {
                let assets = draft
                    .assets
                    .into_iter()
                    .map(|raw| {
                        Url::parse(&raw).map_err(|_| QuestionError::InvalidAssetUrl { raw })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok::<_, QuestionError>(SimulationMeta {
                    instructions: draft.instructions,
                    assets,
                })
            })
            .transpose()?;

        Ok(ValidatedQuestion {
            number: self.number,
            text: self.text,
            options: self.options,
            key,
            explanation: self.explanation,
            kind: self.kind,
            image,
            simulation,
        })
    }
}

/// A validated question that has not yet been assigned a storage identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuestion {
    number: u32,
    text: String,
    options: Vec<String>,
    key: AnswerKey,
    explanation: String,
    kind: QuestionKind,
    image: Option<Url>,
    simulation: Option<SimulationMeta>,
}

impl ValidatedQuestion {
    #[must_use]
    pub fn assign_id(self, id: QuestionId) -> Question {
        Question {
            id,
            number: self.number,
            text: self.text,
            options: self.options,
            key: self.key,
            explanation: self.explanation,
            kind: self.kind,
            image: self.image,
            simulation: self.simulation,
        }
    }
}

/// An exam question. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    number: u32,
    text: String,
    options: Vec<String>,
    key: AnswerKey,
    explanation: String,
    kind: QuestionKind,
    image: Option<Url>,
    simulation: Option<SimulationMeta>,
}

impl Question {
    /// Rehydrate a question from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the persisted fields fail validation.
    pub fn from_persisted(id: QuestionId, draft: QuestionDraft) -> Result<Self, QuestionError> {
        Ok(draft.validate()?.assign_id(id))
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    /// 1-based ordinal of this question within the bank.
    #[must_use]
    pub fn number(&self) -> u32 {
        self.number
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Option text for a label, if the question has that slot.
    #[must_use]
    pub fn option_text(&self, label: OptionLabel) -> Option<&str> {
        self.options.get(label.index()).map(String::as_str)
    }

    /// Options paired with their labels, in slot order.
    pub fn labelled_options(&self) -> impl Iterator<Item = (OptionLabel, &str)> {
        self.options
            .iter()
            .enumerate()
            .map(|(index, text)| {
                let label = OptionLabel::from_index(index)
                    .expect("validated questions never exceed MAX_OPTIONS");
                (label, text.as_str())
            })
    }

    #[must_use]
    pub fn key(&self) -> &AnswerKey {
        &self.key
    }

    /// True when answering requires accumulating labels and submitting.
    #[must_use]
    pub fn is_multi_answer(&self) -> bool {
        self.key.is_multi()
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    #[must_use]
    pub fn image(&self) -> Option<&Url> {
        self.image.as_ref()
    }

    #[must_use]
    pub fn simulation(&self) -> Option<&SimulationMeta> {
        self.simulation.as_ref()
    }
}

//
// ─── QUESTION VALIDATION ERRORS ────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question number must be >= 1")]
    InvalidNumber,

    #[error("question text cannot be empty")]
    EmptyText,

    #[error("question must have between {MIN_OPTIONS} and {MAX_OPTIONS} options, got {count}")]
    OptionCount { count: usize },

    #[error("option {label} cannot be empty")]
    EmptyOption { label: OptionLabel },

    #[error(transparent)]
    Key(#[from] AnswerKeyError),

    #[error("answer key names label {label} but the question has {options} options")]
    KeyOutOfRange { label: OptionLabel, options: usize },

    #[error("invalid image URL: {raw}")]
    InvalidImageUrl { raw: String },

    #[error("invalid simulation asset URL: {raw}")]
    InvalidAssetUrl { raw: String },
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

use async_trait::async_trait;
use exam_core::model::{
    Question, QuestionDraft, QuestionId, QuestionKind, SimulationDraft,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape for a question.
///
/// This mirrors the question-bank table (fixed `option_a..option_f` columns)
/// so repositories can serialize/deserialize without leaking storage concerns
/// into the domain layer.
#[derive(Debug, Clone)]
pub struct QuestionRecord {
    pub id: QuestionId,
    pub number: u32,
    pub text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: Option<String>,
    pub option_d: Option<String>,
    pub option_e: Option<String>,
    pub option_f: Option<String>,
    pub correct_answer: String,
    pub explanation: String,
    pub kind: QuestionKind,
    pub image_url: Option<String>,
    pub simulation_instructions: Option<String>,
    pub simulation_assets: Vec<String>,
}

impl QuestionRecord {
    #[must_use]
    pub fn from_question(question: &Question) -> Self {
        let mut slots = question.options().iter().cloned();
        let option_a = slots.next().unwrap_or_default();
        let option_b = slots.next().unwrap_or_default();

        Self {
            id: question.id(),
            number: question.number(),
            text: question.text().to_owned(),
            option_a,
            option_b,
            option_c: slots.next(),
            option_d: slots.next(),
            option_e: slots.next(),
            option_f: slots.next(),
            correct_answer: question.key().to_string(),
            explanation: question.explanation().to_owned(),
            kind: question.kind(),
            image_url: question.image().map(ToString::to_string),
            simulation_instructions: question
                .simulation()
                .map(|sim| sim.instructions.clone()),
            simulation_assets: question
                .simulation()
                .map(|sim| sim.assets.iter().map(ToString::to_string).collect())
                .unwrap_or_default(),
        }
    }

    /// Convert the record back into a domain `Question`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` when option columns are
    /// non-contiguous or the persisted fields fail domain validation.
    pub fn into_question(self) -> Result<Question, StorageError> {
        let mut options = vec![self.option_a, self.option_b];
        let tail = [self.option_c, self.option_d, self.option_e, self.option_f];
        let mut ended = false;
        for slot in tail {
            match slot {
                Some(text) if !ended => options.push(text),
                Some(_) => {
                    return Err(StorageError::Serialization(
                        "non-contiguous option columns".into(),
                    ));
                }
                None => ended = true,
            }
        }

        let simulation = self.simulation_instructions.map(|instructions| SimulationDraft {
            instructions,
            assets: self.simulation_assets,
        });

        let draft = QuestionDraft {
            number: self.number,
            text: self.text,
            options,
            key: self.correct_answer,
            explanation: self.explanation,
            kind: self.kind,
            image: self.image_url,
            simulation,
        };

        Question::from_persisted(self.id, draft)
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

/// Repository contract for the question bank.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Persist or update a question.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the question cannot be stored.
    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError>;

    /// Fetch the whole bank, ordered by question number.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    async fn list_questions(&self) -> Result<Vec<Question>, StorageError>;

    /// Number of questions in the bank.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    async fn count_questions(&self) -> Result<u32, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    // Keyed by question number so listing is ordered for free.
    questions: Arc<Mutex<BTreeMap<u32, Question>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            questions: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError> {
        let mut guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(question.number(), question.clone());
        Ok(())
    }

    async fn list_questions(&self) -> Result<Vec<Question>, StorageError> {
        let guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.values().cloned().collect())
    }

    async fn count_questions(&self) -> Result<u32, StorageError> {
        let guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        u32::try_from(guard.len())
            .map_err(|_| StorageError::Serialization("question count overflow".into()))
    }
}

/// Aggregates the question repository behind a trait object for easy backend
/// swapping.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let questions: Arc<dyn QuestionRepository> = Arc::new(repo);
        Self { questions }
    }
}

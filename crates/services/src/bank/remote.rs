use serde::Deserialize;

use exam_core::model::{Question, QuestionDraft, QuestionId, QuestionKind, SimulationDraft};
use storage::repository::QuestionRepository;

use crate::error::{BankFetchError, BankSyncError};

/// Wire shape of a question row as served by the bank endpoint.
///
/// Mirrors the question-bank table: fixed option columns `a..f`, a label-form
/// `correct_answer`, and optional simulation metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteQuestionRow {
    pub id: u64,
    pub question_number: u32,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    #[serde(default)]
    pub option_c: Option<String>,
    #[serde(default)]
    pub option_d: Option<String>,
    #[serde(default)]
    pub option_e: Option<String>,
    #[serde(default)]
    pub option_f: Option<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default = "default_kind")]
    pub question_kind: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub simulation_instructions: Option<String>,
    #[serde(default)]
    pub simulation_assets: Vec<String>,
}

fn default_kind() -> String {
    QuestionKind::MultipleChoice.as_str().to_string()
}

fn row_into_question(row: RemoteQuestionRow) -> Result<Question, BankFetchError> {
    let number = row.question_number;
    let invalid = |message: String| BankFetchError::InvalidRecord { number, message };

    let kind: QuestionKind = row
        .question_kind
        .parse()
        .map_err(|e: exam_core::model::ParseKindError| invalid(e.to_string()))?;

    let mut options = vec![row.option_a, row.option_b];
    for slot in [row.option_c, row.option_d, row.option_e, row.option_f] {
        match slot {
            Some(text) => options.push(text),
            None => break,
        }
    }

    let simulation = row
        .simulation_instructions
        .map(|instructions| SimulationDraft {
            instructions,
            assets: row.simulation_assets,
        });

    let draft = QuestionDraft {
        number,
        text: row.question_text,
        options,
        key: row.correct_answer,
        explanation: row.explanation,
        kind,
        image: row.image_url,
        simulation,
    };

    Question::from_persisted(QuestionId::new(row.id), draft)
        .map_err(|e| invalid(e.to_string()))
}

/// Client for a remote question-bank endpoint.
///
/// Performs the single ordered read of question records the application needs
/// at import time. The fetch is one-shot and non-cancellable; callers treat a
/// failure as an empty bank and offer a retry.
#[derive(Clone)]
pub struct RemoteBank {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteBank {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn questions_url(&self) -> String {
        format!(
            "{}/questions?order=question_number",
            self.base_url.trim_end_matches('/')
        )
    }

    /// Fetch the remote bank, ordered by question number.
    ///
    /// # Errors
    ///
    /// Returns `BankFetchError` for transport failures, non-success statuses,
    /// and rows that fail domain validation.
    pub async fn fetch_questions(&self) -> Result<Vec<Question>, BankFetchError> {
        let response = self.client.get(self.questions_url()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BankFetchError::HttpStatus(status));
        }

        let rows: Vec<RemoteQuestionRow> = response.json().await?;
        let mut questions = rows
            .into_iter()
            .map(row_into_question)
            .collect::<Result<Vec<_>, _>>()?;
        // The endpoint promises ordering; enforce it anyway so downstream
        // partitioning never sees an unordered bank.
        questions.sort_by_key(Question::number);
        Ok(questions)
    }

    /// Fetch, swallowing failures into an empty bank with a logged diagnostic.
    pub async fn fetch_or_empty(&self) -> Vec<Question> {
        match self.fetch_questions().await {
            Ok(questions) => questions,
            Err(err) => {
                tracing::warn!(error = %err, "remote question fetch failed; returning empty bank");
                Vec::new()
            }
        }
    }

    /// Import the remote bank into a local repository.
    ///
    /// Returns the number of questions written.
    ///
    /// # Errors
    ///
    /// Returns `BankSyncError` when the fetch or a repository write fails.
    pub async fn sync_into(
        &self,
        repo: &dyn QuestionRepository,
    ) -> Result<u32, BankSyncError> {
        let questions = self.fetch_questions().await?;
        for question in &questions {
            repo.upsert_question(question).await?;
        }
        Ok(u32::try_from(questions.len()).unwrap_or(u32::MAX))
    }
}

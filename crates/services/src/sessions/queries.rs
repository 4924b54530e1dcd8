use chrono::{DateTime, Utc};

use exam_core::model::Question;
use storage::repository::QuestionRepository;

use super::plan::ExamPlan;
use super::service::ExamSession;
use crate::error::SessionError;

/// Storage-backed session queries and builders.
pub(crate) struct SessionQueries;

impl SessionQueries {
    /// Load the full bank, ordered by question number.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` when repository access fails.
    pub async fn load_bank(
        questions: &dyn QuestionRepository,
    ) -> Result<Vec<Question>, SessionError> {
        Ok(questions.list_questions().await?)
    }

    /// Build the partition plan for the current bank without loading rows.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` when repository access fails.
    pub async fn plan_from_storage(
        questions: &dyn QuestionRepository,
    ) -> Result<ExamPlan, SessionError> {
        let total = questions.count_questions().await?;
        Ok(ExamPlan::new(total))
    }

    /// Create a session for one test block directly from storage-backed data.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownTest` when `test_number` is outside the
    /// plan, `SessionError::Empty` for an empty block, or
    /// `SessionError::Storage` on repository failures.
    pub async fn start_from_storage(
        questions: &dyn QuestionRepository,
        test_number: u32,
        now: DateTime<Utc>,
    ) -> Result<(ExamPlan, ExamSession), SessionError> {
        let bank = Self::load_bank(questions).await?;
        let total = u32::try_from(bank.len())
            .map_err(|_| SessionError::Storage(
                storage::repository::StorageError::Serialization(
                    "question count overflow".into(),
                ),
            ))?;
        let plan = ExamPlan::new(total);
        let range = plan
            .index_range(test_number)
            .ok_or(SessionError::UnknownTest { test_number, total })?;
        let block = bank[range].to_vec();
        let session = ExamSession::new(test_number, block, now)?;
        Ok((plan, session))
    }
}

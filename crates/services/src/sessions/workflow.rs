use std::sync::Arc;

use exam_core::model::TestReport;
use storage::repository::QuestionRepository;

use super::plan::ExamPlan;
use super::queries::SessionQueries;
use super::service::ExamSession;
use crate::Clock;
use crate::error::SessionError;

/// Orchestrates question-bank loads and session starts for the UI.
#[derive(Clone)]
pub struct ExamLoopService {
    clock: Clock,
    questions: Arc<dyn QuestionRepository>,
}

impl ExamLoopService {
    #[must_use]
    pub fn new(clock: Clock, questions: Arc<dyn QuestionRepository>) -> Self {
        Self { clock, questions }
    }

    /// Partition outline of the current bank, for the test selector.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` when the bank cannot be read. The
    /// failure is logged here; the caller surfaces a retry affordance.
    pub async fn outline(&self) -> Result<ExamPlan, SessionError> {
        match SessionQueries::plan_from_storage(self.questions.as_ref()).await {
            Ok(plan) => Ok(plan),
            Err(err) => {
                tracing::warn!(error = %err, "failed to load the question bank");
                Err(err)
            }
        }
    }

    /// Start a session for the given test block.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` for storage failures, an unknown test number,
    /// or an empty block.
    pub async fn start_test(&self, test_number: u32) -> Result<ExamSession, SessionError> {
        let now = self.clock.now();
        match SessionQueries::start_from_storage(self.questions.as_ref(), test_number, now).await
        {
            Ok((_plan, session)) => Ok(session),
            Err(err) => {
                if matches!(err, SessionError::Storage(_)) {
                    tracing::warn!(error = %err, test_number, "failed to start test session");
                }
                Err(err)
            }
        }
    }

    /// Reset a session to its initial state, restarting the timer baseline.
    pub fn restart(&self, session: &mut ExamSession) {
        session.reset(self.clock.now());
    }

    /// Build the aggregate report for a session as of now.
    ///
    /// # Errors
    ///
    /// Propagates `SessionError::Report` when the derived counts are
    /// inconsistent.
    pub fn report(&self, session: &ExamSession) -> Result<TestReport, SessionError> {
        session.report(self.clock.now())
    }
}

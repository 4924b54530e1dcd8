use exam_core::model::{OptionLabel, Question, TestReport};
use services::{ExamLoopService, ExamSession, MissedAnswer, SessionProgress};

use crate::views::ViewError;

/// User actions on an exam session, dispatched through a single callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExamIntent {
    Select(OptionLabel),
    Submit,
    Next,
    Prev,
    JumpTo(usize),
    ToggleBookmark,
    Reset,
    Tick,
}

/// Render state of one option row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionState {
    /// Nothing selected yet.
    Idle,
    /// Toggled on in a pending multi-answer selection.
    Selected,
    /// Answer finalized and this option is part of the canonical key.
    Correct,
    /// Answer finalized; this option was selected but is not in the key.
    Incorrect,
    /// Answer finalized; not selected and not part of the key.
    Dimmed,
}

/// View model over an [`ExamSession`].
///
/// All intents resolve synchronously; the session lives entirely in memory.
pub struct ExamVm {
    session: ExamSession,
}

impl ExamVm {
    #[must_use]
    pub fn new(session: ExamSession) -> Self {
        Self { session }
    }

    /// Apply a user intent to the session.
    pub fn apply(&mut self, intent: ExamIntent, exam_loop: &ExamLoopService) {
        match intent {
            ExamIntent::Select(label) => {
                let _ = self.session.select(label);
            }
            ExamIntent::Submit => {
                let _ = self.session.submit();
            }
            ExamIntent::Next => self.session.next(),
            ExamIntent::Prev => self.session.prev(),
            ExamIntent::JumpTo(index) => self.session.jump_to(index),
            ExamIntent::ToggleBookmark => {
                let _ = self.session.toggle_bookmark();
            }
            ExamIntent::Reset => exam_loop.restart(&mut self.session),
            ExamIntent::Tick => self.session.tick(),
        }
    }

    #[must_use]
    pub fn session(&self) -> &ExamSession {
        &self.session
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        self.session.current()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.session.current_index()
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.session.total_questions()
    }

    /// The explanation is revealed as soon as the current answer finalizes.
    #[must_use]
    pub fn show_explanation(&self) -> bool {
        self.session.is_answered(self.session.current().id())
    }

    /// Whether the current (finalized) answer was correct.
    #[must_use]
    pub fn current_correct(&self) -> Option<bool> {
        self.session.is_correct(self.session.current().id())
    }

    #[must_use]
    pub fn current_bookmarked(&self) -> bool {
        self.session.is_bookmarked(self.session.current().id())
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.session.pending().len()
    }

    /// Render state for an option row of the current question.
    #[must_use]
    pub fn option_state(&self, label: OptionLabel) -> OptionState {
        let question = self.session.current();
        match self.session.answer_for(question.id()) {
            Some(record) => {
                if question.key().contains(label) {
                    OptionState::Correct
                } else if record.selected().contains(&label) {
                    OptionState::Incorrect
                } else {
                    OptionState::Dimmed
                }
            }
            None => {
                if self.session.pending().contains(&label) {
                    OptionState::Selected
                } else {
                    OptionState::Idle
                }
            }
        }
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        self.session.progress()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.session.is_complete()
    }

    #[must_use]
    pub fn missed(&self) -> Vec<MissedAnswer> {
        self.session.missed()
    }

    #[must_use]
    pub fn elapsed_secs(&self) -> u64 {
        self.session.elapsed_secs()
    }

    /// Percentage of the session walked through, for the progress bar.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn walked_pct(&self) -> f64 {
        let total = self.session.total_questions();
        if total == 0 {
            return 0.0;
        }
        (self.session.current_index() + 1) as f64 * 100.0 / total as f64
    }

    /// Final report for the completion banner.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::Unknown` if the derived counts are inconsistent.
    pub fn report(&self, exam_loop: &ExamLoopService) -> Result<TestReport, ViewError> {
        exam_loop.report(&self.session).map_err(|_| ViewError::Unknown)
    }
}

/// Start a session for one test block.
///
/// # Errors
///
/// Returns `ViewError::EmptyBank` when the block has no questions and
/// `ViewError::Unknown` for other failures.
pub async fn start_exam(
    exam_loop: &ExamLoopService,
    test_number: u32,
) -> Result<ExamVm, ViewError> {
    let session = match exam_loop.start_test(test_number).await {
        Ok(session) => session,
        Err(services::SessionError::Empty | services::SessionError::UnknownTest { .. }) => {
            return Err(ViewError::EmptyBank);
        }
        Err(_) => return Err(ViewError::Unknown),
    };

    Ok(ExamVm::new(session))
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::{QuestionDraft, QuestionId};
    use exam_core::time::fixed_now;
    use services::Clock;
    use std::sync::Arc;
    use storage::repository::InMemoryRepository;

    fn build_question(number: u32, key: &str) -> Question {
        let draft = QuestionDraft::multiple_choice(
            number,
            format!("Question {number}?"),
            vec![
                "First".to_string(),
                "Second".to_string(),
                "Third".to_string(),
                "Fourth".to_string(),
            ],
            key,
            "Because.",
        );
        Question::from_persisted(QuestionId::new(u64::from(number)), draft).unwrap()
    }

    fn build_vm(keys: &[&str]) -> (ExamVm, ExamLoopService) {
        let questions: Vec<Question> = keys
            .iter()
            .enumerate()
            .map(|(i, key)| build_question(u32::try_from(i).unwrap() + 1, key))
            .collect();
        let session = ExamSession::new(1, questions, fixed_now()).unwrap();
        let exam_loop = ExamLoopService::new(
            Clock::fixed(fixed_now()),
            Arc::new(InMemoryRepository::new()),
        );
        (ExamVm::new(session), exam_loop)
    }

    #[test]
    fn select_intent_reveals_explanation() {
        let (mut vm, exam_loop) = build_vm(&["B"]);
        assert!(!vm.show_explanation());

        vm.apply(ExamIntent::Select(OptionLabel::B), &exam_loop);
        assert!(vm.show_explanation());
        assert_eq!(vm.current_correct(), Some(true));
    }

    #[test]
    fn option_states_reflect_the_finalized_answer() {
        let (mut vm, exam_loop) = build_vm(&["B"]);
        vm.apply(ExamIntent::Select(OptionLabel::C), &exam_loop);

        assert_eq!(vm.option_state(OptionLabel::B), OptionState::Correct);
        assert_eq!(vm.option_state(OptionLabel::C), OptionState::Incorrect);
        assert_eq!(vm.option_state(OptionLabel::A), OptionState::Dimmed);
    }

    #[test]
    fn pending_selection_marks_options_selected() {
        let (mut vm, exam_loop) = build_vm(&["B,D"]);
        vm.apply(ExamIntent::Select(OptionLabel::B), &exam_loop);

        assert_eq!(vm.option_state(OptionLabel::B), OptionState::Selected);
        assert_eq!(vm.option_state(OptionLabel::D), OptionState::Idle);
        assert_eq!(vm.pending_count(), 1);
        assert!(!vm.show_explanation());

        vm.apply(ExamIntent::Select(OptionLabel::D), &exam_loop);
        vm.apply(ExamIntent::Submit, &exam_loop);
        assert!(vm.show_explanation());
        assert_eq!(vm.current_correct(), Some(true));
    }

    #[test]
    fn navigation_and_reset_intents_drive_the_session() {
        let (mut vm, exam_loop) = build_vm(&["A", "B", "C"]);

        vm.apply(ExamIntent::Next, &exam_loop);
        assert_eq!(vm.current_index(), 1);
        vm.apply(ExamIntent::JumpTo(2), &exam_loop);
        assert_eq!(vm.current_index(), 2);
        vm.apply(ExamIntent::Prev, &exam_loop);
        assert_eq!(vm.current_index(), 1);

        vm.apply(ExamIntent::ToggleBookmark, &exam_loop);
        assert!(vm.current_bookmarked());

        vm.apply(ExamIntent::Tick, &exam_loop);
        assert_eq!(vm.elapsed_secs(), 1);

        vm.apply(ExamIntent::Reset, &exam_loop);
        assert_eq!(vm.current_index(), 0);
        assert_eq!(vm.elapsed_secs(), 0);
        assert!(!vm.current_bookmarked());
    }
}

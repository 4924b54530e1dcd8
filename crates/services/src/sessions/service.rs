use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use exam_core::model::{OptionLabel, Question, QuestionId, TestReport};

use super::progress::{MissedAnswer, SessionProgress};
use crate::error::SessionError;

//
// ─── ANSWER RECORDS ────────────────────────────────────────────────────────────
//

/// A finalized answer: the submitted labels only.
///
/// Correctness is recomputed from the question's canonical key whenever it is
/// needed; it is never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    selected: BTreeSet<OptionLabel>,
}

impl AnswerRecord {
    #[must_use]
    pub fn selected(&self) -> &BTreeSet<OptionLabel> {
        &self.selected
    }
}

/// Outcome of a selection or submission on the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// The answer is finalized; correctness is reported for immediate feedback.
    Answered { correct: bool },
    /// A multi-answer label was toggled; submission is still pending.
    Pending { selected: usize },
    /// The action had no effect: the question is already answered, the label
    /// has no option slot, or an empty multi-answer submission was attempted.
    Ignored,
}

//
// ─── EXAM SESSION ──────────────────────────────────────────────────────────────
//

/// In-memory session over one test block of the question bank.
///
/// Holds the current position, finalized answers, the pending multi-answer
/// selection, bookmarks, and elapsed time. Every mutation is a total function:
/// navigation clamps to bounds and answering a finalized question is an
/// idempotent no-op.
pub struct ExamSession {
    test_number: u32,
    questions: Vec<Question>,
    current: usize,
    answers: HashMap<QuestionId, AnswerRecord>,
    pending: BTreeSet<OptionLabel>,
    bookmarks: HashSet<QuestionId>,
    started_at: DateTime<Utc>,
    elapsed_secs: u64,
}

impl ExamSession {
    /// Create a session over the given test block.
    ///
    /// `started_at` should come from the services layer clock to keep time
    /// deterministic.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no questions are provided.
    pub fn new(
        test_number: u32,
        questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }

        Ok(Self {
            test_number,
            questions,
            current: 0,
            answers: HashMap::new(),
            pending: BTreeSet::new(),
            bookmarks: HashSet::new(),
            started_at,
            elapsed_secs: 0,
        })
    }

    #[must_use]
    pub fn test_number(&self) -> u32 {
        self.test_number
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Total number of questions in this session.
    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// Bank ordinal of the first question in this block.
    #[must_use]
    pub fn first_question_number(&self) -> u32 {
        self.questions[0].number()
    }

    /// Bank ordinal of the last question in this block.
    #[must_use]
    pub fn last_question_number(&self) -> u32 {
        self.questions[self.questions.len() - 1].number()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current(&self) -> &Question {
        &self.questions[self.current]
    }

    //
    // ─── NAVIGATION ────────────────────────────────────────────────────────
    //

    /// Advance to the next question. No-op at the last question.
    pub fn next(&mut self) {
        if self.current + 1 < self.questions.len() {
            self.current += 1;
            self.pending.clear();
        }
    }

    /// Retreat to the previous question. No-op at the first question.
    pub fn prev(&mut self) {
        if self.current > 0 {
            self.current -= 1;
            self.pending.clear();
        }
    }

    /// Jump to an arbitrary question, clamped to the session bounds.
    pub fn jump_to(&mut self, index: usize) {
        let clamped = index.min(self.questions.len() - 1);
        if clamped != self.current {
            self.current = clamped;
            self.pending.clear();
        }
    }

    //
    // ─── BOOKMARKS ─────────────────────────────────────────────────────────
    //

    /// Toggle the bookmark on the current question. Returns the new state.
    pub fn toggle_bookmark(&mut self) -> bool {
        let id = self.current().id();
        if self.bookmarks.remove(&id) {
            false
        } else {
            self.bookmarks.insert(id);
            true
        }
    }

    #[must_use]
    pub fn is_bookmarked(&self, id: QuestionId) -> bool {
        self.bookmarks.contains(&id)
    }

    #[must_use]
    pub fn bookmarks(&self) -> &HashSet<QuestionId> {
        &self.bookmarks
    }

    //
    // ─── ANSWERING ─────────────────────────────────────────────────────────
    //

    /// Select a label on the current question.
    ///
    /// Single-answer questions finalize immediately. Multi-answer questions
    /// toggle the label in the pending selection until [`Self::submit`] is
    /// called. Selection on an already-answered question is ignored.
    pub fn select(&mut self, label: OptionLabel) -> SelectionOutcome {
        let question = &self.questions[self.current];
        let id = question.id();
        if self.answers.contains_key(&id) {
            return SelectionOutcome::Ignored;
        }
        if question.option_text(label).is_none() {
            return SelectionOutcome::Ignored;
        }

        if question.is_multi_answer() {
            if !self.pending.remove(&label) {
                self.pending.insert(label);
            }
            return SelectionOutcome::Pending {
                selected: self.pending.len(),
            };
        }

        let selected = BTreeSet::from([label]);
        let correct = question.key().matches(&selected);
        self.answers.insert(id, AnswerRecord { selected });
        SelectionOutcome::Answered { correct }
    }

    /// Submit the pending multi-answer selection on the current question.
    ///
    /// Rejected (no-op) when the question is single-answer, already answered,
    /// or nothing is selected.
    pub fn submit(&mut self) -> SelectionOutcome {
        let question = &self.questions[self.current];
        let id = question.id();
        if !question.is_multi_answer()
            || self.answers.contains_key(&id)
            || self.pending.is_empty()
        {
            return SelectionOutcome::Ignored;
        }

        let selected = std::mem::take(&mut self.pending);
        let correct = question.key().matches(&selected);
        self.answers.insert(id, AnswerRecord { selected });
        SelectionOutcome::Answered { correct }
    }

    /// Labels currently toggled on for the multi-answer in progress.
    #[must_use]
    pub fn pending(&self) -> &BTreeSet<OptionLabel> {
        &self.pending
    }

    #[must_use]
    pub fn answer_for(&self, id: QuestionId) -> Option<&AnswerRecord> {
        self.answers.get(&id)
    }

    #[must_use]
    pub fn is_answered(&self, id: QuestionId) -> bool {
        self.answers.contains_key(&id)
    }

    /// Correctness of a recorded answer, recomputed from the canonical key.
    /// `None` when the question has not been answered.
    #[must_use]
    pub fn is_correct(&self, id: QuestionId) -> Option<bool> {
        let record = self.answers.get(&id)?;
        let question = self.questions.iter().find(|q| q.id() == id)?;
        Some(question.key().matches(record.selected()))
    }

    //
    // ─── DERIVED STATE ─────────────────────────────────────────────────────
    //

    /// Number of questions with a finalized answer.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    fn correct_count(&self) -> usize {
        self.questions
            .iter()
            .filter(|question| {
                self.answers
                    .get(&question.id())
                    .is_some_and(|record| question.key().matches(record.selected()))
            })
            .count()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.answers.len() == self.questions.len()
    }

    /// Returns a summary of the current session progress.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.questions.len();
        let answered = self.answers.len();
        SessionProgress {
            total,
            answered,
            correct: self.correct_count(),
            remaining: total.saturating_sub(answered),
            is_complete: self.is_complete(),
        }
    }

    /// Questions answered incorrectly, in original question order, paired
    /// with the submitted labels.
    #[must_use]
    pub fn missed(&self) -> Vec<MissedAnswer> {
        self.questions
            .iter()
            .filter_map(|question| {
                let record = self.answers.get(&question.id())?;
                if question.key().matches(record.selected()) {
                    None
                } else {
                    Some(MissedAnswer {
                        question: question.clone(),
                        selected: record.selected().clone(),
                    })
                }
            })
            .collect()
    }

    /// Build the aggregate report for this session.
    ///
    /// # Errors
    ///
    /// Propagates `ReportError` via `SessionError::Report` when the derived
    /// counts are inconsistent.
    pub fn report(&self, completed_at: DateTime<Utc>) -> Result<TestReport, SessionError> {
        let progress = self.progress();
        Ok(TestReport::from_counts(
            self.test_number,
            clamp_u32(progress.total),
            clamp_u32(progress.answered),
            clamp_u32(progress.correct),
            self.started_at,
            completed_at,
        )?)
    }

    //
    // ─── LIFECYCLE ─────────────────────────────────────────────────────────
    //

    /// Clear all answers, pending selection, and bookmarks; return to the
    /// first question and restart the timer baseline.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.answers.clear();
        self.pending.clear();
        self.bookmarks.clear();
        self.current = 0;
        self.started_at = now;
        self.elapsed_secs = 0;
    }

    /// Advance the elapsed-time counter by one second.
    ///
    /// Driven by the UI timer once per second while a session is active.
    pub fn tick(&mut self) {
        self.elapsed_secs = self.elapsed_secs.saturating_add(1);
    }
}

fn clamp_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

impl fmt::Debug for ExamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamSession")
            .field("test_number", &self.test_number)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("answers_len", &self.answers.len())
            .field("bookmarks_len", &self.bookmarks.len())
            .field("started_at", &self.started_at)
            .field("elapsed_secs", &self.elapsed_secs)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::QuestionDraft;
    use exam_core::time::fixed_now;

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

    fn build_session(keys: &[&str]) -> ExamSession {
        let questions = keys
            .iter()
            .enumerate()
            .map(|(i, key)| build_question(u32::try_from(i).unwrap() + 1, key))
            .collect();
        ExamSession::new(1, questions, fixed_now()).unwrap()
    }

    #[test]
    fn empty_session_returns_error() {
        let err = ExamSession::new(1, Vec::new(), fixed_now()).unwrap_err();
        assert!(matches!(err, SessionError::Empty));
    }

    #[test]
    fn single_answer_finalizes_on_select() {
        let mut session = build_session(&["B"]);

        let outcome = session.select(OptionLabel::B);
        assert_eq!(outcome, SelectionOutcome::Answered { correct: true });

        let id = session.current().id();
        assert!(session.is_answered(id));
        assert_eq!(session.is_correct(id), Some(true));
    }

    #[test]
    fn single_answer_wrong_label_is_incorrect() {
        let mut session = build_session(&["B"]);
        let outcome = session.select(OptionLabel::C);
        assert_eq!(outcome, SelectionOutcome::Answered { correct: false });
        assert_eq!(session.is_correct(session.current().id()), Some(false));
    }

    #[test]
    fn finalized_answers_are_terminal() {
        let mut session = build_session(&["B"]);
        session.select(OptionLabel::C);

        // Further selection is disabled once an answer is recorded.
        assert_eq!(session.select(OptionLabel::B), SelectionOutcome::Ignored);
        assert_eq!(session.is_correct(session.current().id()), Some(false));
    }

    #[test]
    fn label_without_option_slot_is_ignored() {
        let mut session = build_session(&["A"]);
        assert_eq!(session.select(OptionLabel::F), SelectionOutcome::Ignored);
        assert!(!session.is_answered(session.current().id()));
    }

    #[test]
    fn multi_answer_accumulates_until_submit() {
        let mut session = build_session(&["B,D"]);

        assert_eq!(
            session.select(OptionLabel::D),
            SelectionOutcome::Pending { selected: 1 }
        );
        assert_eq!(
            session.select(OptionLabel::B),
            SelectionOutcome::Pending { selected: 2 }
        );
        assert!(!session.is_answered(session.current().id()));

        let outcome = session.submit();
        assert_eq!(outcome, SelectionOutcome::Answered { correct: true });
        assert!(session.pending().is_empty());
    }

    #[test]
    fn multi_answer_toggle_deselects() {
        let mut session = build_session(&["B,D"]);
        session.select(OptionLabel::B);
        assert_eq!(
            session.select(OptionLabel::B),
            SelectionOutcome::Pending { selected: 0 }
        );
    }

    #[test]
    fn empty_submit_is_rejected() {
        let mut session = build_session(&["B,D"]);
        assert_eq!(session.submit(), SelectionOutcome::Ignored);
        assert!(!session.is_answered(session.current().id()));
    }

    #[test]
    fn submit_on_single_answer_question_is_ignored() {
        let mut session = build_session(&["A"]);
        assert_eq!(session.submit(), SelectionOutcome::Ignored);
    }

    #[test]
    fn subset_and_superset_submissions_are_incorrect() {
        let mut session = build_session(&["B,D", "B,D"]);

        session.select(OptionLabel::B);
        assert_eq!(
            session.submit(),
            SelectionOutcome::Answered { correct: false }
        );

        session.next();
        session.select(OptionLabel::B);
        session.select(OptionLabel::D);
        session.select(OptionLabel::A);
        assert_eq!(
            session.submit(),
            SelectionOutcome::Answered { correct: false }
        );
    }

    #[test]
    fn navigation_clamps_to_bounds() {
        let mut session = build_session(&["A", "B", "C"]);

        session.prev();
        assert_eq!(session.current_index(), 0);

        session.next();
        session.next();
        assert_eq!(session.current_index(), 2);
        session.next();
        assert_eq!(session.current_index(), 2);

        session.jump_to(99);
        assert_eq!(session.current_index(), 2);
        session.jump_to(1);
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn navigation_discards_pending_selection() {
        let mut session = build_session(&["B,D", "A"]);
        session.select(OptionLabel::B);
        session.next();
        session.prev();
        assert!(session.pending().is_empty());
    }

    #[test]
    fn bookmarks_toggle_and_do_not_affect_scoring() {
        let mut session = build_session(&["A", "B"]);

        assert!(session.toggle_bookmark());
        assert!(session.is_bookmarked(session.current().id()));
        assert!(!session.toggle_bookmark());
        assert!(!session.is_bookmarked(session.current().id()));

        session.toggle_bookmark();
        session.select(OptionLabel::A);
        let progress = session.progress();
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.correct, 1);
    }

    #[test]
    fn progress_tracks_counts_and_completion() {
        let mut session = build_session(&["A", "B", "C", "D"]);

        session.select(OptionLabel::A); // correct
        session.next();
        session.select(OptionLabel::A); // incorrect
        session.next();
        session.select(OptionLabel::C); // correct
        session.next();

        let progress = session.progress();
        assert_eq!(progress.answered, 3);
        assert_eq!(progress.correct, 2);
        assert_eq!(progress.remaining, 1);
        assert!(!progress.is_complete);
        assert_eq!(progress.accuracy_pct(), 67);

        session.select(OptionLabel::D); // correct
        assert!(session.is_complete());
    }

    #[test]
    fn three_of_four_scores_seventy_five_and_passes() {
        let mut session = build_session(&["A", "B", "C", "D"]);
        session.select(OptionLabel::A); // correct
        session.next();
        session.select(OptionLabel::C); // incorrect
        session.next();
        session.select(OptionLabel::C); // correct
        session.next();
        session.select(OptionLabel::D); // correct

        let report = session.report(fixed_now()).unwrap();
        assert_eq!(report.correct(), 3);
        assert_eq!(report.total_questions(), 4);
        assert_eq!(report.score_pct(), 75);
        assert!(report.passed());
    }

    #[test]
    fn missed_list_preserves_question_order_and_selection() {
        let mut session = build_session(&["A", "B", "C"]);
        // Answer the last question first to show ordering is by question, not
        // by submission time.
        session.jump_to(2);
        session.select(OptionLabel::A); // incorrect
        session.jump_to(0);
        session.select(OptionLabel::B); // incorrect
        session.next();
        session.select(OptionLabel::B); // correct

        let missed = session.missed();
        assert_eq!(missed.len(), 2);
        assert_eq!(missed[0].question.number(), 1);
        assert_eq!(missed[0].selected, BTreeSet::from([OptionLabel::B]));
        assert_eq!(missed[1].question.number(), 3);
        assert_eq!(missed[1].selected, BTreeSet::from([OptionLabel::A]));
    }

    #[test]
    fn reset_clears_all_state() {
        let mut session = build_session(&["A", "B"]);
        session.select(OptionLabel::A);
        session.next();
        session.toggle_bookmark();
        session.tick();
        session.tick();

        let later = fixed_now() + chrono::Duration::seconds(30);
        session.reset(later);

        assert_eq!(session.current_index(), 0);
        assert_eq!(session.answered_count(), 0);
        assert!(session.bookmarks().is_empty());
        assert_eq!(session.elapsed_secs(), 0);
        assert_eq!(session.started_at(), later);
    }

    #[test]
    fn tick_accumulates_elapsed_seconds() {
        let mut session = build_session(&["A"]);
        for _ in 0..5 {
            session.tick();
        }
        assert_eq!(session.elapsed_secs(), 5);
    }
}

use std::collections::BTreeSet;
use std::sync::Arc;

use exam_core::model::{OptionLabel, Question, QuestionDraft, QuestionId, QuestionKind};
use exam_core::time::fixed_now;
use services::{Clock, ExamLoopService, SelectionOutcome};
use storage::repository::{InMemoryRepository, QuestionRepository};

fn single_answer(number: u32, key: &str) -> Question {
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
        format!("Explanation {number}."),
    );
    Question::from_persisted(QuestionId::new(u64::from(number)), draft).unwrap()
}

fn multi_answer(number: u32, key: &str) -> Question {
    let draft = QuestionDraft {
        number,
        text: format!("Select all that apply for {number}."),
        options: vec![
            "First".to_string(),
            "Second".to_string(),
            "Third".to_string(),
            "Fourth".to_string(),
        ],
        key: key.to_string(),
        explanation: String::new(),
        kind: QuestionKind::MultipleChoice,
        image: None,
        simulation: None,
    };
    Question::from_persisted(QuestionId::new(u64::from(number)), draft).unwrap()
}

#[tokio::test]
async fn full_session_walk_scores_and_reports_missed_questions() {
    let repo = InMemoryRepository::new();
    repo.upsert_question(&single_answer(1, "A")).await.unwrap();
    repo.upsert_question(&single_answer(2, "B")).await.unwrap();
    repo.upsert_question(&multi_answer(3, "B,D")).await.unwrap();
    repo.upsert_question(&single_answer(4, "D")).await.unwrap();

    let svc = ExamLoopService::new(Clock::fixed(fixed_now()), Arc::new(repo));

    let plan = svc.outline().await.unwrap();
    assert_eq!(plan.test_count(), 1);
    assert_eq!(plan.slot(1).unwrap().question_count, 4);

    let mut session = svc.start_test(1).await.unwrap();

    // Q1 correct.
    assert_eq!(
        session.select(OptionLabel::A),
        SelectionOutcome::Answered { correct: true }
    );
    session.next();

    // Q2 wrong.
    assert_eq!(
        session.select(OptionLabel::C),
        SelectionOutcome::Answered { correct: false }
    );
    session.next();

    // Q3 multi-answer, submitted out of order.
    session.select(OptionLabel::D);
    session.select(OptionLabel::B);
    assert_eq!(
        session.submit(),
        SelectionOutcome::Answered { correct: true }
    );
    session.next();

    // Q4 correct.
    session.select(OptionLabel::D);

    assert!(session.is_complete());
    let progress = session.progress();
    assert_eq!(progress.answered, 4);
    assert_eq!(progress.correct, 3);
    assert_eq!(progress.accuracy_pct(), 75);

    let report = svc.report(&session).unwrap();
    assert_eq!(report.score_pct(), 75);
    assert!(report.passed());

    let missed = session.missed();
    assert_eq!(missed.len(), 1);
    assert_eq!(missed[0].question.number(), 2);
    assert_eq!(missed[0].selected, BTreeSet::from([OptionLabel::C]));
}

#[tokio::test]
async fn restart_yields_a_fresh_session() {
    let repo = InMemoryRepository::new();
    repo.upsert_question(&single_answer(1, "A")).await.unwrap();
    repo.upsert_question(&single_answer(2, "B")).await.unwrap();

    let svc = ExamLoopService::new(Clock::fixed(fixed_now()), Arc::new(repo));
    let mut session = svc.start_test(1).await.unwrap();

    session.select(OptionLabel::A);
    session.next();
    session.toggle_bookmark();
    assert_eq!(session.answered_count(), 1);

    svc.restart(&mut session);
    assert_eq!(session.answered_count(), 0);
    assert!(session.bookmarks().is_empty());
    assert_eq!(session.current_index(), 0);
    assert!(!session.is_complete());
}

use exam_core::model::OptionLabel;

use super::test_harness::{ViewKind, build_question, setup_view_harness};
use crate::vm::ExamIntent;

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_renders_test_cards() {
    let questions = (1..=4).map(|n| build_question(n, "A")).collect();
    let mut harness = setup_view_harness(ViewKind::Home, questions).await;

    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();

    assert!(html.contains("Choose a Test"), "missing heading in {html}");
    assert!(html.contains("Test 1"), "missing test card in {html}");
    assert!(
        html.contains("4 questions across 1 tests"),
        "missing plan summary in {html}"
    );
    assert!(
        html.contains("Questions 1\u{2013}4"),
        "missing range in {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_empty_bank_shows_retry() {
    let mut harness = setup_view_harness(ViewKind::Home, Vec::new()).await;

    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();

    assert!(
        html.contains("No questions available."),
        "missing empty message in {html}"
    );
    assert!(html.contains("Retry"), "missing retry in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn exam_view_smoke_renders_prompt_and_options() {
    let questions = vec![build_question(1, "B"), build_question(2, "A")];
    let mut harness = setup_view_harness(ViewKind::Exam(1), questions).await;

    harness.rebuild();
    harness.drive_async().await;
    harness.drive();
    let html = harness.render();

    assert!(
        html.contains("What is the answer to question 1?"),
        "missing prompt in {html}"
    );
    assert!(html.contains("Bravo 1"), "missing option text in {html}");
    assert!(
        html.contains("Question 1 of 2"),
        "missing position in {html}"
    );
    assert!(html.contains("Answered: 0"), "missing stats in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn exam_view_smoke_select_reveals_explanation_and_navigates() {
    let questions = vec![build_question(1, "B"), build_question(2, "A")];
    let mut harness = setup_view_harness(ViewKind::Exam(1), questions).await;

    harness.rebuild();
    harness.drive_async().await;
    harness.drive();

    let handles = harness.exam_handles.clone().expect("exam handles");
    let dispatch = handles.dispatch();

    // Wrong answer: explanation shows with the canonical key.
    dispatch.call(ExamIntent::Select(OptionLabel::C));
    harness.drive();
    let html = harness.render();
    assert!(html.contains("Incorrect"), "missing verdict in {html}");
    assert!(
        html.contains("Explanation for question 1."),
        "missing explanation in {html}"
    );
    assert!(
        html.contains("Correct Answer: B"),
        "missing key in {html}"
    );

    dispatch.call(ExamIntent::Next);
    harness.drive();
    let html = harness.render();
    assert!(
        html.contains("What is the answer to question 2?"),
        "missing second prompt in {html}"
    );
    assert!(html.contains("Answered: 1"), "missing count in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn exam_view_smoke_completion_shows_report_and_missed_list() {
    let questions = vec![build_question(1, "A"), build_question(2, "B")];
    let mut harness = setup_view_harness(ViewKind::Exam(1), questions).await;

    harness.rebuild();
    harness.drive_async().await;
    harness.drive();

    let handles = harness.exam_handles.clone().expect("exam handles");
    let dispatch = handles.dispatch();

    dispatch.call(ExamIntent::Select(OptionLabel::A)); // correct
    dispatch.call(ExamIntent::Next);
    dispatch.call(ExamIntent::Select(OptionLabel::C)); // incorrect
    harness.drive();

    let html = harness.render();
    // 1 of 2 correct: 50%, below the inclusive 75% threshold.
    assert!(
        html.contains("You scored 1 out of 2 (50%)"),
        "missing score in {html}"
    );
    assert!(
        html.contains("You need 75% to pass."),
        "missing fail message in {html}"
    );
    assert!(
        html.contains("Missed Questions (1 incorrect)"),
        "missing missed report in {html}"
    );
    assert!(html.contains("Your Answer: C"), "missing selection in {html}");
}

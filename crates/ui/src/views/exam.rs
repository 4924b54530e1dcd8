use dioxus::prelude::*;
use dioxus_router::use_navigator;
use keyboard_types::Key;

use exam_core::model::{
    Grade, OptionLabel, PASS_THRESHOLD_PCT, QuestionKind, SimulationMeta,
};
use services::MissedAnswer;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{ExamIntent, ExamVm, OptionState, format_elapsed, markdown_to_html, start_exam};

/// One cell of the question-overview grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct GridCell {
    index: usize,
    answered: bool,
    bookmarked: bool,
    current: bool,
}

fn grade_copy(grade: Grade, score_pct: u32) -> (&'static str, String) {
    match grade {
        Grade::Outstanding => ("Outstanding Performance!", "Excellent!".to_string()),
        Grade::Great => ("Great Work!", "Good job!".to_string()),
        Grade::Passed => (
            "Congratulations! You Passed!",
            format!("You exceeded the {PASS_THRESHOLD_PCT}% pass threshold!"),
        ),
        Grade::Failed => (
            "Test Complete",
            format!("You need {PASS_THRESHOLD_PCT}% to pass. You scored {score_pct}%."),
        ),
    }
}

#[component]
pub fn ExamView(test_number: u32) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let exam_loop = ctx.exam_loop();

    let vm = use_signal(|| None::<ExamVm>);

    let exam_loop_for_resource = exam_loop.clone();
    let resource = use_resource(move || {
        let exam_loop = exam_loop_for_resource.clone();
        let mut vm = vm;
        async move {
            let started = start_exam(&exam_loop, test_number).await?;
            vm.set(Some(started));
            Ok::<_, ViewError>(())
        }
    });

    let state = view_state_from_resource(&resource);

    let dispatch_intent = {
        let exam_loop = exam_loop.clone();
        use_callback(move |intent: ExamIntent| {
            let mut vm = vm;
            if let Some(vm) = vm.write().as_mut() {
                vm.apply(intent, &exam_loop);
            }
        })
    };

    #[cfg(test)]
    {
        let mut registered = use_signal(|| false);
        if !registered() {
            registered.set(true);
            if let Some(handles) = try_consume_context::<ExamTestHandles>() {
                handles.register(dispatch_intent);
            }
        }
    }

    // One tick per second while the session is active.
    let exam_loop_for_timer = exam_loop.clone();
    use_future(move || {
        let exam_loop = exam_loop_for_timer.clone();
        async move {
            loop {
                tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                let mut vm = vm;
                let active = vm
                    .read()
                    .as_ref()
                    .is_some_and(|vm| !vm.is_complete());
                if active {
                    if let Some(vm) = vm.write().as_mut() {
                        vm.apply(ExamIntent::Tick, &exam_loop);
                    }
                }
            }
        }
    });

    let retry = use_callback(move |()| {
        let mut resource = resource;
        resource.restart();
    });

    let on_key = use_callback(move |evt: KeyboardEvent| {
        if evt.data.key() == Key::Escape {
            evt.prevent_default();
            navigator.push(Route::Home {});
            return;
        }

        let has_session = vm.read().is_some();
        if !has_session {
            return;
        }

        match evt.data.key() {
            Key::ArrowLeft => {
                evt.prevent_default();
                dispatch_intent.call(ExamIntent::Prev);
            }
            Key::ArrowRight => {
                evt.prevent_default();
                dispatch_intent.call(ExamIntent::Next);
            }
            Key::Enter => {
                evt.prevent_default();
                dispatch_intent.call(ExamIntent::Submit);
            }
            Key::Character(value) => match value.as_str() {
                "m" | "M" => {
                    evt.prevent_default();
                    dispatch_intent.call(ExamIntent::ToggleBookmark);
                }
                digit @ ("1" | "2" | "3" | "4" | "5" | "6") => {
                    let index = digit
                        .parse::<usize>()
                        .expect("digit keys parse as usize")
                        - 1;
                    if let Some(label) = OptionLabel::from_index(index) {
                        evt.prevent_default();
                        dispatch_intent.call(ExamIntent::Select(label));
                    }
                }
                _ => {}
            },
            _ => {}
        }
    });

    // Snapshot everything the render needs before building the tree.
    let vm_guard = vm.read();
    let question = vm_guard.as_ref().map(|vm| vm.current_question().clone());
    let option_rows: Vec<(OptionLabel, String, OptionState)> = vm_guard
        .as_ref()
        .map(|vm| {
            vm.current_question()
                .labelled_options()
                .map(|(label, text)| (label, text.to_string(), vm.option_state(label)))
                .collect()
        })
        .unwrap_or_default();
    let show_explanation = vm_guard.as_ref().is_some_and(ExamVm::show_explanation);
    let current_correct = vm_guard.as_ref().and_then(ExamVm::current_correct);
    let explanation_html = question
        .as_ref()
        .filter(|_| show_explanation)
        .map(|q| markdown_to_html(q.explanation()));
    let bookmarked = vm_guard.as_ref().is_some_and(ExamVm::current_bookmarked);
    let pending_count = vm_guard.as_ref().map_or(0, ExamVm::pending_count);
    let progress = vm_guard.as_ref().map(|vm| vm.progress());
    let current_index = vm_guard.as_ref().map_or(0, ExamVm::current_index);
    let total_questions = vm_guard.as_ref().map_or(0, ExamVm::total_questions);
    let walked_pct = vm_guard.as_ref().map_or(0.0, ExamVm::walked_pct);
    let elapsed_label = format_elapsed(vm_guard.as_ref().map_or(0, ExamVm::elapsed_secs));
    let is_complete = vm_guard.as_ref().is_some_and(ExamVm::is_complete);
    let report = vm_guard
        .as_ref()
        .filter(|vm| vm.is_complete())
        .and_then(|vm| vm.report(&exam_loop).ok());
    let missed = vm_guard
        .as_ref()
        .filter(|vm| vm.is_complete())
        .map(ExamVm::missed)
        .unwrap_or_default();
    let grid: Vec<GridCell> = vm_guard
        .as_ref()
        .map(|vm| {
            let session = vm.session();
            session
                .questions()
                .iter()
                .enumerate()
                .map(|(index, q)| GridCell {
                    index,
                    answered: session.is_answered(q.id()),
                    bookmarked: session.is_bookmarked(q.id()),
                    current: index == current_index,
                })
                .collect()
        })
        .unwrap_or_default();
    drop(vm_guard);

    let (answered_count, accuracy_pct) = progress
        .as_ref()
        .map_or((0, 0), |p| (p.answered, p.accuracy_pct()));

    rsx! {
        div { class: "page exam-page", id: "exam-root", tabindex: "0", onkeydown: move |evt| on_key.call(evt),
            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading questions..." }
                },
                ViewState::Error(err) => rsx! {
                    div { class: "exam-error",
                        p { "{err.message()}" }
                        button {
                            class: "btn btn-secondary",
                            r#type: "button",
                            onclick: move |_| retry.call(()),
                            "Retry"
                        }
                        button {
                            class: "btn btn-ghost",
                            r#type: "button",
                            onclick: move |_| {
                                let _ = navigator.push(Route::Home {});
                            },
                            "Back to Tests"
                        }
                    }
                },
                ViewState::Ready(()) => rsx! {
                    header { class: "exam-header",
                        div { class: "exam-header__heading",
                            h2 { "Test {test_number}" }
                            p { class: "exam-header__position",
                                "Question {current_index + 1} of {total_questions}"
                            }
                        }
                        div { class: "exam-header__stats",
                            span { class: "exam-stat", "Answered: {answered_count}" }
                            span { class: "exam-stat", "Accuracy: {accuracy_pct}%" }
                            span { class: "exam-stat", id: "exam-timer", "Time: {elapsed_label}" }
                        }
                        div { class: "progress-track",
                            div {
                                class: "progress-fill",
                                style: "width: {walked_pct}%",
                            }
                        }
                    }

                    div { class: "exam-body",
                        section { class: "exam-question",
                            if let Some(question) = question.as_ref() {
                                QuestionHeading {
                                    number: question.number(),
                                    text: question.text().to_string(),
                                }
                                if question.kind() == QuestionKind::Simulation {
                                    if let Some(sim) = question.simulation() {
                                        SimulationBlock { sim: sim.clone() }
                                    }
                                }
                                if let Some(image) = question.image() {
                                    img {
                                        class: "exam-question__image",
                                        src: "{image}",
                                        alt: "Question illustration",
                                    }
                                }
                                if question.is_multi_answer() && !show_explanation {
                                    p { class: "exam-multi-note",
                                        "This question requires multiple answers. Select all correct options, then submit."
                                    }
                                }
                                div { class: "exam-options",
                                    for (label, text, option_state) in option_rows {
                                        OptionRow {
                                            label,
                                            text,
                                            option_state,
                                            disabled: show_explanation,
                                            on_intent: dispatch_intent,
                                        }
                                    }
                                }
                                if question.is_multi_answer() && !show_explanation {
                                    button {
                                        class: "btn btn-primary exam-submit",
                                        id: "exam-submit",
                                        r#type: "button",
                                        disabled: pending_count == 0,
                                        onclick: move |_| dispatch_intent.call(ExamIntent::Submit),
                                        "Submit Answer ({pending_count} selected)"
                                    }
                                }
                                if show_explanation {
                                    ExplanationPanel {
                                        correct: current_correct.unwrap_or(false),
                                        explanation_html: explanation_html.clone().unwrap_or_default(),
                                        key_label: question.key().to_string(),
                                    }
                                }
                            }
                        }

                        aside { class: "exam-sidebar",
                            div { class: "exam-nav",
                                button {
                                    class: "btn btn-secondary",
                                    id: "exam-prev",
                                    r#type: "button",
                                    disabled: current_index == 0,
                                    onclick: move |_| dispatch_intent.call(ExamIntent::Prev),
                                    "Previous"
                                }
                                button {
                                    class: if bookmarked { "btn btn-bookmark btn-bookmark--on" } else { "btn btn-bookmark" },
                                    id: "exam-bookmark",
                                    r#type: "button",
                                    onclick: move |_| dispatch_intent.call(ExamIntent::ToggleBookmark),
                                    if bookmarked { "Bookmarked" } else { "Bookmark" }
                                }
                                button {
                                    class: "btn btn-primary",
                                    id: "exam-next",
                                    r#type: "button",
                                    disabled: current_index + 1 >= total_questions,
                                    onclick: move |_| dispatch_intent.call(ExamIntent::Next),
                                    "Next"
                                }
                            }
                            div { class: "exam-grid-panel",
                                h3 { "Question Overview" }
                                div { class: "exam-grid",
                                    for cell in grid {
                                        GridButton { cell, on_intent: dispatch_intent }
                                    }
                                }
                            }
                            button {
                                class: "btn btn-ghost exam-reset",
                                id: "exam-reset",
                                r#type: "button",
                                onclick: move |_| dispatch_intent.call(ExamIntent::Reset),
                                "Reset Test"
                            }
                        }
                    }

                    if is_complete {
                        if let Some(report) = report {
                            CompletionBanner {
                                passed: report.passed(),
                                correct: report.correct(),
                                total: report.total_questions(),
                                score_pct: report.score_pct(),
                                grade: report.grade(),
                                on_intent: dispatch_intent,
                            }
                            if !missed.is_empty() {
                                MissedReport { missed }
                            }
                        }
                    }
                },
            }
        }
    }
}

#[component]
fn QuestionHeading(number: u32, text: String) -> Element {
    rsx! {
        div { class: "exam-question__heading",
            span { class: "exam-question__number", "Question {number}" }
            h3 { class: "exam-question__text", "{text}" }
        }
    }
}

#[component]
fn SimulationBlock(sim: SimulationMeta) -> Element {
    rsx! {
        div { class: "exam-simulation",
            span { class: "exam-simulation__tag", "Simulation Question" }
            p { "{sim.instructions}" }
            div { class: "exam-simulation__assets",
                for asset in sim.assets.iter() {
                    img { src: "{asset}", alt: "Simulation asset" }
                }
            }
        }
    }
}

#[component]
fn OptionRow(
    label: OptionLabel,
    text: String,
    option_state: OptionState,
    disabled: bool,
    on_intent: EventHandler<ExamIntent>,
) -> Element {
    let (class, marker) = match option_state {
        OptionState::Idle => ("option-row", ""),
        OptionState::Selected => ("option-row option-row--selected", "\u{2713}"),
        OptionState::Correct => ("option-row option-row--correct", "\u{2713}"),
        OptionState::Incorrect => ("option-row option-row--incorrect", "\u{2717}"),
        OptionState::Dimmed => ("option-row option-row--dimmed", ""),
    };

    rsx! {
        button {
            class: "{class}",
            id: "exam-option-{label}",
            r#type: "button",
            disabled,
            onclick: move |_| on_intent.call(ExamIntent::Select(label)),
            span { class: "option-row__label", "{label}." }
            span { class: "option-row__text", "{text}" }
            if !marker.is_empty() {
                span { class: "option-row__marker", "{marker}" }
            }
        }
    }
}

#[component]
fn ExplanationPanel(correct: bool, explanation_html: String, key_label: String) -> Element {
    let (class, headline) = if correct {
        ("exam-explanation exam-explanation--correct", "Correct!")
    } else {
        ("exam-explanation exam-explanation--incorrect", "Incorrect")
    };

    rsx! {
        div { class: "{class}",
            h4 { "{headline}" }
            div { class: "exam-explanation__body", dangerous_inner_html: "{explanation_html}" }
            p { class: "exam-explanation__key", "Correct Answer: {key_label}" }
        }
    }
}

#[component]
fn GridButton(cell: GridCell, on_intent: EventHandler<ExamIntent>) -> Element {
    let mut class = String::from("grid-cell");
    if cell.current {
        class.push_str(" grid-cell--current");
    } else if cell.answered {
        class.push_str(" grid-cell--answered");
    }
    if cell.bookmarked {
        class.push_str(" grid-cell--bookmarked");
    }

    rsx! {
        button {
            class: "{class}",
            r#type: "button",
            onclick: move |_| on_intent.call(ExamIntent::JumpTo(cell.index)),
            "{cell.index + 1}"
        }
    }
}

#[component]
fn CompletionBanner(
    passed: bool,
    correct: u32,
    total: u32,
    score_pct: u32,
    grade: Grade,
    on_intent: EventHandler<ExamIntent>,
) -> Element {
    let (headline, message) = grade_copy(grade, score_pct);
    let class = if passed {
        "exam-complete exam-complete--passed"
    } else {
        "exam-complete exam-complete--failed"
    };

    rsx! {
        div { class: "{class}",
            h3 { "{headline}" }
            p { class: "exam-complete__score",
                "You scored {correct} out of {total} ({score_pct}%)"
            }
            p { class: "exam-complete__message", "{message}" }
            button {
                class: "btn btn-primary",
                id: "exam-restart",
                r#type: "button",
                onclick: move |_| on_intent.call(ExamIntent::Reset),
                "Restart Test"
            }
        }
    }
}

#[component]
fn MissedReport(missed: Vec<MissedAnswer>) -> Element {
    let count = missed.len();
    rsx! {
        div { class: "exam-missed",
            h3 { "Missed Questions ({count} incorrect)" }
            ul { class: "exam-missed__list",
                for item in missed {
                    MissedItem { item }
                }
            }
        }
    }
}

#[component]
fn MissedItem(item: MissedAnswer) -> Element {
    let selected = item
        .selected
        .iter()
        .map(|label| label.as_str())
        .collect::<Vec<_>>()
        .join(",");
    let explanation_html = markdown_to_html(item.question.explanation());
    let number = item.question.number();
    let text = item.question.text().to_string();
    let key = item.question.key().to_string();

    rsx! {
        li { class: "exam-missed__item",
            div { class: "exam-missed__heading",
                span { class: "exam-missed__number", "Question {number}" }
                p { "{text}" }
            }
            p { class: "exam-missed__your-answer", "Your Answer: {selected}" }
            p { class: "exam-missed__correct-answer", "Correct Answer: {key}" }
            div { class: "exam-missed__explanation", dangerous_inner_html: "{explanation_html}" }
        }
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct ExamTestHandles {
    dispatch: std::rc::Rc<std::cell::RefCell<Option<Callback<ExamIntent>>>>,
}

#[cfg(test)]
impl ExamTestHandles {
    pub(crate) fn register(&self, dispatch: Callback<ExamIntent>) {
        *self.dispatch.borrow_mut() = Some(dispatch);
    }

    pub(crate) fn dispatch(&self) -> Callback<ExamIntent> {
        (*self.dispatch.borrow()).expect("exam dispatch registered")
    }
}

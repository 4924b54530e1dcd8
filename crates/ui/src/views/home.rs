use dioxus::prelude::*;
use dioxus_router::Link;

use services::{ExamPlan, TestSlot};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};

#[component]
pub fn HomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let exam_loop = ctx.exam_loop();

    let resource = use_resource(move || {
        let exam_loop = exam_loop.clone();
        async move {
            exam_loop
                .outline()
                .await
                .map_err(|_| ViewError::Unknown)
        }
    });

    let state = view_state_from_resource(&resource);
    let retry = use_callback(move |()| {
        let mut resource = resource;
        resource.restart();
    });

    rsx! {
        div { class: "page home-page",
            header { class: "home-header",
                h2 { "Choose a Test" }
                p { class: "home-subtitle",
                    "Each test covers a block of questions with immediate explanations and progress tracking."
                }
            }
            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading question bank..." }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| retry.call(()),
                        "Retry"
                    }
                },
                ViewState::Ready(plan) => rsx! {
                    if plan.is_empty() {
                        div { class: "home-empty",
                            p { "No questions available." }
                            button {
                                class: "btn btn-secondary",
                                r#type: "button",
                                onclick: move |_| retry.call(()),
                                "Retry"
                            }
                        }
                    } else {
                        PlanSummary { plan }
                        div { class: "test-grid",
                            for slot in plan.slots() {
                                TestCard { slot }
                            }
                        }
                    }
                },
            }
        }
    }
}

#[component]
fn PlanSummary(plan: ExamPlan) -> Element {
    rsx! {
        p { class: "home-plan-summary",
            "{plan.total_questions()} questions across {plan.test_count()} tests"
        }
    }
}

#[component]
fn TestCard(slot: TestSlot) -> Element {
    let minutes = slot.estimated_minutes();
    rsx! {
        Link {
            class: "test-card",
            to: Route::Exam { test_number: slot.number },
            div { class: "test-card__badge", "{slot.number}" }
            div { class: "test-card__body",
                h3 { "Test {slot.number}" }
                p { class: "test-card__range",
                    "Questions {slot.first_question}\u{2013}{slot.last_question}"
                }
                p { class: "test-card__meta",
                    "{slot.question_count} questions \u{b7} ~{minutes} min"
                }
            }
        }
    }
}

use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use exam_core::model::{Question, QuestionDraft, QuestionId};
use exam_core::time::fixed_now;
use services::{Clock, ExamLoopService};
use storage::repository::{InMemoryRepository, QuestionRepository};

use crate::context::{UiApp, build_app_context};
use crate::views::exam::ExamTestHandles;
use crate::views::{ExamView, HomeView};

#[derive(Clone)]
struct TestApp {
    exam_loop: Arc<ExamLoopService>,
}

impl UiApp for TestApp {
    fn exam_loop(&self) -> Arc<ExamLoopService> {
        Arc::clone(&self.exam_loop)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Home,
    Exam(u32),
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
    exam_handles: Option<ExamTestHandles>,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for ViewHarnessProps {}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view);
    if let Some(handles) = props.exam_handles.clone() {
        use_context_provider(|| handles);
    }
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Home => rsx! { HomeView {} },
        ViewKind::Exam(test_number) => rsx! { ExamView { test_number } },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub repo: InMemoryRepository,
    pub exam_handles: Option<ExamTestHandles>,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    pub fn drive(&mut self) {
        drive_dom(&mut self.dom);
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub fn build_question(number: u32, key: &str) -> Question {
    let draft = QuestionDraft::multiple_choice(
        number,
        format!("What is the answer to question {number}?"),
        vec![
            format!("Alpha {number}"),
            format!("Bravo {number}"),
            format!("Charlie {number}"),
            format!("Delta {number}"),
        ],
        key,
        format!("Explanation for question {number}."),
    );
    Question::from_persisted(QuestionId::new(u64::from(number)), draft).unwrap()
}

pub async fn setup_view_harness(view: ViewKind, questions: Vec<Question>) -> ViewHarness {
    let repo = InMemoryRepository::new();
    for question in &questions {
        repo.upsert_question(question).await.expect("seed question");
    }

    let exam_loop = Arc::new(ExamLoopService::new(
        Clock::fixed(fixed_now()),
        Arc::new(repo.clone()),
    ));

    let exam_handles = match view {
        ViewKind::Exam(_) => Some(ExamTestHandles::default()),
        ViewKind::Home => None,
    };

    let app = Arc::new(TestApp { exam_loop });

    let dom = VirtualDom::new_with_props(
        ViewRouterHarness,
        ViewHarnessProps {
            app,
            view,
            exam_handles: exam_handles.clone(),
        },
    );

    ViewHarness {
        dom,
        repo,
        exam_handles,
    }
}

use std::sync::Arc;

use services::ExamLoopService;

/// Services the presentation layer needs from the composition root.
pub trait UiApp: Send + Sync {
    fn exam_loop(&self) -> Arc<ExamLoopService>;
}

#[derive(Clone)]
pub struct AppContext {
    exam_loop: Arc<ExamLoopService>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            exam_loop: app.exam_loop(),
        }
    }

    #[must_use]
    pub fn exam_loop(&self) -> Arc<ExamLoopService> {
        Arc::clone(&self.exam_loop)
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}

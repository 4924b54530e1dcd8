mod plan;
mod progress;
mod queries;
mod service;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use plan::{ExamPlan, QUESTIONS_PER_TEST, TestSlot};
pub use progress::{MissedAnswer, SessionProgress};
pub use service::{AnswerRecord, ExamSession, SelectionOutcome};
pub use workflow::ExamLoopService;

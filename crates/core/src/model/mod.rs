mod answer;
mod ids;
mod question;
mod report;

pub use answer::{AnswerKey, AnswerKeyError, OptionLabel, ParseLabelError};
pub use ids::QuestionId;
pub use question::{
    MAX_OPTIONS, MIN_OPTIONS, ParseKindError, Question, QuestionDraft, QuestionError,
    QuestionKind, SimulationDraft, SimulationMeta, ValidatedQuestion,
};
pub use report::{Grade, PASS_THRESHOLD_PCT, ReportError, TestReport, percent};

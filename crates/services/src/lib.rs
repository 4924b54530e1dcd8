#![forbid(unsafe_code)]

pub mod bank;
pub mod error;
pub mod sessions;

pub use exam_core::Clock;

pub use bank::{RemoteBank, RemoteQuestionRow};
pub use error::{BankFetchError, BankSyncError, SessionError};

pub use sessions::{
    AnswerRecord, ExamLoopService, ExamPlan, ExamSession, MissedAnswer, SelectionOutcome,
    SessionProgress, TestSlot,
};

//! Shared error types for the services crate.

use thiserror::Error;

use exam_core::model::ReportError;
use storage::repository::StorageError;

/// Errors emitted by session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for this test")]
    Empty,

    #[error("test {test_number} is out of range for a bank of {total} questions")]
    UnknownTest { test_number: u32, total: u32 },

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `RemoteBank` fetches.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankFetchError {
    #[error("question bank request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("invalid question record {number}: {message}")]
    InvalidRecord { number: u32, message: String },
}

/// Errors emitted while importing a remote bank into local storage.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankSyncError {
    #[error(transparent)]
    Fetch(#[from] BankFetchError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

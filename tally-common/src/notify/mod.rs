//! Run logic for the two recurring notification checks. The job-scheduler
//! binary drives these on timers; the server binary drives them from the
//! HTTP trigger endpoints.

pub mod expense_summary;
pub mod reminder_check;

use std::fmt;
use tokio::task::JoinError;

use crate::db::DaoError;

#[derive(Debug)]
pub enum NotifyError {
    DaoFailure(DaoError),
    ConcurrencyError(JoinError),
}

impl std::error::Error for NotifyError {}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyError::DaoFailure(e) => write!(f, "NotifyError: {e}"),
            NotifyError::ConcurrencyError(e) => write!(f, "NotifyError: ConcurrencyError: {e}"),
        }
    }
}

impl From<DaoError> for NotifyError {
    fn from(e: DaoError) -> Self {
        NotifyError::DaoFailure(e)
    }
}

impl From<JoinError> for NotifyError {
    fn from(e: JoinError) -> Self {
        NotifyError::ConcurrencyError(e)
    }
}

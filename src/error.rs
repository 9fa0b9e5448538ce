use chrono::NaiveDate;
use thiserror::Error;

use crate::store::StoreError;

/// Policy-level rejections: the operation was well-formed but the calendar or
/// the request state does not allow it. Never coerced silently.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyViolation {
    #[error("{0} is not a working day")]
    NonWorkingDay(NaiveDate),
    #[error("{0} is a holiday")]
    HolidayDay(NaiveDate),
    #[error("invalid date selection: {0}")]
    InvalidDateSelection(String),
    #[error("no days selected for approval")]
    NoDaysSelected,
    #[error("{0} is no longer an approvable day")]
    NonApprovableDay(NaiveDate),
    #[error("approved units ({approved}) exceed requested units ({requested})")]
    ExceedsRequested { approved: f64, requested: f64 },
}

/// State conflicts: the record already moved on. The caller should refresh
/// rather than retry blindly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Conflict {
    #[error("already checked in today")]
    AlreadyCheckedIn,
    #[error("already checked out today")]
    AlreadyCheckedOut,
    #[error("no active check-in found for today")]
    NoCheckInYet,
    #[error("leave request not found or already processed")]
    AlreadyProcessed,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("validation failed on `{field}`: {message}")]
    Validation { field: &'static str, message: String },

    #[error(transparent)]
    Policy(#[from] PolicyViolation),

    #[error(transparent)]
    Conflict(#[from] Conflict),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        EngineError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        EngineError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

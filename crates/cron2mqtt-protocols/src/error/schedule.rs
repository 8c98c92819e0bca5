//! Schedule parsing errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("invalid schedule {expression:?}: {message}")]
    Invalid { expression: String, message: String },

    #[error("schedule {0:?} is not supported")]
    Unsupported(String),
}

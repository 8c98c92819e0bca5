//! Device identity errors.

use thiserror::Error;

use super::TopicError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    #[error("could not determine machine id: {0}")]
    MachineId(String),

    #[error("could not determine current user: {0}")]
    User(String),

    #[error("could not determine hostname: {0}")]
    Hostname(String),

    #[error("device identity cannot be used in a topic: {0}")]
    InvalidIdentity(#[from] TopicError),
}

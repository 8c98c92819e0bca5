//! Publish-time errors.

use thiserror::Error;

use super::{MultiError, TransportError};
use crate::transport::{RetainMode, SweepOutcome};

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("plugin {plugin} did not register topic {topic}")]
    UnregisteredTopic { plugin: String, topic: String },

    #[error("plugin {plugin} did not register topic {topic} for {retain}")]
    RetainNotRegistered {
        plugin: String,
        topic: String,
        retain: RetainMode,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("could not encode payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("retained topics under {filter} were not all found: sweep ended {outcome:?}")]
    IncompleteSweep {
        filter: String,
        outcome: SweepOutcome,
    },

    #[error("plugin {plugin} failed: {message}")]
    Plugin { plugin: String, message: String },

    #[error(transparent)]
    Multiple(MultiError<PublishError>),
}

impl PublishError {
    /// Every leaf error, with nested aggregates expanded.
    pub fn flatten(self) -> Vec<PublishError> {
        match self {
            Self::Multiple(errs) => errs.into_iter().flat_map(Self::flatten).collect(),
            err => vec![err],
        }
    }
}

impl From<MultiError<PublishError>> for PublishError {
    fn from(errs: MultiError<PublishError>) -> Self {
        let mut flat: Vec<PublishError> = errs.into_iter().flat_map(Self::flatten).collect();
        if flat.len() == 1 {
            flat.remove(0)
        } else {
            Self::Multiple(flat.into_iter().collect())
        }
    }
}

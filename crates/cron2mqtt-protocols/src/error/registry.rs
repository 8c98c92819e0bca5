//! Errors raised while constructing a cron job registry entry.

use thiserror::Error;

use super::{DeviceError, MultiError, PublishError, TopicError};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("provided cron job ID is invalid: {0}")]
    InvalidJobId(#[source] TopicError),

    #[error(transparent)]
    InvalidTopic(#[from] TopicError),

    #[error("plugin {plugin} tried to register suffix {suffix:?} which was already registered by {owner}")]
    SuffixCollision {
        plugin: String,
        suffix: String,
        owner: String,
    },

    #[error("plugin {plugin} tried to register topic {topic:?} which was already registered by {owner}")]
    TopicCollision {
        plugin: String,
        topic: String,
        owner: String,
    },

    #[error("plugin {plugin} failed to initialize: {message}")]
    PluginInit { plugin: String, message: String },

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error("could not announce cron job: {0}")]
    Announce(#[source] PublishError),

    #[error(transparent)]
    Multiple(MultiError<RegistryError>),
}

impl From<MultiError<RegistryError>> for RegistryError {
    fn from(errs: MultiError<RegistryError>) -> Self {
        let mut errs = errs.into_errors();
        if errs.len() == 1 {
            errs.remove(0)
        } else {
            Self::Multiple(errs.into_iter().collect())
        }
    }
}

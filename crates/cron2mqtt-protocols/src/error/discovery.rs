//! Discovery sweep errors.

use thiserror::Error;

use super::{DeviceError, RegistryError, TransportError};

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("could not subscribe to MQTT: {0}")]
    Subscribe(#[source] TransportError),

    #[error("could not create cron job {id:?}: {source}")]
    Job { id: String, source: RegistryError },

    #[error(transparent)]
    Device(#[from] DeviceError),
}

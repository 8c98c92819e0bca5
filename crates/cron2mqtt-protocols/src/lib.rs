//! # cron2mqtt Protocols
//!
//! Core protocol definitions (traits and wire types) for cron2mqtt.
//! Contains only interface definitions - no broker implementations.
//!
//! ## Core Traits
//!
//! - [`Transport`] - Capability contract for a connected MQTT broker client
//! - [`Clock`] - Source of "current time" injected into time-dependent code
//!
//! ## Core Types
//!
//! - [`Message`] - A message delivered by a subscription
//! - [`ExecResult`] - Outcome of one execution of a cron job's command

pub mod clock;
pub mod error;
pub mod execution;
pub mod transport;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{
    DeviceError, DiscoveryError, MultiError, PublishError, RegistryError, ScheduleError, TopicError,
    TransportError,
};
pub use execution::ExecResult;
pub use transport::{Message, QoS, RetainMode, SweepOutcome, Transport};

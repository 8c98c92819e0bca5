//! In-process MQTT broker for cron2mqtt.
//!
//! Implements [`Transport`](cron2mqtt_protocols::Transport) with retained
//! messages, wildcard subscriptions and per-topic acknowledgement counters.
//! Used by tests and dry runs where no real broker is available.

mod broker;
mod topic_filter;

pub use broker::{MemoryBroker, Published};
pub use topic_filter::{is_valid_filter, topic_matches};

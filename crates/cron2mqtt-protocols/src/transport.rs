//! Transport protocol definitions.
//!
//! A [`Transport`] is a connected broker client. It is the only component
//! that performs network I/O; everything else in cron2mqtt is expressed in
//! terms of it.
//!
//! ## Contract
//!
//! - `publish` is at-least-once and resolves once the broker acknowledged it.
//! - `subscribe` resolves once the subscription is in place. Every matching
//!   message, including the backlog of retained messages, is then forwarded to
//!   the provided sender. The sender is dropped (closing the stream) when the
//!   cancellation token fires or the subscription otherwise ends.
//! - Implementations must tolerate concurrent `publish` calls.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::TransportError;

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;

/// MQTT quality of service levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QoS {
    AtMostOnce = 0,
    AtLeastOnce = 1,
    ExactlyOnce = 2,
}

impl QoS {
    /// The numeric level used on the wire.
    pub fn level(self) -> u8 {
        self as u8
    }
}

impl Default for QoS {
    fn default() -> Self {
        Self::ExactlyOnce
    }
}

/// Whether the broker should keep a message as the topic's last known value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RetainMode {
    Retain,
    DoNotRetain,
}

impl RetainMode {
    pub fn is_retain(self) -> bool {
        matches!(self, Self::Retain)
    }
}

impl From<bool> for RetainMode {
    fn from(retain: bool) -> Self {
        if retain {
            Self::Retain
        } else {
            Self::DoNotRetain
        }
    }
}

impl fmt::Display for RetainMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Retain => write!(f, "Retain"),
            Self::DoNotRetain => write!(f, "DoNotRetain"),
        }
    }
}

type AckFn = Arc<dyn Fn() + Send + Sync>;

/// A message delivered to a subscriber.
#[derive(Clone)]
pub struct Message {
    topic: String,
    payload: Bytes,
    qos: QoS,
    retained: bool,
    acker: Option<AckFn>,
}

impl Message {
    /// Create a new message.
    pub fn new(
        topic: impl Into<String>,
        payload: impl Into<Bytes>,
        qos: QoS,
        retained: bool,
    ) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            qos,
            retained,
            acker: None,
        }
    }

    /// Attach the callback invoked by [`Message::ack`].
    pub fn with_ack<F>(mut self, ack: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.acker = Some(Arc::new(ack));
        self
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn qos(&self) -> QoS {
        self.qos
    }

    /// Whether the broker delivered this message from its retained store.
    pub fn retained(&self) -> bool {
        self.retained
    }

    /// Acknowledge receipt to the broker.
    pub fn ack(&self) {
        if let Some(ack) = &self.acker {
            ack();
        }
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("topic", &self.topic)
            .field("payload", &String::from_utf8_lossy(&self.payload))
            .field("qos", &self.qos)
            .field("retained", &self.retained)
            .finish()
    }
}

/// Why a sweep over retained messages ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepOutcome {
    /// No retained message arrived within the quiescence window.
    Quiescent,
    /// The caller's cancellation token fired.
    Cancelled,
    /// The overall timeout elapsed.
    TimedOut,
    /// The transport closed the subscription.
    SubscriptionClosed,
}

impl SweepOutcome {
    /// Whether the whole retained backlog was seen.
    pub fn is_complete(self) -> bool {
        matches!(self, Self::Quiescent)
    }
}

/// Capability contract for a connected MQTT client.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Publish `payload` on `topic` and wait for the broker's acknowledgement.
    async fn publish(
        &self,
        topic: &str,
        qos: QoS,
        retain: RetainMode,
        payload: Bytes,
    ) -> Result<(), TransportError>;

    /// Subscribe to `topic` (which may contain `+` and `#` wildcards).
    ///
    /// Matching messages are sent to `messages` until `cancel` fires, at which
    /// point the subscription is torn down and `messages` is dropped.
    async fn subscribe(
        &self,
        cancel: CancellationToken,
        topic: &str,
        qos: QoS,
        messages: mpsc::Sender<Message>,
    ) -> Result<(), TransportError>;
}

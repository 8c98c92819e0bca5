//! In-memory broker implementation.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use cron2mqtt_protocols::{Message, QoS, RetainMode, Transport, TransportError};

use crate::topic_filter::{is_valid_filter, topic_matches};

#[cfg(test)]
#[path = "broker_tests.rs"]
mod tests;

/// A publish the broker accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub topic: String,
    pub qos: QoS,
    pub retain: RetainMode,
    pub payload: Bytes,
}

struct Subscription {
    filter: String,
    qos: QoS,
    sender: mpsc::UnboundedSender<Message>,
    cancel: CancellationToken,
}

impl Subscription {
    fn is_active(&self) -> bool {
        !self.cancel.is_cancelled() && !self.sender.is_closed()
    }
}

#[derive(Default)]
struct Inner {
    retained: BTreeMap<String, (QoS, Bytes)>,
    subscriptions: Vec<Subscription>,
    history: Vec<Published>,
    acks: HashMap<String, usize>,
    publish_failures: HashMap<String, TransportError>,
    subscribe_failure: Option<TransportError>,
}

/// Broker that lives entirely inside the process.
///
/// Cloning is cheap; clones share the same state.
#[derive(Clone, Default)]
pub struct MemoryBroker {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payload currently retained for `topic`.
    pub fn retained(&self, topic: &str) -> Option<Bytes> {
        self.inner
            .lock()
            .retained
            .get(topic)
            .map(|(_, payload)| payload.clone())
    }

    /// Every topic holding a retained payload, sorted.
    pub fn retained_topics(&self) -> Vec<String> {
        self.inner.lock().retained.keys().cloned().collect()
    }

    /// Every accepted publish, in order.
    pub fn published(&self) -> Vec<Published> {
        self.inner.lock().history.clone()
    }

    /// Accepted publishes to one topic, in order.
    pub fn published_to(&self, topic: &str) -> Vec<Published> {
        self.inner
            .lock()
            .history
            .iter()
            .filter(|p| p.topic == topic)
            .cloned()
            .collect()
    }

    pub fn publish_count(&self) -> usize {
        self.inner.lock().history.len()
    }

    /// How many times messages delivered for `topic` were acknowledged.
    pub fn ack_count(&self, topic: &str) -> usize {
        self.inner.lock().acks.get(topic).copied().unwrap_or(0)
    }

    pub fn total_acks(&self) -> usize {
        self.inner.lock().acks.values().sum()
    }

    /// Subscriptions that are still delivering messages.
    pub fn subscriber_count(&self) -> usize {
        let mut inner = self.inner.lock();
        inner.subscriptions.retain(Subscription::is_active);
        inner.subscriptions.len()
    }

    /// Make every publish to `topic` fail with `err`.
    pub fn fail_publishes_to(&self, topic: impl Into<String>, err: TransportError) {
        self.inner.lock().publish_failures.insert(topic.into(), err);
    }

    /// Make every subscribe fail with `err`.
    pub fn fail_subscribes(&self, err: TransportError) {
        self.inner.lock().subscribe_failure = Some(err);
    }

    pub fn clear_failures(&self) {
        let mut inner = self.inner.lock();
        inner.publish_failures.clear();
        inner.subscribe_failure = None;
    }

    fn message(&self, topic: &str, payload: Bytes, qos: QoS, retained: bool) -> Message {
        let inner = Arc::downgrade(&self.inner);
        let acked = topic.to_string();
        Message::new(topic, payload, qos, retained).with_ack(move || {
            if let Some(inner) = inner.upgrade() {
                *inner.lock().acks.entry(acked.clone()).or_default() += 1;
            }
        })
    }
}

#[async_trait]
impl Transport for MemoryBroker {
    async fn publish(
        &self,
        topic: &str,
        qos: QoS,
        retain: RetainMode,
        payload: Bytes,
    ) -> Result<(), TransportError> {
        let mut inner = self.inner.lock();
        if let Some(err) = inner.publish_failures.get(topic) {
            return Err(err.clone());
        }

        trace!(topic, retain = %retain, len = payload.len(), "Publishing");
        inner.history.push(Published {
            topic: topic.to_string(),
            qos,
            retain,
            payload: payload.clone(),
        });

        if retain.is_retain() {
            if payload.is_empty() {
                inner.retained.remove(topic);
            } else {
                inner.retained.insert(topic.to_string(), (qos, payload.clone()));
            }
        }

        inner.subscriptions.retain(Subscription::is_active);
        let matching: Vec<(mpsc::UnboundedSender<Message>, QoS)> = inner
            .subscriptions
            .iter()
            .filter(|sub| topic_matches(&sub.filter, topic))
            .map(|sub| (sub.sender.clone(), effective_qos(sub.qos, qos)))
            .collect();
        drop(inner);

        for (sender, qos) in matching {
            // A closed receiver is pruned on the next publish.
            let _ = sender.send(self.message(topic, payload.clone(), qos, false));
        }
        Ok(())
    }

    async fn subscribe(
        &self,
        cancel: CancellationToken,
        topic: &str,
        qos: QoS,
        messages: mpsc::Sender<Message>,
    ) -> Result<(), TransportError> {
        if !is_valid_filter(topic) {
            return Err(TransportError::Subscribe {
                topic: topic.to_string(),
                message: "invalid topic filter".to_string(),
            });
        }

        let (sender, mut receiver) = mpsc::unbounded_channel();
        {
            let mut inner = self.inner.lock();
            if let Some(err) = &inner.subscribe_failure {
                return Err(err.clone());
            }

            let backlog: Vec<(String, QoS, Bytes)> = inner
                .retained
                .iter()
                .filter(|(t, _)| topic_matches(topic, t))
                .map(|(t, (q, payload))| (t.clone(), *q, payload.clone()))
                .collect();
            debug!(topic, retained = backlog.len(), "Subscribed");
            for (t, q, payload) in backlog {
                let _ = sender.send(self.message(&t, payload, effective_qos(qos, q), true));
            }

            inner.subscriptions.push(Subscription {
                filter: topic.to_string(),
                qos,
                sender,
                cancel: cancel.clone(),
            });
        }

        let topic = topic.to_string();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    received = receiver.recv() => match received {
                        Some(message) => {
                            if messages.send(message).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    },
                }
            }
            debug!(topic = %topic, "Unsubscribed");
        });

        Ok(())
    }
}

/// Delivery happens at the lower of the subscription and publish QoS.
fn effective_qos(subscribed: QoS, published: QoS) -> QoS {
    if subscribed.level() <= published.level() {
        subscribed
    } else {
        published
    }
}

//! Publishing on behalf of a plugin.

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use cron2mqtt_protocols::{PublishError, QoS, RetainMode, Transport};

use crate::register::TopicMap;

/// Publishes messages for one plugin.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(
        &self,
        topic: &str,
        qos: QoS,
        retain: RetainMode,
        payload: Bytes,
    ) -> Result<(), PublishError>;
}

/// Publisher that only lets a plugin use the topics it claimed.
pub struct LimitedPublisher<'a> {
    transport: &'a dyn Transport,
    plugin: &'a str,
    topics: &'a TopicMap,
}

impl<'a> LimitedPublisher<'a> {
    pub fn new(transport: &'a dyn Transport, plugin: &'a str, topics: &'a TopicMap) -> Self {
        Self {
            transport,
            plugin,
            topics,
        }
    }

    fn check(&self, topic: &str, retain: RetainMode) -> Result<(), PublishError> {
        match self.topics.get(topic) {
            None => Err(PublishError::UnregisteredTopic {
                plugin: self.plugin.to_string(),
                topic: topic.to_string(),
            }),
            Some(claimed) if retain.is_retain() && !claimed.is_retain() => {
                Err(PublishError::RetainNotRegistered {
                    plugin: self.plugin.to_string(),
                    topic: topic.to_string(),
                    retain,
                })
            }
            Some(_) => Ok(()),
        }
    }
}

#[async_trait]
impl Publisher for LimitedPublisher<'_> {
    async fn publish(
        &self,
        topic: &str,
        qos: QoS,
        retain: RetainMode,
        payload: Bytes,
    ) -> Result<(), PublishError> {
        self.check(topic, retain)?;
        debug!(plugin = self.plugin, topic, %retain, "Publishing");
        self.transport.publish(topic, qos, retain, payload).await?;
        Ok(())
    }
}

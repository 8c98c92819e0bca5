//! Home Assistant discovery plugin.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use cron2mqtt_core::core_plugin::EXIT_CODE_ATTRIBUTE;
use cron2mqtt_core::{
    CronJob, JobInfo, JobSchedule, Plugin, Publisher, TopicRegister, validate_topic_component,
};
use cron2mqtt_protocols::{PublishError, QoS, RegistryError, RetainMode};

use crate::command::command_name;
use crate::discovery_config::{BinarySensor, DeviceConfig, Seconds};

#[cfg(test)]
#[path = "plugin_tests.rs"]
mod tests;

pub const DEFAULT_DISCOVERY_PREFIX: &str = "homeassistant";

const FAILURE_STATE: &str = "failure";
const SUCCESS_STATE: &str = "success";
const EXPIRY_GRACE_SECS: i64 = 60;

/// Announces each job as a Home Assistant `binary_sensor` with device class
/// `problem`.
#[derive(Debug, Clone)]
pub struct HassPlugin {
    discovery_prefix: String,
    config_topic: String,
}

impl HassPlugin {
    pub const NAME: &'static str = "HassPlugin";

    pub fn new(discovery_prefix: impl Into<String>) -> Self {
        Self {
            discovery_prefix: discovery_prefix.into(),
            config_topic: String::new(),
        }
    }

    /// Topic the discovery config is retained on, once initialized.
    pub fn config_topic(&self) -> &str {
        &self.config_topic
    }

    fn sensor(&self, job: &CronJob) -> BinarySensor {
        let device = job.device();
        BinarySensor {
            base_topic: job.core_topics().results.clone(),
            state_topic: "~".to_string(),
            value_template: format!(
                "{{% if value_json.{} == 0 %}}{}{{% else %}}{}{{% endif %}}",
                EXIT_CODE_ATTRIBUTE, SUCCESS_STATE, FAILURE_STATE
            ),
            json_attributes_topic: "~".to_string(),
            device: DeviceConfig {
                name: device.hostname().to_string(),
                identifiers: vec![device.id().to_string()],
            },
            unique_id: job.id().to_string(),
            object_id: format!("cron_job_{}", job.id()),
            name: format!(
                "[{}@{}] {}",
                device.username(),
                device.hostname(),
                command_name(job.id(), job.command())
            ),
            device_class: "problem".to_string(),
            icon: "mdi:robot".to_string(),
            expire_after: job
                .schedule()
                .and_then(|schedule| expire_after(schedule, job.clock().now()))
                .map(Seconds),
            // "problem" sensors are on when something is wrong.
            payload_on: FAILURE_STATE.to_string(),
            payload_off: SUCCESS_STATE.to_string(),
        }
    }
}

impl Default for HassPlugin {
    fn default() -> Self {
        Self::new(DEFAULT_DISCOVERY_PREFIX)
    }
}

#[async_trait]
impl Plugin for HassPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn init(&mut self, job: &JobInfo, register: &mut TopicRegister) -> Result<(), RegistryError> {
        let device = job.device();
        let node_id = format!("cron2mqtt_{}_{}", device.id(), device.uid());
        validate_topic_component(&node_id).map_err(|e| RegistryError::PluginInit {
            plugin: Self::NAME.to_string(),
            message: format!("calculated node ID is invalid: {}", e),
        })?;

        self.config_topic = format!(
            "{}/binary_sensor/{}/{}/config",
            self.discovery_prefix,
            node_id,
            job.id()
        );
        register.register_topic(&self.config_topic, RetainMode::Retain);
        Ok(())
    }

    async fn on_create(
        &self,
        job: &CronJob,
        publisher: &dyn Publisher,
    ) -> Result<(), PublishError> {
        let sensor = self.sensor(job);
        let payload = serde_json::to_vec(&sensor)?;
        debug!(
            topic = %self.config_topic,
            expire_after = ?sensor.expire_after,
            "Publishing discovery config"
        );
        publisher
            .publish(
                &self.config_topic,
                QoS::ExactlyOnce,
                RetainMode::Retain,
                Bytes::from(payload),
            )
            .await
    }
}

/// How long after `now` a sensor should be considered stale.
///
/// That is a minute after the next run, or half the gap between the next two
/// runs if that is sooner. `None` when the schedule never fires again.
pub fn expire_after(schedule: &JobSchedule, now: DateTime<Utc>) -> Option<Duration> {
    let next = schedule.next_after(now)?;
    let second = schedule.next_after(next)?;
    let gap = second - next;

    let expiry = (next + TimeDelta::seconds(EXPIRY_GRACE_SECS)).min(next + gap / 2);
    (expiry - now).to_std().ok()
}

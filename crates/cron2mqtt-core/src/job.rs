//! Cron job registry entries.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::{FutureExt, future};
use tokio_util::sync::CancellationToken;
use tracing::{Level, debug};

use cron2mqtt_config::Config;
use cron2mqtt_protocols::{
    Clock, ExecResult, PublishError, QoS, RegistryError, RetainMode, SweepOutcome, SystemClock,
    Transport,
};

use crate::core_plugin::{CorePlugin, CoreTopics};
use crate::device::Device;
use crate::discovery::{SweepOptions, discover_retained_messages};
use crate::fanout::{PublishOp, multi_publish};
use crate::logutil::TimerLog;
use crate::plugin::Plugin;
use crate::publisher::LimitedPublisher;
use crate::register::{TopicMap, TopicRegister};
use crate::schedule::JobSchedule;
use crate::topic::validate_topic_component;

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;

/// What is known about a cron job before its plugins initialize.
#[derive(Debug, Clone)]
pub struct JobInfo {
    id: String,
    device: Device,
    topic_prefix: String,
    schedule: Option<JobSchedule>,
    command: Option<String>,
}

impl JobInfo {
    pub fn new(id: impl Into<String>, device: Device) -> Result<Self, RegistryError> {
        let id = id.into();
        validate_topic_component(&id).map_err(RegistryError::InvalidJobId)?;
        let topic_prefix = format!("{}/{}", device.topic_prefix(), id);
        Ok(Self {
            id,
            device,
            topic_prefix,
            schedule: None,
            command: None,
        })
    }

    pub fn with_schedule(mut self, schedule: JobSchedule) -> Self {
        self.schedule = Some(schedule);
        self
    }

    /// The command line as it appears in the crontab.
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// `<device prefix>/<job id>`
    pub fn topic_prefix(&self) -> &str {
        &self.topic_prefix
    }

    pub fn schedule(&self) -> Option<&JobSchedule> {
        self.schedule.as_ref()
    }

    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }
}

/// Runtime knobs shared by every operation on a job.
#[derive(Clone)]
pub struct JobOptions {
    /// Maximum publish operations in flight during a fan-out.
    pub max_concurrency: usize,
    pub sweep: SweepOptions,
    pub clock: Arc<dyn Clock>,
}

impl JobOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_concurrency: config.publish.max_concurrency,
            sweep: SweepOptions {
                quiescence: config.discovery.quiescence(),
                timeout: config.discovery.timeout(),
            },
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_quiescence(mut self, quiescence: Duration) -> Self {
        self.sweep.quiescence = quiescence;
        self
    }
}

impl Default for JobOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl fmt::Debug for JobOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobOptions")
            .field("max_concurrency", &self.max_concurrency)
            .field("sweep", &self.sweep)
            .finish_non_exhaustive()
    }
}

/// A cron job announced over MQTT, with the topics its plugins own.
///
/// The [`CorePlugin`] is always the first plugin. Topic claims are fixed
/// once the job is built.
pub struct CronJob {
    info: JobInfo,
    transport: Arc<dyn Transport>,
    plugins: Vec<Box<dyn Plugin>>,
    topics: Vec<TopicMap>,
    core_topics: CoreTopics,
    options: JobOptions,
}

impl CronJob {
    /// Build the job and publish every plugin's announcement.
    pub async fn create(
        info: JobInfo,
        transport: Arc<dyn Transport>,
        plugins: Vec<Box<dyn Plugin>>,
        options: JobOptions,
    ) -> Result<Self, RegistryError> {
        let job = Self::load(info, transport, plugins, options)?;
        job.on_create().await.map_err(RegistryError::Announce)?;
        Ok(job)
    }

    /// Build the job without announcing it.
    ///
    /// Used for jobs that were announced earlier, e.g. ones found by discovery.
    pub fn load(
        info: JobInfo,
        transport: Arc<dyn Transport>,
        plugins: Vec<Box<dyn Plugin>>,
        options: JobOptions,
    ) -> Result<Self, RegistryError> {
        let mut register = TopicRegister::new(info.topic_prefix());

        let mut core = CorePlugin::new();
        init_plugin(&mut core, &info, &mut register);
        let core_topics = core.topics().clone();

        let mut all: Vec<Box<dyn Plugin>> = Vec::with_capacity(plugins.len() + 1);
        all.push(Box::new(core));
        for mut plugin in plugins {
            init_plugin(plugin.as_mut(), &info, &mut register);
            all.push(plugin);
        }

        let topics = register.finish()?;
        debug!(id = %info.id(), plugins = all.len(), "Initialized cron job");
        Ok(Self {
            info,
            transport,
            plugins: all,
            topics,
            core_topics,
            options,
        })
    }

    pub fn id(&self) -> &str {
        self.info.id()
    }

    pub fn info(&self) -> &JobInfo {
        &self.info
    }

    pub fn device(&self) -> &Device {
        self.info.device()
    }

    pub fn topic_prefix(&self) -> &str {
        self.info.topic_prefix()
    }

    pub fn schedule(&self) -> Option<&JobSchedule> {
        self.info.schedule()
    }

    pub fn command(&self) -> Option<&str> {
        self.info.command()
    }

    /// Topics owned by the [`CorePlugin`].
    pub fn core_topics(&self) -> &CoreTopics {
        &self.core_topics
    }

    pub fn options(&self) -> &JobOptions {
        &self.options
    }

    pub fn clock(&self) -> &dyn Clock {
        self.options.clock.as_ref()
    }

    /// Each plugin's name with the topics it claimed, in plugin order.
    pub fn topics(&self) -> impl Iterator<Item = (&str, &TopicMap)> {
        self.plugins
            .iter()
            .zip(&self.topics)
            .map(|(plugin, topics)| (plugin.name(), topics))
    }

    async fn on_create(&self) -> Result<(), PublishError> {
        let ops: Vec<PublishOp<'_, PublishError>> = self
            .plugins
            .iter()
            .zip(&self.topics)
            .map(|(plugin, topics)| {
                async move {
                    let _timer =
                        TimerLog::start(Level::TRACE, format!("{}#on_create", plugin.name()));
                    let publisher =
                        LimitedPublisher::new(self.transport.as_ref(), plugin.name(), topics);
                    plugin.on_create(self, &publisher).await
                }
                .boxed()
            })
            .collect();
        multi_publish(self.options.max_concurrency, ops)
            .await
            .map_err(PublishError::from)
    }

    /// Publish one execution result through every plugin.
    pub async fn publish_result(&self, result: &ExecResult) -> Result<(), PublishError> {
        let ops: Vec<PublishOp<'_, PublishError>> = self
            .plugins
            .iter()
            .zip(&self.topics)
            .map(|(plugin, topics)| {
                async move {
                    let _timer =
                        TimerLog::start(Level::TRACE, format!("{}#publish_result", plugin.name()));
                    let publisher =
                        LimitedPublisher::new(self.transport.as_ref(), plugin.name(), topics);
                    plugin.publish_result(self, &publisher, result).await
                }
                .boxed()
            })
            .collect();
        multi_publish(self.options.max_concurrency, ops)
            .await
            .map_err(PublishError::from)
    }

    /// Clear every retained topic this job published.
    ///
    /// Topics under the job prefix are found with a retained-message sweep;
    /// retained topics claimed outside the prefix are cleared directly.
    /// Failures are collected, not retried.
    pub async fn unpublish(&self, cancel: &CancellationToken) -> Result<(), PublishError> {
        let mut ops: Vec<PublishOp<'_, PublishError>> = vec![self.unpublish_prefix(cancel).boxed()];
        for topic in self.retained_topics_outside_prefix() {
            ops.push(self.unpublish_topic(topic).boxed());
        }
        multi_publish(self.options.max_concurrency, ops)
            .await
            .map_err(PublishError::from)
    }

    fn retained_topics_outside_prefix(&self) -> Vec<&str> {
        let prefix = format!("{}/", self.topic_prefix());
        let mut topics: Vec<&str> = self
            .topics
            .iter()
            .flat_map(|claimed| claimed.iter())
            .filter(|(topic, retain)| retain.is_retain() && !topic.starts_with(&prefix))
            .map(|(topic, _)| topic.as_str())
            .collect();
        topics.sort_unstable();
        topics
    }

    async fn unpublish_prefix(&self, cancel: &CancellationToken) -> Result<(), PublishError> {
        let _timer = TimerLog::start(
            Level::DEBUG,
            format!("Unpublishing by prefix {}", self.topic_prefix()),
        );

        let filter = format!("{}/#", self.topic_prefix());
        let sweep =
            discover_retained_messages(self.transport.clone(), &filter, cancel, self.options.sweep)
                .await?;
        let (messages, outcome) = sweep.drain().await;
        debug!(found = messages.len(), ?outcome, "Found retained topics");

        for message in &messages {
            message.ack();
        }
        if outcome == SweepOutcome::Cancelled {
            return Err(PublishError::IncompleteSweep { filter, outcome });
        }

        // Whatever was found is cleared even if the sweep was cut short.
        let mut ops: Vec<PublishOp<'_, PublishError>> = messages
            .iter()
            .map(|message| self.unpublish_topic(message.topic()).boxed())
            .collect();
        if !outcome.is_complete() {
            ops.push(future::ready(Err(PublishError::IncompleteSweep { filter, outcome })).boxed());
        }
        multi_publish(self.options.max_concurrency, ops)
            .await
            .map_err(PublishError::from)
    }

    async fn unpublish_topic(&self, topic: &str) -> Result<(), PublishError> {
        self.transport
            .publish(topic, QoS::ExactlyOnce, RetainMode::Retain, Bytes::new())
            .await?;
        Ok(())
    }
}

impl fmt::Debug for CronJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CronJob")
            .field("id", &self.info.id())
            .field("topic_prefix", &self.info.topic_prefix())
            .field(
                "plugins",
                &self.plugins.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

fn init_plugin(plugin: &mut dyn Plugin, info: &JobInfo, register: &mut TopicRegister) {
    register.begin(plugin.name());
    if let Err(err) = plugin.init(info, register) {
        register.record(err);
    }
}

//! Retained-message discovery.
//!
//! A broker cannot list retained messages. Subscribing delivers every
//! retained message that matches, but nothing marks the end of that backlog.
//! A sweep therefore treats the backlog as exhausted once no retained message
//! has arrived for a quiescence window. This is a heuristic: a loaded broker
//! may deliver a retained message after the window closes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use cron2mqtt_protocols::{DiscoveryError, Message, QoS, Transport, TransportError};

use crate::core_plugin::DISCOVERY_SUFFIX;
use crate::device::Device;
use crate::job::{CronJob, JobInfo, JobOptions};
use crate::plugin::Plugin;
use crate::topic::strip_segment;

pub use cron2mqtt_protocols::SweepOutcome;

#[cfg(test)]
#[path = "discovery_tests.rs"]
mod tests;

const CHANNEL_CAPACITY: usize = 100;

/// Timing of a retained-message sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOptions {
    /// Idle time after which the backlog is considered exhausted.
    pub quiescence: Duration,
    /// Upper bound on the whole sweep.
    pub timeout: Option<Duration>,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            quiescence: Duration::from_millis(200),
            timeout: None,
        }
    }
}

/// One step of a sweep.
#[derive(Debug)]
pub enum SweepEvent {
    Retained(Message),
    Finished(SweepOutcome),
}

/// A running sweep over retained messages.
pub struct RetainedSweep {
    events: mpsc::Receiver<SweepEvent>,
    outcome: Option<SweepOutcome>,
}

impl RetainedSweep {
    /// Next retained message, or `None` once the sweep has ended.
    pub async fn next(&mut self) -> Option<Message> {
        if self.outcome.is_some() {
            return None;
        }
        match self.events.recv().await {
            Some(SweepEvent::Retained(message)) => Some(message),
            Some(SweepEvent::Finished(outcome)) => {
                self.outcome = Some(outcome);
                None
            }
            None => {
                self.outcome = Some(SweepOutcome::SubscriptionClosed);
                None
            }
        }
    }

    /// How the sweep ended, once [`next`](Self::next) has returned `None`.
    pub fn outcome(&self) -> Option<SweepOutcome> {
        self.outcome
    }

    /// Collect every remaining message and the reason the sweep ended.
    pub async fn drain(mut self) -> (Vec<Message>, SweepOutcome) {
        let mut messages = Vec::new();
        while let Some(message) = self.next().await {
            messages.push(message);
        }
        (
            messages,
            self.outcome.unwrap_or(SweepOutcome::SubscriptionClosed),
        )
    }
}

/// Subscribe to `topic` and report retained messages until the backlog goes
/// quiet, the timeout elapses or `cancel` fires.
///
/// The idle timer starts when the subscription is made, so an empty backlog
/// ends by quiescence too. The sweep holds `transport` until it ends, then
/// cancels the subscription.
pub async fn discover_retained_messages(
    transport: Arc<dyn Transport>,
    topic: &str,
    cancel: &CancellationToken,
    options: SweepOptions,
) -> Result<RetainedSweep, TransportError> {
    let subscription = cancel.child_token();
    let (tx, mut rx) = mpsc::channel::<Message>(CHANNEL_CAPACITY);
    if let Err(err) = transport
        .subscribe(subscription.clone(), topic, QoS::ExactlyOnce, tx)
        .await
    {
        subscription.cancel();
        return Err(err);
    }
    debug!(topic, "Sweeping retained messages");

    let (events, receiver) = mpsc::channel(CHANNEL_CAPACITY);
    let cancel = cancel.clone();
    let topic = topic.to_string();
    tokio::spawn(async move {
        let _unsubscribe = subscription.drop_guard();
        // The subscription lives only as long as its transport.
        let _transport = transport;

        let idle = tokio::time::sleep(options.quiescence);
        tokio::pin!(idle);
        let deadline = options.timeout.map(|timeout| Instant::now() + timeout);
        let overall = async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(overall);

        let mut found = 0usize;
        let outcome = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break SweepOutcome::Cancelled,
                _ = &mut overall => break SweepOutcome::TimedOut,
                _ = &mut idle => break SweepOutcome::Quiescent,
                received = rx.recv() => {
                    let Some(message) = received else {
                        break SweepOutcome::SubscriptionClosed;
                    };
                    if !message.retained() {
                        continue;
                    }
                    idle.as_mut().reset(Instant::now() + options.quiescence);
                    found += 1;

                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break SweepOutcome::Cancelled,
                        sent = events.send(SweepEvent::Retained(message)) => {
                            if sent.is_err() {
                                debug!(topic = %topic, "Sweep consumer went away");
                                return;
                            }
                        }
                    }
                }
            }
        };

        debug!(topic = %topic, found, ?outcome, "Sweep finished");
        let _ = events.send(SweepEvent::Finished(outcome)).await;
    });

    Ok(RetainedSweep {
        events: receiver,
        outcome: None,
    })
}

/// Builds a fresh plugin for each discovered job.
pub type PluginFactory = Box<dyn Fn() -> Box<dyn Plugin> + Send + Sync>;

/// Jobs found by [`discover_remote_cron_jobs`].
#[derive(Debug)]
pub struct DiscoveredJobs {
    pub jobs: Vec<CronJob>,
    pub outcome: SweepOutcome,
}

/// Find every job this device and user announced earlier.
///
/// Each job is loaded without being announced again, with one plugin from
/// every factory. Each discovery message is acknowledged once its job loads.
pub async fn discover_remote_cron_jobs(
    transport: Arc<dyn Transport>,
    device: &Device,
    cancel: &CancellationToken,
    options: &JobOptions,
    factories: &[PluginFactory],
) -> Result<DiscoveredJobs, DiscoveryError> {
    let filter = format!("{}/+/{}", device.topic_prefix(), DISCOVERY_SUFFIX);
    let mut sweep = discover_retained_messages(transport.clone(), &filter, cancel, options.sweep)
        .await
        .map_err(DiscoveryError::Subscribe)?;

    let mut jobs = Vec::new();
    while let Some(message) = sweep.next().await {
        let Some(id) = strip_segment(message.topic(), device.topic_prefix(), DISCOVERY_SUFFIX)
        else {
            warn!(topic = message.topic(), "Ignoring unexpected discovery topic");
            message.ack();
            continue;
        };

        let plugins = factories.iter().map(|factory| factory()).collect();
        let job = JobInfo::new(id, device.clone())
            .and_then(|info| CronJob::load(info, transport.clone(), plugins, options.clone()))
            .map_err(|source| DiscoveryError::Job {
                id: id.to_string(),
                source,
            })?;

        message.ack();
        jobs.push(job);
    }

    let outcome = sweep
        .outcome()
        .unwrap_or(SweepOutcome::SubscriptionClosed);
    debug!(found = jobs.len(), ?outcome, "Discovered cron jobs");
    Ok(DiscoveredJobs { jobs, outcome })
}

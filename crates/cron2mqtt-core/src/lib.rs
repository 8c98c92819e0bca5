//! # cron2mqtt Core
//!
//! The job registry protocol: how a machine announces its cron jobs on an
//! MQTT broker, publishes their results and later finds and removes them.
//!
//! ## Components
//!
//! - [`Device`] - Stable identity of this machine and user
//! - [`TopicRegister`] - Topic claims made by plugins while a job initializes
//! - [`Plugin`] and [`CorePlugin`] - What gets published for a job
//! - [`CronJob`] - A job with its claimed topics
//! - [`discover_retained_messages`] and [`discover_remote_cron_jobs`] - Finding
//!   what was published earlier
//!
//! Topics are laid out as `cron2mqtt/<device id>/<uid>/<job id>/<suffix>`.

pub mod core_plugin;
pub mod device;
pub mod discovery;
pub mod exec;
pub mod fanout;
pub mod job;
pub mod logutil;
pub mod plugin;
pub mod publisher;
pub mod register;
pub mod schedule;
pub mod topic;

pub use core_plugin::{CorePlugin, CoreTopics, Metadata, Results};
pub use device::Device;
pub use discovery::{
    DiscoveredJobs, PluginFactory, RetainedSweep, SweepEvent, SweepOptions, SweepOutcome,
    discover_remote_cron_jobs, discover_retained_messages,
};
pub use fanout::{PublishOp, multi_publish};
pub use job::{CronJob, JobInfo, JobOptions};
pub use logutil::TimerLog;
pub use plugin::{NopPlugin, Plugin};
pub use publisher::{LimitedPublisher, Publisher};
pub use register::{TopicMap, TopicRegister};
pub use schedule::JobSchedule;
pub use topic::{ALLOWED_TOPIC_CHARACTERS, NAMESPACE_ROOT, validate_topic_component};

//! The built-in plugin every cron job starts with.
//!
//! | Suffix         | Retained | Published                      |
//! |----------------|----------|--------------------------------|
//! | `discovery`    | yes      | on create, `"1"`               |
//! | `metadata`     | yes      | on create, [`Metadata`]        |
//! | `results`      | no       | every result, [`Results`]      |
//! | `last_success` | yes      | results with exit code 0 only  |

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cron2mqtt_protocols::{ExecResult, PublishError, QoS, RegistryError, RetainMode};

use crate::fanout::{PublishOp, multi_publish};
use crate::job::{CronJob, JobInfo};
use crate::plugin::Plugin;
use crate::publisher::Publisher;
use crate::register::TopicRegister;

pub const DISCOVERY_SUFFIX: &str = "discovery";
pub const METADATA_SUFFIX: &str = "metadata";
pub const RESULTS_SUFFIX: &str = "results";
pub const LAST_SUCCESS_SUFFIX: &str = "last_success";

/// JSON attribute holding the exit code in [`Results`].
pub const EXIT_CODE_ATTRIBUTE: &str = "exit_code";
/// JSON attribute holding the duration in [`Results`].
pub const DURATION_ATTRIBUTE: &str = "duration_ms";

/// Topics claimed by the [`CorePlugin`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoreTopics {
    pub discovery: String,
    pub metadata: String,
    pub results: String,
    pub last_success: String,
}

/// Payload of the `metadata` topic. Unknown values are sent as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub schedule: Option<String>,
    pub next_execution_time: Option<DateTime<Utc>>,
}

/// Payload of the `results` and `last_success` topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Results {
    pub args: Vec<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_ms: i64,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl From<&ExecResult> for Results {
    fn from(result: &ExecResult) -> Self {
        Self {
            args: result.args.clone(),
            start_time: result.start,
            end_time: result.end,
            duration_ms: result.duration().num_milliseconds(),
            stdout: String::from_utf8_lossy(&result.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&result.stderr).into_owned(),
            exit_code: result.exit_code,
        }
    }
}

/// Publishes the canonical cron2mqtt schema.
#[derive(Debug, Default)]
pub struct CorePlugin {
    topics: CoreTopics,
}

impl CorePlugin {
    pub const NAME: &'static str = "CorePlugin";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn topics(&self) -> &CoreTopics {
        &self.topics
    }
}

#[async_trait]
impl Plugin for CorePlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn init(&mut self, _job: &JobInfo, register: &mut TopicRegister) -> Result<(), RegistryError> {
        self.topics = CoreTopics {
            discovery: register.register_suffix(DISCOVERY_SUFFIX),
            metadata: register.register_suffix(METADATA_SUFFIX),
            results: register.register_suffix(RESULTS_SUFFIX),
            last_success: register.register_suffix(LAST_SUCCESS_SUFFIX),
        };
        Ok(())
    }

    async fn on_create(
        &self,
        job: &CronJob,
        publisher: &dyn Publisher,
    ) -> Result<(), PublishError> {
        let schedule = job.schedule();
        let metadata = Metadata {
            schedule: schedule.map(|s| s.expression().to_string()),
            next_execution_time: schedule.and_then(|s| s.next_after(job.clock().now())),
        };
        let payload = Bytes::from(serde_json::to_vec(&metadata)?);

        let ops: Vec<PublishOp<'_, PublishError>> = vec![
            publisher.publish(
                &self.topics.discovery,
                QoS::ExactlyOnce,
                RetainMode::Retain,
                Bytes::from_static(b"1"),
            ),
            publisher.publish(
                &self.topics.metadata,
                QoS::ExactlyOnce,
                RetainMode::Retain,
                payload,
            ),
        ];
        multi_publish(job.options().max_concurrency, ops)
            .await
            .map_err(PublishError::from)
    }

    async fn publish_result(
        &self,
        job: &CronJob,
        publisher: &dyn Publisher,
        result: &ExecResult,
    ) -> Result<(), PublishError> {
        let payload = Bytes::from(serde_json::to_vec(&Results::from(result))?);

        let mut ops: Vec<PublishOp<'_, PublishError>> = vec![publisher.publish(
            &self.topics.results,
            QoS::ExactlyOnce,
            RetainMode::DoNotRetain,
            payload.clone(),
        )];
        if result.succeeded() {
            ops.push(publisher.publish(
                &self.topics.last_success,
                QoS::ExactlyOnce,
                RetainMode::Retain,
                payload,
            ));
        }
        multi_publish(job.options().max_concurrency, ops)
            .await
            .map_err(PublishError::from)
    }
}

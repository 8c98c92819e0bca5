//! Plugin contract.

use async_trait::async_trait;

use cron2mqtt_protocols::{ExecResult, PublishError, RegistryError};

use crate::job::{CronJob, JobInfo};
use crate::publisher::Publisher;
use crate::register::TopicRegister;

/// Hooks that customize what a [`CronJob`] publishes.
///
/// Every hook has a no-op default. `init` runs once per job, in plugin
/// order, and may only claim topics. `on_create` and `publish_result` run
/// concurrently across plugins and must not depend on each other.
#[async_trait]
pub trait Plugin: Send + Sync + 'static {
    /// Name used in logs and error messages.
    fn name(&self) -> &str;

    /// Claim the topics this plugin will publish to.
    fn init(&mut self, _job: &JobInfo, _register: &mut TopicRegister) -> Result<(), RegistryError> {
        Ok(())
    }

    /// Publish announcement data when the job is created.
    async fn on_create(
        &self,
        _job: &CronJob,
        _publisher: &dyn Publisher,
    ) -> Result<(), PublishError> {
        Ok(())
    }

    /// Publish data about one execution.
    async fn publish_result(
        &self,
        _job: &CronJob,
        _publisher: &dyn Publisher,
        _result: &ExecResult,
    ) -> Result<(), PublishError> {
        Ok(())
    }
}

/// A plugin that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NopPlugin;

impl Plugin for NopPlugin {
    fn name(&self) -> &str {
        "NopPlugin"
    }
}

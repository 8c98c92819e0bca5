//! # cron2mqtt
//!
//! Announce cron jobs on an MQTT broker and publish what each run did.
//!
//! This crate ties the workspace together:
//!
//! - [`protocols`] - `Transport`, wire types and errors
//! - [`config`] - TOML configuration
//! - [`registry`] - Device identity, topic register, plugins, jobs and discovery
//! - [`hass`] - Home Assistant discovery plugin
//! - [`memory`] - In-process broker
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use cron2mqtt::registry::{CronJob, Device, JobInfo, JobOptions};
//! use cron2mqtt::memory::MemoryBroker;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = cron2mqtt::config::Config::default();
//! let info = JobInfo::new("backup", Device::current()?)?;
//! let plugins = cron2mqtt::plugin_factories(&config)
//!     .iter()
//!     .map(|factory| factory())
//!     .collect();
//! let _job = CronJob::create(
//!     info,
//!     Arc::new(MemoryBroker::new()),
//!     plugins,
//!     JobOptions::from_config(&config),
//! )
//! .await?;
//! # Ok(())
//! # }
//! ```

mod logging;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

pub use cron2mqtt_config as config;
pub use cron2mqtt_core as registry;
pub use cron2mqtt_plugin_hass as hass;
pub use cron2mqtt_protocols as protocols;
pub use cron2mqtt_transport_memory as memory;

pub use logging::{init_tracing, verbosity_level};

use cron2mqtt_config::Config;
use cron2mqtt_core::{Plugin, PluginFactory};
use cron2mqtt_plugin_hass::HassPlugin;

/// Factories for the optional plugins enabled in `config`.
///
/// The core plugin is always added by the job itself and is not included.
pub fn plugin_factories(config: &Config) -> Vec<PluginFactory> {
    let mut factories: Vec<PluginFactory> = Vec::new();
    if config.hass.enabled {
        let prefix = config.hass.discovery_prefix.clone();
        factories.push(Box::new(move || {
            Box::new(HassPlugin::new(prefix.clone())) as Box<dyn Plugin>
        }));
    }
    factories
}

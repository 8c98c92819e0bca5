//! # cron2mqtt Home Assistant Plugin
//!
//! Announces every cron job to Home Assistant through MQTT discovery, as a
//! `binary_sensor` that turns on when the job's last run failed.
//!
//! The sensor reads its state and attributes straight from the job's core
//! `results` topic, so nothing extra is published per execution.

pub mod command;
pub mod discovery_config;
pub mod plugin;

pub use command::command_name;
pub use discovery_config::{BinarySensor, DeviceConfig, Seconds};
pub use plugin::{DEFAULT_DISCOVERY_PREFIX, HassPlugin, expire_after};

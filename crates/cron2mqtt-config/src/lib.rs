//! # cron2mqtt Config
//!
//! Configuration management for cron2mqtt: broker connection settings and
//! tuning for discovery sweeps, publishing and the Home Assistant plugin.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};

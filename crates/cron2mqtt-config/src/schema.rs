//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub broker: BrokerConfig,

    #[serde(default)]
    pub discovery: DiscoveryConfig,

    #[serde(default)]
    pub publish: PublishConfig,

    #[serde(default)]
    pub hass: HassConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How to reach the MQTT broker.
///
/// Read by whatever `Transport` the embedding program connects with; the
/// registry itself never opens a connection. Loaded and validated here so that
/// every client of one config file agrees on the broker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Broker URL, e.g. `tcp://localhost:1883` or `ssl://broker:8883`.
    #[serde(default = "default_broker")]
    pub url: String,

    #[serde(default = "default_client_id")]
    pub client_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// TLS server name. Setting it enables TLS.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            url: default_broker(),
            client_id: default_client_id(),
            username: None,
            password: None,
            server_name: None,
        }
    }
}

fn default_broker() -> String {
    "tcp://localhost:1883".to_string()
}

fn default_client_id() -> String {
    "cron-mqtt".to_string()
}

/// Retained-message discovery tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// How long a sweep waits for another retained message before deciding
    /// the backlog is exhausted.
    #[serde(default = "default_quiescence_ms")]
    pub quiescence_ms: u64,

    /// Upper bound on the whole sweep. Zero disables the bound.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl DiscoveryConfig {
    pub fn quiescence(&self) -> Duration {
        Duration::from_millis(self.quiescence_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            quiescence_ms: default_quiescence_ms(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_quiescence_ms() -> u64 {
    200
}

fn default_timeout_ms() -> u64 {
    10_000
}

/// Publish fan-out settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Maximum number of publish operations in flight at once.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
        }
    }
}

fn default_max_concurrency() -> usize {
    16
}

/// Home Assistant discovery plugin settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HassConfig {
    #[serde(default = "default_hass_enabled")]
    pub enabled: bool,

    #[serde(default = "default_discovery_prefix")]
    pub discovery_prefix: String,
}

impl Default for HassConfig {
    fn default() -> Self {
        Self {
            enabled: default_hass_enabled(),
            discovery_prefix: default_discovery_prefix(),
        }
    }
}

fn default_hass_enabled() -> bool {
    true
}

fn default_discovery_prefix() -> String {
    "homeassistant".to_string()
}

/// Logging output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory for rolling log files. Console only when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.broker.url, "tcp://localhost:1883");
        assert_eq!(config.broker.client_id, "cron-mqtt");
        assert!(config.broker.username.is_none());
        assert_eq!(config.discovery.quiescence(), Duration::from_millis(200));
        assert_eq!(config.discovery.timeout(), Some(Duration::from_secs(10)));
        assert_eq!(config.publish.max_concurrency, 16);
        assert!(config.hass.enabled);
        assert_eq!(config.hass.discovery_prefix, "homeassistant");
        assert!(config.logging.dir.is_none());
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [discovery]
            quiescence_ms = 50
            "#,
        )
        .unwrap();
        assert_eq!(config.discovery.quiescence_ms, 50);
        assert_eq!(config.discovery.timeout_ms, 10_000);
    }

    #[test]
    fn test_zero_timeout_disables_bound() {
        let config: Config = toml::from_str("[discovery]\ntimeout_ms = 0").unwrap();
        assert_eq!(config.discovery.timeout(), None);
    }

    #[test]
    fn test_serialization_skips_missing_credentials() {
        let text = toml::to_string(&Config::default()).unwrap();
        assert!(!text.contains("password"));
        assert!(text.contains("tcp://localhost:1883"));
    }
}

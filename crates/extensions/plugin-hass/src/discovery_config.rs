//! Home Assistant MQTT discovery payloads.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A duration sent with whole-second granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seconds(pub Duration);

impl Serialize for Seconds {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0.as_secs())
    }
}

impl<'de> Deserialize<'de> for Seconds {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u64::deserialize(deserializer).map(|secs| Self(Duration::from_secs(secs)))
    }
}

/// The device an entity belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub name: String,
    pub identifiers: Vec<String>,
}

/// Discovery config of a `binary_sensor` entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinarySensor {
    /// Base topic that `~` expands to in the other topic fields.
    #[serde(rename = "~")]
    pub base_topic: String,
    pub state_topic: String,
    pub value_template: String,
    pub json_attributes_topic: String,

    pub device: DeviceConfig,
    pub unique_id: String,
    pub object_id: String,
    pub name: String,

    pub device_class: String,
    pub icon: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_after: Option<Seconds>,

    pub payload_on: String,
    pub payload_off: String,
}

impl BinarySensor {
    /// `topic` with a leading `~` replaced by the base topic.
    pub fn resolve(&self, topic: &str) -> String {
        if topic == "~" {
            return self.base_topic.clone();
        }
        match topic.strip_prefix("~/") {
            Some(rest) => format!("{}/{}", self.base_topic, rest),
            None => topic.to_string(),
        }
    }
}

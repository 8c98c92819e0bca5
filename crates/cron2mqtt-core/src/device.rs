//! Per-device, per-user identity.
//!
//! The raw machine identifier never leaves this module: it only keys an
//! HMAC whose output becomes the device id used in topics.

use hmac::{Hmac, Mac};
use md5::Md5;
use tracing::debug;

use cron2mqtt_protocols::DeviceError;

use crate::topic::{NAMESPACE_ROOT, validate_topic_component};

const HMAC_LABEL: &[u8] = b"cron2mqtt";

/// Identity of the host and OS user running cron2mqtt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    id: String,
    uid: u32,
    username: String,
    hostname: String,
    topic_prefix: String,
}

impl Device {
    /// Identity of the current machine and user.
    pub fn current() -> Result<Self, DeviceError> {
        let machine_id = read_machine_id()?;

        let uid = nix::unistd::Uid::current();
        let user = nix::unistd::User::from_uid(uid)
            .map_err(|e| DeviceError::User(e.to_string()))?
            .ok_or_else(|| DeviceError::User(format!("uid {} has no passwd entry", uid)))?;

        let hostname = hostname::get()
            .map_err(|e| DeviceError::Hostname(e.to_string()))?
            .into_string()
            .map_err(|raw| DeviceError::Hostname(format!("{:?} is not valid UTF-8", raw)))?;

        Self::from_parts(&machine_id, uid.as_raw(), user.name, hostname)
    }

    /// Build an identity from already-known values.
    pub fn from_parts(
        machine_id: &str,
        uid: u32,
        username: impl Into<String>,
        hostname: impl Into<String>,
    ) -> Result<Self, DeviceError> {
        let machine_id = machine_id.trim();
        if machine_id.is_empty() {
            return Err(DeviceError::MachineId("machine id is empty".to_string()));
        }

        let id = protect(machine_id)?;
        validate_topic_component(&id)?;
        let topic_prefix = format!("{}/{}/{}", NAMESPACE_ROOT, id, uid);
        debug!(%topic_prefix, "Resolved device identity");

        Ok(Self {
            id,
            uid,
            username: username.into(),
            hostname: hostname.into(),
            topic_prefix,
        })
    }

    /// Anonymized device id.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn uid(&self) -> u32 {
        self.uid
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// `cron2mqtt/<id>/<uid>`
    pub fn topic_prefix(&self) -> &str {
        &self.topic_prefix
    }
}

/// base58(HMAC-MD5(key = machine id, message = "cron2mqtt"))
fn protect(machine_id: &str) -> Result<String, DeviceError> {
    let mut mac = Hmac::<Md5>::new_from_slice(machine_id.as_bytes())
        .map_err(|e| DeviceError::MachineId(e.to_string()))?;
    mac.update(HMAC_LABEL);
    Ok(bs58::encode(mac.finalize().into_bytes()).into_string())
}

#[cfg(target_os = "linux")]
fn read_machine_id() -> Result<String, DeviceError> {
    ["/var/lib/dbus/machine-id", "/etc/machine-id"]
        .iter()
        .find_map(|path| std::fs::read_to_string(path).ok())
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| DeviceError::MachineId("no readable machine-id file".to_string()))
}

#[cfg(target_os = "macos")]
fn read_machine_id() -> Result<String, DeviceError> {
    let output = std::process::Command::new("ioreg")
        .args(["-rd1", "-c", "IOPlatformExpertDevice"])
        .output()
        .map_err(|e| DeviceError::MachineId(e.to_string()))?;
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .find(|line| line.contains("IOPlatformUUID"))
        .and_then(|line| line.split('"').nth(3))
        .map(str::to_string)
        .ok_or_else(|| DeviceError::MachineId("IOPlatformUUID not found".to_string()))
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn read_machine_id() -> Result<String, DeviceError> {
    Err(DeviceError::MachineId(
        "unsupported platform".to_string(),
    ))
}

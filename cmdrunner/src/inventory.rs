//! Device list and command file loading.
//!
//! The device file is a JSON array in the netmiko style:
//!
//! ```json
//! [
//!     {"device_type": "cisco_ios", "ip": "10.0.0.1"},
//!     {"device_type": "cisco_ios", "host": "edge1.example.net", "port": 2222}
//! ]
//! ```
//!
//! Credential fields in the file are ignored; credentials come from the
//! run context prompted at start-up.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::InventoryError;

/// Identity and connection parameters for one target device.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceSpec {
    /// IPv4, IPv6 or FQDN of the device.
    #[serde(alias = "host")]
    pub ip: String,

    /// Platform name used to pick prompt patterns.
    #[serde(default = "default_device_type")]
    pub device_type: String,

    /// SSH port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Private key to authenticate with instead of the password.
    #[serde(default)]
    pub key_file: Option<PathBuf>,
}

fn default_device_type() -> String {
    "cisco_ios".to_string()
}

fn default_port() -> u16 {
    22
}

impl DeviceSpec {
    /// A device with default type and port.
    pub fn new(ip: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            device_type: default_device_type(),
            port: default_port(),
            key_file: None,
        }
    }

    /// The address used in reports and audit lines.
    pub fn address(&self) -> &str {
        &self.ip
    }
}

/// Load the device list from a JSON file.
pub fn load_devices(path: impl AsRef<Path>) -> Result<Vec<DeviceSpec>, InventoryError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| InventoryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| InventoryError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Ordered command lines applied to every device.
///
/// Never mutated after load; shared read-only between workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBatch {
    source: PathBuf,
    commands: Vec<String>,
}

impl CommandBatch {
    /// Build a batch from already-split command lines.
    pub fn new(source: impl Into<PathBuf>, commands: Vec<String>) -> Self {
        Self {
            source: source.into(),
            commands,
        }
    }

    /// Load a batch from a text file, one command per line.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InventoryError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| InventoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(path, &text))
    }

    /// Split file contents into commands, dropping blank lines.
    pub fn parse(source: impl Into<PathBuf>, text: &str) -> Self {
        let commands = text
            .lines()
            .map(|line| line.trim_end_matches(['\r', '\n']))
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect();
        Self::new(source, commands)
    }

    /// The file the batch was loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The commands, in file order.
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

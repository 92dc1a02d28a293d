//! Runtime settings for a run.

use std::path::PathBuf;
use std::time::Duration;

use crate::transport::HostKeyVerification;

/// Settings shared by every worker of a run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Audit log file, appended to.
    pub log_file: PathBuf,

    /// Timeout for connecting and for each read from a device.
    pub timeout: Duration,

    /// Bound of the worker-to-aggregator result channel.
    pub channel_capacity: usize,

    /// Host key policy for every session.
    pub host_key_verification: HostKeyVerification,

    /// known_hosts file to check and learn keys in; the user's default when unset.
    pub known_hosts: Option<PathBuf>,

    /// Command that saves the running configuration.
    pub save_command: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from("cmdrunner.log"),
            timeout: Duration::from_secs(30),
            channel_capacity: 40,
            host_key_verification: HostKeyVerification::Disabled,
            known_hosts: None,
            save_command: "write memory".to_string(),
        }
    }
}

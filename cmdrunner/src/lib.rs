//! # cmdrunner
//!
//! Push one configuration change to many network devices at once.
//!
//! Every device in the inventory gets its own task: connect over SSH,
//! apply the command batch in configuration mode, save the configuration,
//! and report back. Failures stay with their device; the run always ends
//! with a transcript per successful device and a statistics panel.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use cmdrunner::{AuditLog, CommandBatch, RunContext, RunnerConfig, SshConnector};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let devices = cmdrunner::inventory::load_devices("devices.json")?;
//!     let batch = CommandBatch::load("commands.txt")?;
//!     let ctx = RunContext::new("CHG0001", "admin", "secret");
//!     let audit = Arc::new(AuditLog::open("cmdrunner.log")?);
//!
//!     let report = cmdrunner::runner::run(
//!         SshConnector::default(),
//!         devices,
//!         batch,
//!         ctx,
//!         RunnerConfig::default(),
//!         audit.clone(),
//!     )
//!     .await;
//!
//!     report.render(&mut std::io::stdout().lock())?;
//!     audit.close();
//!     Ok(())
//! }
//! ```

pub mod audit;
pub mod banner;
pub mod channel;
pub mod config;
pub mod driver;
pub mod error;
pub mod inventory;
pub mod platform;
pub mod prompt;
pub mod report;
pub mod runner;
pub mod session;
pub mod transport;

// Re-export main types for convenience
pub use audit::AuditLog;
pub use config::RunnerConfig;
pub use driver::{DriverBuilder, GenericDriver, Response};
pub use error::{Error, FailureKind};
pub use inventory::{CommandBatch, DeviceSpec};
pub use platform::{PlatformDefinition, PlatformRegistry, PrivilegeLevel};
pub use prompt::RunContext;
pub use report::{Report, RunStatistics};
pub use runner::WorkerResult;
pub use session::{Connector, Session, SshConnector};
pub use transport::{AuthMethod, HostKeyVerification, SshConfig};

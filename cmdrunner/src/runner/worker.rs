//! The per-device worker.

use std::sync::Arc;

use log::debug;

use super::save::save_config;
use crate::audit::AuditLog;
use crate::banner::{self, WIDTH};
use crate::config::RunnerConfig;
use crate::error::{Error, FailureKind, Result};
use crate::inventory::{CommandBatch, DeviceSpec};
use crate::prompt::RunContext;
use crate::session::{Connector, Session, SessionParams};

/// Outcome of one device, produced exactly once per worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerResult {
    Success {
        hostname: String,
        address: String,
        transcript: String,
    },
    Failure {
        address: String,
        kind: FailureKind,
        detail: String,
    },
}

impl WorkerResult {
    pub fn address(&self) -> &str {
        match self {
            WorkerResult::Success { address, .. } | WorkerResult::Failure { address, .. } => {
                address
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, WorkerResult::Success { .. })
    }
}

/// Applies the command batch to devices, one call of [`DeviceWorker::run`]
/// per device.
///
/// Everything inside is read-only once the run starts; the dispatcher
/// shares one instance between all device tasks.
#[derive(Debug)]
pub struct DeviceWorker<C> {
    connector: C,
    batch: Arc<CommandBatch>,
    ctx: Arc<RunContext>,
    config: Arc<RunnerConfig>,
    audit: Arc<AuditLog>,
}

impl<C: Connector> DeviceWorker<C> {
    pub fn new(
        connector: C,
        batch: Arc<CommandBatch>,
        ctx: Arc<RunContext>,
        config: Arc<RunnerConfig>,
        audit: Arc<AuditLog>,
    ) -> Self {
        Self {
            connector,
            batch,
            ctx,
            config,
            audit,
        }
    }

    /// Run the whole session for one device.
    ///
    /// Never fails: every error ends up as [`WorkerResult::Failure`] after
    /// being shown on the console and written to the audit log.
    pub async fn run(&self, device: &DeviceSpec) -> WorkerResult {
        let address = device.address().to_string();
        banner::connecting(&address);

        let params = SessionParams::for_device(device, &self.ctx, &self.config);
        let mut session = match self.connector.open(params).await {
            Ok(session) => session,
            Err(e) => return self.failure(address, &e),
        };

        banner::connected(&address);
        self.audit
            .info(format!("Connection to device successful: {address}"));

        let hostname = session.identity().to_string();
        let applied = self.apply(&mut session, &hostname, &address).await;

        if let Err(e) = session.close().await {
            debug!("{}: close failed: {}", address, e);
        }

        match applied {
            Ok(transcript) => {
                self.audit
                    .info(format!("Configuration to device successful: {address}"));
                WorkerResult::Success {
                    hostname,
                    address,
                    transcript,
                }
            }
            Err(e) => self.failure(address, &e),
        }
    }

    async fn apply<S: Session>(
        &self,
        session: &mut S,
        hostname: &str,
        address: &str,
    ) -> Result<String> {
        let ticket = &self.ctx.ticket;
        self.marker(session, address, &format!("Begin Change Control/Ticket: {ticket}"))
            .await;

        let applied = session.send_batch(self.batch.commands()).await?;
        let save_command = &self.config.save_command;
        let saved = save_config(session, save_command).await?;
        let saved = tidy_save_output(&saved, save_command, hostname);

        let mut transcript = format!("\n{applied}\n{}\n", "-".repeat(WIDTH));
        transcript.push_str(&format!(
            "[{hostname}] [{address}] >> {save_command}\n\n{saved}"
        ));

        self.marker(session, address, &format!("End Change Control/Ticket: {ticket}"))
            .await;
        Ok(transcript)
    }

    /// Leave a syslog marker on the device. Failures are ignored.
    async fn marker<S: Session>(&self, session: &mut S, address: &str, text: &str) {
        let command = format!("send log 6 \"{text}\"");
        if let Err(e) = session.send_command(&command).await {
            debug!("{}: marker not sent: {}", address, e);
        }
    }

    fn failure(&self, address: String, error: &Error) -> WorkerResult {
        self.record_failure(address, error.failure_kind(), error.to_string())
    }

    /// Show a failure on the console, audit it, and wrap it as the result.
    pub(super) fn record_failure(
        &self,
        address: String,
        kind: FailureKind,
        detail: String,
    ) -> WorkerResult {
        banner::failed(kind, &address);
        self.audit.warning(format!("{kind}: {address}: {detail}"));
        WorkerResult::Failure {
            address,
            kind,
            detail,
        }
    }
}

/// Drop the echoed command and the closing `hostname#` prompt from the
/// final save output, and normalize line endings.
fn tidy_save_output(raw: &str, command: &str, hostname: &str) -> String {
    let mut lines: Vec<&str> = raw.lines().collect();
    let leading_blank = lines.iter().take_while(|l| l.trim().is_empty()).count();
    lines.drain(..leading_blank);
    if lines.first().is_some_and(|l| l.trim() == command) {
        lines.remove(0);
    }
    let is_prompt = |line: &str| {
        line.trim()
            .strip_prefix(hostname)
            .is_some_and(|rest| rest == "#" || rest == ">")
    };
    if lines.last().is_some_and(|l| is_prompt(l)) {
        lines.pop();
    }
    lines.join("\n")
}

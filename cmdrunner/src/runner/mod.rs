//! Orchestration of one run across all devices.
//!
//! [`run`] wires the pieces together: a [`DeviceWorker`] shared by every
//! device task, a [`Dispatcher`] that fans them out, and the report that
//! collects the results.

mod dispatch;
mod save;
mod worker;

use std::sync::Arc;

use chrono::Local;

pub use dispatch::Dispatcher;
pub use save::{FILENAME_PROMPT, OVERWRITE_PROMPT, SaveExchange, SaveState, SaveStep, save_config};
pub use worker::{DeviceWorker, WorkerResult};

use crate::audit::AuditLog;
use crate::config::RunnerConfig;
use crate::inventory::{CommandBatch, DeviceSpec};
use crate::prompt::RunContext;
use crate::report::{Report, RunStatistics};
use crate::session::Connector;

/// Apply `batch` to every device and gather the outcome.
///
/// The audit log stays open afterwards; the caller closes it once the
/// report is written.
pub async fn run<C: Connector>(
    connector: C,
    devices: Vec<DeviceSpec>,
    batch: CommandBatch,
    ctx: RunContext,
    config: RunnerConfig,
    audit: Arc<AuditLog>,
) -> Report {
    let started = Local::now();
    let command_source = batch.source().to_path_buf();
    let ticket = ctx.ticket.clone();
    let capacity = config.channel_capacity;

    let worker = DeviceWorker::new(
        connector,
        Arc::new(batch),
        Arc::new(ctx),
        Arc::new(config),
        audit,
    );
    let results = Dispatcher::new(worker, capacity).dispatch(devices).await;

    let stats = RunStatistics::new(ticket, started, Local::now(), &results);
    Report::new(command_source, results, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::testing::SharedBuffer;
    use crate::error::FailureKind;
    use crate::session::fake::{FakeConnector, FakeDevice};

    #[tokio::test]
    async fn test_run_end_to_end() {
        let buffer = SharedBuffer::default();
        let audit = Arc::new(AuditLog::from_writer(buffer.clone()));
        let connector = FakeConnector::default().with_device(
            "10.0.0.2",
            FakeDevice::default().failing(FailureKind::ConnectivityTimeout),
        );
        let devices = vec![DeviceSpec::new("10.0.0.1"), DeviceSpec::new("10.0.0.2")];
        let batch = CommandBatch::parse("changes/ntp.txt", "ntp server 10.1.1.1\n");
        let ctx = RunContext::new("CHG0042", "admin", "secret");

        let report = run(
            connector,
            devices,
            batch,
            ctx,
            RunnerConfig::default(),
            audit.clone(),
        )
        .await;
        audit.close();

        assert_eq!(report.stats.ticket, "CHG0042");
        assert_eq!(report.stats.devices, 2);
        assert_eq!(report.stats.succeeded, 1);
        assert_eq!(report.stats.failed, 1);
        assert!(report.stats.ended >= report.stats.started);

        let mut out = Vec::new();
        report.render(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("[R1] [10.0.0.1] >> changes/ntp.txt"));
        assert!(!text.contains("[10.0.0.2]"));

        let lines = buffer.lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines.iter().filter(|l| l.contains(" - WARNING - ")).count(), 1);
    }
}

//! Fan-out of device workers onto the runtime.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use super::worker::{DeviceWorker, WorkerResult};
use crate::error::FailureKind;
use crate::inventory::DeviceSpec;
use crate::report;
use crate::session::Connector;

/// Launches one task per device and collects exactly one result from each.
#[derive(Debug)]
pub struct Dispatcher<C> {
    worker: Arc<DeviceWorker<C>>,
    capacity: usize,
}

impl<C: Connector> Dispatcher<C> {
    /// `capacity` bounds the result channel; zero is raised to one.
    pub fn new(worker: DeviceWorker<C>, capacity: usize) -> Self {
        Self {
            worker: Arc::new(worker),
            capacity: capacity.max(1),
        }
    }

    /// Run every device to completion.
    ///
    /// Results come back in completion order. The drain runs as its own task
    /// from the start, so a full channel only slows workers down.
    pub async fn dispatch(&self, devices: Vec<DeviceSpec>) -> Vec<WorkerResult> {
        let (tx, rx) = mpsc::channel::<WorkerResult>(self.capacity);
        let drain = tokio::spawn(report::drain(rx));

        let mut tasks = JoinSet::new();
        let mut addresses = HashMap::new();
        for device in devices {
            let worker = self.worker.clone();
            let tx = tx.clone();
            let address = device.address().to_string();
            let handle = tasks.spawn(async move {
                let result = worker.run(&device).await;
                if tx.send(result).await.is_err() {
                    warn!("result channel closed before {} reported", device.address());
                }
            });
            addresses.insert(handle.id(), address);
        }
        debug!("dispatched {} device tasks", addresses.len());

        while let Some(joined) = tasks.join_next().await {
            let Err(e) = joined else { continue };
            let address = addresses.remove(&e.id()).unwrap_or_default();
            warn!("worker for {} did not finish: {}", address, e);
            let failure = self.worker.record_failure(
                address,
                FailureKind::Session,
                format!("worker task aborted: {e}"),
            );
            if tx.send(failure).await.is_err() {
                warn!("result channel closed while reporting an aborted worker");
            }
        }
        drop(tx);

        match drain.await {
            Ok(results) => results,
            Err(e) => {
                warn!("result drain failed: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::time::Duration;

    use super::*;
    use crate::audit::AuditLog;
    use crate::audit::testing::SharedBuffer;
    use crate::config::RunnerConfig;
    use crate::inventory::CommandBatch;
    use crate::prompt::RunContext;
    use crate::session::fake::{FakeConnector, FakeDevice};

    fn dispatcher(connector: FakeConnector, capacity: usize) -> Dispatcher<FakeConnector> {
        audited_dispatcher(connector, capacity, &SharedBuffer::default())
    }

    fn audited_dispatcher(
        connector: FakeConnector,
        capacity: usize,
        audit: &SharedBuffer,
    ) -> Dispatcher<FakeConnector> {
        let worker = DeviceWorker::new(
            connector,
            Arc::new(CommandBatch::parse("cmds.txt", "hostname R1\n")),
            Arc::new(RunContext::new("CHG0001", "admin", "secret")),
            Arc::new(RunnerConfig::default()),
            Arc::new(AuditLog::from_writer(audit.clone())),
        );
        Dispatcher::new(worker, capacity)
    }

    fn devices(n: usize) -> Vec<DeviceSpec> {
        (0..n).map(|i| DeviceSpec::new(format!("10.0.1.{i}"))).collect()
    }

    fn assert_one_result_each(results: &[WorkerResult], devices: &[DeviceSpec]) {
        assert_eq!(results.len(), devices.len());
        let seen: HashSet<_> = results.iter().map(|r| r.address().to_string()).collect();
        let expected: HashSet<_> = devices.iter().map(|d| d.address().to_string()).collect();
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn test_no_devices() {
        let results = dispatcher(FakeConnector::default(), 4).dispatch(Vec::new()).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_exactly_capacity() {
        let devices = devices(4);
        let results = dispatcher(FakeConnector::default(), 4)
            .dispatch(devices.clone())
            .await;
        assert_one_result_each(&results, &devices);
        assert!(results.iter().all(WorkerResult::is_success));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_more_devices_than_capacity() {
        let devices = devices(25);
        let dispatcher = dispatcher(FakeConnector::default(), 1);
        let dispatch = dispatcher.dispatch(devices.clone());
        let results = tokio::time::timeout(Duration::from_secs(10), dispatch)
            .await
            .expect("dispatch must not deadlock on a full channel");
        assert_one_result_each(&results, &devices);
    }

    #[tokio::test]
    async fn test_failures_do_not_affect_others() {
        let connector = FakeConnector::default()
            .with_device(
                "10.0.1.1",
                FakeDevice::default().failing(FailureKind::Authentication),
            )
            .with_device(
                "10.0.1.2",
                FakeDevice::default().failing(FailureKind::ConnectivityTimeout),
            );
        let devices = devices(4);
        let results = dispatcher(connector, 2).dispatch(devices.clone()).await;

        assert_one_result_each(&results, &devices);
        assert_eq!(results.iter().filter(|r| r.is_success()).count(), 2);
    }

    #[tokio::test]
    async fn test_results_arrive_in_completion_order() {
        let slow = FakeDevice {
            delay: Duration::from_millis(200),
            ..FakeDevice::default()
        };
        let connector = FakeConnector::default().with_device("10.0.1.0", slow);
        let devices = devices(3);
        let results = dispatcher(connector, 8).dispatch(devices).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results.last().map(WorkerResult::address), Some("10.0.1.0"));
    }

    #[tokio::test]
    async fn test_panicking_worker_becomes_failure() {
        let broken = FakeDevice {
            panic_on_connect: true,
            ..FakeDevice::default()
        };
        let connector = FakeConnector::default().with_device("10.0.1.1", broken);
        let devices = devices(3);
        let audit = SharedBuffer::default();
        let results = audited_dispatcher(connector, 1, &audit)
            .dispatch(devices.clone())
            .await;

        assert_one_result_each(&results, &devices);
        let aborted = results
            .iter()
            .find(|r| r.address() == "10.0.1.1")
            .unwrap();
        match aborted {
            WorkerResult::Failure { kind, detail, .. } => {
                assert_eq!(*kind, FailureKind::Session);
                assert!(detail.starts_with("worker task aborted"));
            }
            other => panic!("expected failure, got {other:?}"),
        }

        let warnings: Vec<_> = audit
            .lines()
            .into_iter()
            .filter(|l| l.contains(" - WARNING - "))
            .collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Session error: 10.0.1.1: worker task aborted"));
    }
}

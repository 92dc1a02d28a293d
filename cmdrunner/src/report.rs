//! Final report: per-device transcripts and the statistics panel.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeDelta};
use tokio::sync::mpsc;

use crate::audit::TIMESTAMP_FORMAT;
use crate::banner::{self, WIDTH};
use crate::runner::WorkerResult;

/// Receive results until every sender is gone; keeps arrival order.
pub async fn drain(mut rx: mpsc::Receiver<WorkerResult>) -> Vec<WorkerResult> {
    let mut results = Vec::new();
    while let Some(result) = rx.recv().await {
        results.push(result);
    }
    results
}

/// Run-level figures shown in the statistics panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStatistics {
    pub ticket: String,
    pub started: DateTime<Local>,
    pub ended: DateTime<Local>,
    pub devices: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl RunStatistics {
    pub fn new(
        ticket: impl Into<String>,
        started: DateTime<Local>,
        ended: DateTime<Local>,
        results: &[WorkerResult],
    ) -> Self {
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        Self {
            ticket: ticket.into(),
            started,
            ended,
            devices: results.len(),
            succeeded,
            failed: results.len() - succeeded,
        }
    }

    /// Elapsed time in whole seconds.
    pub fn duration(&self) -> TimeDelta {
        TimeDelta::seconds((self.ended - self.started).num_seconds().max(0))
    }

    /// The boxed summary, every line exactly [`WIDTH`] columns.
    pub fn panel(&self) -> String {
        let border = format!("+{}+", "-".repeat(WIDTH - 2));
        let rows = [
            ("Change Control/Ticket:", self.ticket.clone()),
            (
                "Devices:",
                format!(
                    "{} (ok: {}, failed: {})",
                    self.devices, self.succeeded, self.failed
                ),
            ),
            (
                "Script started:",
                self.started.format(TIMESTAMP_FORMAT).to_string(),
            ),
            (
                "Script ended:",
                self.ended.format(TIMESTAMP_FORMAT).to_string(),
            ),
            ("Script duration (h:m:s):", format_duration(self.duration())),
        ];

        let mut lines = vec![
            border.clone(),
            format!("|{:^width$}|", "SCRIPT STATISTICS", width = WIDTH - 2),
            format!("|{}|", "-".repeat(WIDTH - 2)),
        ];
        lines.extend(rows.iter().map(|(label, value)| row(label, value)));
        lines.push(border);
        lines.join("\n")
    }
}

const LABEL_WIDTH: usize = 25;
const VALUE_WIDTH: usize = WIDTH - LABEL_WIDTH - 3;

fn row(label: &str, value: &str) -> String {
    let value: String = value.chars().take(VALUE_WIDTH).collect();
    format!("| {label:<LABEL_WIDTH$}{value:<VALUE_WIDTH$}|")
}

/// `H:MM:SS`, with a `N day(s), ` prefix past 24 hours.
pub fn format_duration(duration: TimeDelta) -> String {
    let total = duration.num_seconds().max(0);
    let (days, rest) = (total / 86_400, total % 86_400);
    let clock = format!("{}:{:02}:{:02}", rest / 3600, rest % 3600 / 60, rest % 60);
    match days {
        0 => clock,
        1 => format!("1 day, {clock}"),
        n => format!("{n} days, {clock}"),
    }
}

/// Everything a finished run prints.
#[derive(Debug)]
pub struct Report {
    command_source: PathBuf,
    pub results: Vec<WorkerResult>,
    pub stats: RunStatistics,
}

impl Report {
    pub fn new(command_source: PathBuf, results: Vec<WorkerResult>, stats: RunStatistics) -> Self {
        Self {
            command_source,
            results,
            stats,
        }
    }

    pub fn command_source(&self) -> &Path {
        &self.command_source
    }

    /// Write each successful transcript, in arrival order, then the panel.
    ///
    /// Failures were already shown while the run was going.
    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        for result in &self.results {
            if let WorkerResult::Success {
                hostname,
                address,
                transcript,
            } = result
            {
                writeln!(out, "{}", banner::rule())?;
                writeln!(
                    out,
                    "[{hostname}] [{address}] >> {}",
                    self.command_source.display()
                )?;
                writeln!(out, "{transcript}")?;
            }
        }
        writeln!(out, "{}", banner::rule())?;
        writeln!(out, "{}", self.stats.panel())?;
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::error::FailureKind;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 19, h, m, s).unwrap()
    }

    fn success(host: &str, addr: &str) -> WorkerResult {
        WorkerResult::Success {
            hostname: host.to_string(),
            address: addr.to_string(),
            transcript: "\nR1(config)#ntp server 10.1.1.1".to_string(),
        }
    }

    fn failure(addr: &str) -> WorkerResult {
        WorkerResult::Failure {
            address: addr.to_string(),
            kind: FailureKind::Authentication,
            detail: "Authentication failed for user 'admin'".to_string(),
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(TimeDelta::zero()), "0:00:00");
        assert_eq!(format_duration(TimeDelta::seconds(5)), "0:00:05");
        assert_eq!(format_duration(TimeDelta::seconds(3725)), "1:02:05");
        assert_eq!(format_duration(TimeDelta::seconds(86_400 + 61)), "1 day, 0:01:01");
        assert_eq!(format_duration(TimeDelta::seconds(2 * 86_400)), "2 days, 0:00:00");
    }

    #[test]
    fn test_duration_drops_subseconds() {
        let started = at(10, 0, 0);
        let ended = started + TimeDelta::milliseconds(4_999);
        let stats = RunStatistics::new("CHG0001", started, ended, &[]);
        assert_eq!(stats.duration(), TimeDelta::seconds(4));
    }

    #[test]
    fn test_counts() {
        let results = [success("R1", "10.0.0.1"), failure("10.0.0.2"), success("R3", "10.0.0.3")];
        let stats = RunStatistics::new("CHG0001", at(10, 0, 0), at(10, 0, 7), &results);
        assert_eq!((stats.devices, stats.succeeded, stats.failed), (3, 2, 1));
    }

    #[test]
    fn test_panel_layout() {
        let stats = RunStatistics::new("CHG0001", at(10, 0, 0), at(10, 1, 30), &[failure("10.0.0.2")]);
        let panel = stats.panel();
        let lines: Vec<_> = panel.lines().collect();

        assert_eq!(lines.len(), 9);
        assert!(lines.iter().all(|l| l.chars().count() == WIDTH), "{panel}");
        assert!(lines[0].starts_with("+-") && lines[8].ends_with("-+"));
        assert_eq!(lines[1].trim_matches(|c| c == '|' || c == ' '), "SCRIPT STATISTICS");
        assert!(lines[3].starts_with("| Change Control/Ticket:   CHG0001"));
        assert!(lines[4].contains("1 (ok: 0, failed: 1)"));
        assert!(lines[5].contains("19/10/2026 10:00:00"));
        assert!(lines[6].contains("19/10/2026 10:01:30"));
        assert!(lines[7].starts_with("| Script duration (h:m:s): 0:01:30"));
    }

    #[test]
    fn test_long_ticket_is_truncated() {
        let ticket = "CHG".repeat(40);
        let stats = RunStatistics::new(ticket, at(10, 0, 0), at(10, 0, 0), &[]);
        let panel = stats.panel();
        assert!(panel.lines().all(|l| l.chars().count() == WIDTH), "{panel}");
    }

    #[test]
    fn test_render_prints_successes_only() {
        let results = vec![success("R1", "10.0.0.1"), failure("10.0.0.2")];
        let stats = RunStatistics::new("CHG0001", at(10, 0, 0), at(10, 0, 3), &results);
        let report = Report::new(PathBuf::from("changes/ntp.txt"), results, stats);

        let mut out = Vec::new();
        report.render(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("[R1] [10.0.0.1] >> changes/ntp.txt\n\nR1(config)#ntp server 10.1.1.1\n"));
        assert!(!text.contains("10.0.0.2"));
        assert!(text.contains("SCRIPT STATISTICS"));
        assert!(text.ends_with("-+\n"));
    }

    #[test]
    fn test_render_stops_on_broken_pipe() {
        struct Closed;
        impl Write for Closed {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::from(io::ErrorKind::BrokenPipe))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let stats = RunStatistics::new("CHG0001", at(10, 0, 0), at(10, 0, 3), &[]);
        let report = Report::new(PathBuf::from("cmds.txt"), Vec::new(), stats);
        let err = report.render(&mut Closed).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_drain_keeps_arrival_order() {
        tokio_test::block_on(async {
            let (tx, rx) = mpsc::channel(1);
            let sender = tokio::spawn(async move {
                for addr in ["10.0.0.3", "10.0.0.1", "10.0.0.2"] {
                    tx.send(failure(addr)).await.unwrap();
                }
            });
            let results = drain(rx).await;
            sender.await.unwrap();

            let order: Vec<_> = results.iter().map(WorkerResult::address).collect();
            assert_eq!(order, ["10.0.0.3", "10.0.0.1", "10.0.0.2"]);
        });
    }
}

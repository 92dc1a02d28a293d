//! Append-only audit log of per-device outcomes.
//!
//! One line per event, `DD/MM/YYYY HH:MM:SS - LEVEL - message`, stamped at
//! write time. The log is an explicit handle shared by workers; a failed
//! write is reported through `log` and never reaches the caller.

use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Local};
use log::warn;

/// Timestamp layout used by the audit log and console notices.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Severity of an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditLevel {
    Info,
    Warning,
}

impl fmt::Display for AuditLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditLevel::Info => write!(f, "INFO"),
            AuditLevel::Warning => write!(f, "WARNING"),
        }
    }
}

/// A single audit line.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub timestamp: DateTime<Local>,
    pub level: AuditLevel,
    pub message: String,
}

impl AuditEvent {
    /// Create an event stamped now.
    pub fn new(level: AuditLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            message: message.into(),
        }
    }
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} - {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.level,
            self.message
        )
    }
}

/// Serialized append-only sink for audit events.
pub struct AuditLog {
    sink: Mutex<Option<Box<dyn Write + Send>>>,
}

impl AuditLog {
    /// Open (or create) `path` for appending.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Ok(Self::from_writer(file))
    }

    /// Log to an arbitrary writer.
    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            sink: Mutex::new(Some(Box::new(writer))),
        }
    }

    /// A log that discards every event.
    pub fn disabled() -> Self {
        Self {
            sink: Mutex::new(None),
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.record(AuditEvent::new(AuditLevel::Info, message));
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.record(AuditEvent::new(AuditLevel::Warning, message));
    }

    /// Append one event. Write failures are logged, not returned.
    pub fn record(&self, event: AuditEvent) {
        let Ok(mut sink) = self.sink.lock() else {
            warn!("audit log lock poisoned, dropping: {}", event);
            return;
        };
        if let Some(writer) = sink.as_mut() {
            if let Err(e) = writeln!(writer, "{event}").and_then(|_| writer.flush()) {
                warn!("audit log write failed: {}", e);
            }
        }
    }

    /// Flush and release the underlying writer. Later events are discarded.
    pub fn close(&self) {
        if let Ok(mut sink) = self.sink.lock() {
            if let Some(mut writer) = sink.take() {
                if let Err(e) = writer.flush() {
                    warn!("audit log flush failed: {}", e);
                }
            }
        }
    }
}

impl fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = self.sink.lock().map(|s| s.is_some()).unwrap_or(false);
        f.debug_struct("AuditLog").field("open", &open).finish()
    }
}

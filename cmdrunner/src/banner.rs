//! Immediate console notices printed by workers while the run is going.

use chrono::Local;
use colored::Colorize;

use crate::audit::TIMESTAMP_FORMAT;
use crate::error::FailureKind;

/// Width of separators and the statistics panel.
pub const WIDTH: usize = 79;

/// `=` rule printed before prompts and between report sections.
pub fn rule() -> String {
    "=".repeat(WIDTH).white().to_string()
}

fn now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// The connection attempt for `address` is starting.
pub fn connecting(address: &str) {
    println!("{} - Connecting to device: {}", now(), address);
}

/// The session to `address` is up.
pub fn connected(address: &str) {
    let line = format!("{} - Connection to device successful: {}", now(), address);
    println!("\n{}", line.green());
}

/// `address` failed; shown at once rather than in the final report.
pub fn failed(kind: FailureKind, address: &str) {
    let line = format!("{} - {}: {}", now(), kind, address);
    println!("\n{}\n", line.red());
}

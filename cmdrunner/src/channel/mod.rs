//! Channel layer for pattern matching and PTY operations.
//!
//! This module handles the interactive shell, including tail-only
//! prompt detection, idle detection and ANSI stripping.

mod buffer;
mod pty;

pub use buffer::PatternBuffer;
pub use pty::{PtyChannel, PtyConfig};

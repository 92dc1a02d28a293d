//! High-level driver for device interaction.
//!
//! The driver layer provides the command API on top of an SSH shell:
//! prompt-terminated commands, timing-based commands for interactive
//! device questions, and configuration sets.

mod builder;
mod generic;
pub(crate) mod response;

pub use builder::DriverBuilder;
pub use generic::GenericDriver;
pub use response::Response;

//! Platform definitions for vendor support.
//!
//! This module defines vendor-specific configurations including
//! prompt patterns, privilege levels, and failure strings.

mod definition;
mod privilege_level;
mod registry;
pub mod vendors;

pub use definition::PlatformDefinition;
pub use privilege_level::PrivilegeLevel;
pub use registry::PlatformRegistry;

//! Platform registry for looking up platform definitions by device type.

use std::collections::HashMap;

use super::definition::PlatformDefinition;
use super::vendors;
use crate::error::{PlatformError, Result};

/// Registry for platform definitions, keyed by device type.
#[derive(Debug, Default)]
pub struct PlatformRegistry {
    platforms: HashMap<String, PlatformDefinition>,
}

impl PlatformRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            platforms: HashMap::new(),
        }
    }

    /// Create a registry with the built-in platforms.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        let cisco = vendors::cisco_ios::platform();
        for alias in ["cisco_xe", "cisco_iosxe"] {
            registry.platforms.insert(alias.to_string(), cisco.clone());
        }
        registry.platforms.insert(cisco.name.clone(), cisco);
        registry
    }

    /// Register a platform definition, replacing any with the same name.
    pub fn register(&mut self, platform: PlatformDefinition) {
        self.platforms.insert(platform.name.clone(), platform);
    }

    /// Get a platform by device type.
    pub fn get(&self, name: &str) -> Result<&PlatformDefinition> {
        self.platforms.get(name).ok_or_else(|| {
            PlatformError::UnknownPlatform {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// List all registered device types.
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.platforms.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_aliases() {
        let registry = PlatformRegistry::with_builtins();
        for name in ["cisco_ios", "cisco_xe", "cisco_iosxe"] {
            assert_eq!(registry.get(name).unwrap().name, "cisco_ios");
        }
        assert_eq!(registry.names().count(), 3);
    }

    #[test]
    fn test_unknown_platform() {
        let registry = PlatformRegistry::with_builtins();
        assert!(registry.get("juniper_junos").is_err());
    }

    #[test]
    fn test_register_custom() {
        let mut registry = PlatformRegistry::new();
        registry.register(PlatformDefinition::new("lab_box"));
        assert!(registry.get("lab_box").is_ok());
    }
}

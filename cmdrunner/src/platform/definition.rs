//! Platform definition for vendor-specific configurations.

use indexmap::IndexMap;
use regex::bytes::Regex;

use super::privilege_level::PrivilegeLevel;

/// Platform definition containing all vendor-specific configuration.
#[derive(Debug, Clone)]
pub struct PlatformDefinition {
    /// Platform name (e.g., "cisco_ios").
    pub name: String,

    /// Privilege levels for this platform, in definition order.
    pub privilege_levels: IndexMap<String, PrivilegeLevel>,

    /// Patterns that indicate command failure.
    pub failed_when_contains: Vec<String>,

    /// Commands to run when connection is established.
    pub on_open_commands: Vec<String>,

    /// Terminal width for PTY.
    pub terminal_width: u32,

    /// Terminal height for PTY.
    pub terminal_height: u32,
}

impl PlatformDefinition {
    /// Create a new platform definition with minimal required fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            privilege_levels: IndexMap::new(),
            failed_when_contains: vec![],
            on_open_commands: vec![],
            terminal_width: 511,
            terminal_height: 24,
        }
    }

    /// Add a privilege level.
    pub fn with_privilege(mut self, level: PrivilegeLevel) -> Self {
        self.privilege_levels.insert(level.name.clone(), level);
        self
    }

    /// Add a failure pattern.
    pub fn with_failure_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.failed_when_contains.push(pattern.into());
        self
    }

    /// Add an on_open command.
    pub fn with_on_open_command(mut self, command: impl Into<String>) -> Self {
        self.on_open_commands.push(command.into());
        self
    }

    /// Set terminal dimensions.
    pub fn with_terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }

    /// The configuration level: the first level with "config" in its name.
    pub fn config_level(&self) -> Option<&PrivilegeLevel> {
        self.privilege_levels
            .values()
            .find(|level| level.name.to_lowercase().contains("config"))
    }

    /// Regex matching the prompt of any privilege level.
    pub fn any_prompt_pattern(&self) -> Result<Regex, regex::Error> {
        let combined = self
            .privilege_levels
            .values()
            .map(|level| format!("(?:{})", level.pattern.as_str()))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&combined)
    }

    /// Return the first configured failure pattern found in `output`.
    pub fn detect_failure(&self, output: &str) -> Option<&str> {
        self.failed_when_contains
            .iter()
            .find(|pattern| output.contains(pattern.as_str()))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PlatformDefinition {
        PlatformDefinition::new("sample")
            .with_privilege(PrivilegeLevel::new("exec", r"(?m)^\w+>\s?$").unwrap())
            .with_privilege(
                PrivilegeLevel::new("configuration", r"(?m)^\w+\(config\)#\s?$").unwrap(),
            )
            .with_failure_pattern("% Invalid input")
    }

    #[test]
    fn test_config_level_lookup() {
        let platform = sample();
        assert_eq!(platform.config_level().unwrap().name, "configuration");
        assert!(PlatformDefinition::new("bare").config_level().is_none());
    }

    #[test]
    fn test_any_prompt_pattern() {
        let pattern = sample().any_prompt_pattern().unwrap();
        assert!(pattern.is_match(b"output\nR1>"));
        assert!(pattern.is_match(b"R1(config)#"));
        assert!(!pattern.is_match(b"R1$"));
    }

    #[test]
    fn test_detect_failure() {
        let platform = sample();
        assert_eq!(
            platform.detect_failure("R1(config)#foo\n% Invalid input detected"),
            Some("% Invalid input")
        );
        assert_eq!(platform.detect_failure("all good"), None);
    }
}

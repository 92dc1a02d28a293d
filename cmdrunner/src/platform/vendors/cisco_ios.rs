//! Cisco IOS / IOS-XE platform definition.
//!
//! Privilege levels:
//! - `exec` - User EXEC mode with `>` prompt
//! - `privilege_exec` - Privileged EXEC mode with `#` prompt
//! - `configuration` - Configuration mode with `(config*)#` prompt
//!
//! Prompt patterns are adapted from [scrapli](https://github.com/carlmontanari/scrapli).
//!
//! # Prompt Examples
//!
//! ```text
//! R1>                    # exec mode
//! R1#                    # privilege_exec mode
//! R1(config)#            # configuration mode
//! R1(config-if)#         # config sub-mode (interface)
//! ```

use crate::platform::{PlatformDefinition, PrivilegeLevel};

/// Create the Cisco IOS platform definition.
pub fn platform() -> PlatformDefinition {
    let exec = PrivilegeLevel::new("exec", r"(?mi)^[\w.\-@/:]{1,63}>\s?$").unwrap();

    // The character class excludes parentheses, so config prompts never match here
    let privilege_exec =
        PrivilegeLevel::new("privilege_exec", r"(?mi)^[\w.\-@/:]{1,63}#\s?$").unwrap();

    let configuration = PrivilegeLevel::new(
        "configuration",
        r"(?mi)^[\w.\-@/:]{1,63}\(conf[\w.\-@/:+]{0,32}\)#\s?$",
    )
    .unwrap()
    .with_escalate("configure terminal")
    .with_deescalate("end");

    PlatformDefinition::new("cisco_ios")
        .with_privilege(exec)
        .with_privilege(privilege_exec)
        .with_privilege(configuration)
        .with_failure_pattern("% Ambiguous command")
        .with_failure_pattern("% Incomplete command")
        .with_failure_pattern("% Invalid input detected")
        .with_failure_pattern("% Unknown command")
        .with_on_open_command("terminal length 0")
        .with_on_open_command("terminal width 511")
        .with_terminal_size(511, 24)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt_matches(level: &str, prompt: &str) -> bool {
        platform().privilege_levels[level].pattern.is_match(prompt.as_bytes())
    }

    #[test]
    fn test_cisco_platform() {
        let platform = platform();
        assert_eq!(platform.name, "cisco_ios");
        assert_eq!(platform.privilege_levels.len(), 3);

        let config = platform.config_level().unwrap();
        assert_eq!(config.name, "configuration");
        assert_eq!(config.escalate_command.as_deref(), Some("configure terminal"));
        assert_eq!(config.deescalate_command.as_deref(), Some("end"));
    }

    #[test]
    fn test_exec_prompt_match() {
        assert!(prompt_matches("exec", "R1>"));
        assert!(prompt_matches("exec", "core-sw.lab>"));
        assert!(!prompt_matches("exec", "R1#"));
    }

    #[test]
    fn test_privilege_exec_prompt_match() {
        assert!(prompt_matches("privilege_exec", "R1#"));
        assert!(prompt_matches("privilege_exec", "show clock\nR1# "));
        assert!(!prompt_matches("privilege_exec", "R1(config)#"));
        assert!(!prompt_matches("privilege_exec", "R1#show version"));
    }

    #[test]
    fn test_configuration_prompt_match() {
        assert!(prompt_matches("configuration", "R1(config)#"));
        assert!(prompt_matches("configuration", "R1(config-if)#"));
        assert!(prompt_matches("configuration", "R1(config-router)# "));
        assert!(!prompt_matches("configuration", "R1#"));
    }

    #[test]
    fn test_any_prompt_covers_every_mode() {
        let any = platform().any_prompt_pattern().unwrap();
        for prompt in ["R1>", "R1#", "R1(config-line)#"] {
            assert!(any.is_match(prompt.as_bytes()), "{prompt}");
        }
        assert!(!any.is_match(b"user@host:~$"));
    }
}

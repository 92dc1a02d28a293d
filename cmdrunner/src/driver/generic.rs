//! Generic driver implementation that works with any platform.

use std::time::Duration;

use log::{debug, warn};
use regex::bytes::Regex;

use super::response::Response;
use crate::channel::{PtyChannel, PtyConfig};
use crate::error::{DriverError, PlatformError, Result};
use crate::platform::PlatformDefinition;
use crate::transport::{SshConfig, SshTransport};

/// Generic driver that works with any platform definition.
///
/// This is the main driver implementation that handles:
/// - SSH transport management
/// - Base prompt (hostname) discovery
/// - Prompt-terminated, timing-based and configuration-mode commands
pub struct GenericDriver {
    /// SSH configuration.
    ssh_config: SshConfig,

    /// Platform definition.
    platform: PlatformDefinition,

    /// SSH transport (None when disconnected).
    transport: Option<SshTransport>,

    /// Interactive shell on top of the transport.
    channel: Option<PtyChannel>,

    /// Matches any prompt of the platform; used until the hostname is known.
    any_prompt: Regex,

    /// Prompt patterns bound to the learned hostname.
    prompts: Option<HostPrompts>,

    /// Default timeout for operations.
    timeout: Duration,
}

/// Prompt regexes for one device, derived from its base prompt.
#[derive(Debug)]
struct HostPrompts {
    base: String,
    /// Any mode of this host: `R1>`, `R1#`, `R1(config-if)#`.
    any: Regex,
    /// Exec prompt after leaving configuration mode: `R1#`.
    exec: Regex,
    /// Configuration mode: `R1(config)#` and sub-modes.
    config: Regex,
}

impl HostPrompts {
    fn new(base: String) -> Result<Self> {
        let host = regex::escape(&base);
        let compile = |pattern: String| {
            Regex::new(&pattern).map_err(|e| PlatformError::InvalidDefinition {
                message: e.to_string(),
            })
        };
        Ok(Self {
            any: compile(format!(r"(?m)^{host}(?:\([^)\n]*\))?[>#]\s?$"))?,
            exec: compile(format!(r"(?m)^{host}#\s?$"))?,
            config: compile(format!(r"(?m)^{host}\(conf[^)\n]*\)#\s?$"))?,
            base,
        })
    }
}

impl GenericDriver {
    /// Create a new generic driver.
    pub fn new(ssh_config: SshConfig, platform: PlatformDefinition) -> Result<Self> {
        let any_prompt =
            platform
                .any_prompt_pattern()
                .map_err(|e| PlatformError::InvalidDefinition {
                    message: e.to_string(),
                })?;

        Ok(Self {
            timeout: ssh_config.timeout,
            ssh_config,
            platform,
            transport: None,
            channel: None,
            any_prompt,
            prompts: None,
        })
    }

    /// Target host of this driver.
    pub fn host(&self) -> &str {
        &self.ssh_config.host
    }

    /// The device's base prompt (hostname), known once the driver is open.
    pub fn base_prompt(&self) -> Option<&str> {
        self.prompts.as_ref().map(|p| p.base.as_str())
    }

    /// Check if the driver is connected.
    pub fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    /// Connect, open a shell, learn the base prompt and run on-open commands.
    pub async fn open(&mut self) -> Result<()> {
        if self.transport.is_some() {
            return Err(DriverError::AlreadyConnected.into());
        }

        let transport = SshTransport::connect(&self.ssh_config).await?;
        let raw = transport.open_channel().await?;
        self.transport = Some(transport);

        let config = PtyConfig {
            timeout: self.timeout,
            ..Default::default()
        };
        let channel = self.channel.insert(PtyChannel::new(raw, config));

        // Banner and first prompt, then a fresh prompt on its own line
        channel.read_until_pattern(&self.any_prompt, self.timeout).await?;
        channel.send("").await?;
        let data = channel.read_until_pattern(&self.any_prompt, self.timeout).await?;
        let output = String::from_utf8_lossy(&data);

        let base = extract_base_prompt(&output).ok_or_else(|| DriverError::NoBasePrompt {
            prompt: output.trim().to_string(),
        })?;
        debug!("{}: base prompt is {:?}", self.ssh_config.host, base);
        self.prompts = Some(HostPrompts::new(base)?);

        for cmd in self.platform.on_open_commands.clone() {
            self.send_command(&cmd).await?;
        }

        Ok(())
    }

    /// Close the shell and disconnect.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(channel) = self.channel.take() {
            if let Err(e) = channel.close().await {
                debug!("{}: channel close failed: {}", self.ssh_config.host, e);
            }
        }
        if let Some(transport) = self.transport.take() {
            transport.close().await?;
        }
        self.prompts = None;
        Ok(())
    }

    fn channel_and_prompts(&mut self) -> Result<(&mut PtyChannel, &HostPrompts)> {
        match (self.channel.as_mut(), self.prompts.as_ref()) {
            (Some(channel), Some(prompts)) => Ok((channel, prompts)),
            _ => Err(DriverError::NotConnected.into()),
        }
    }

    /// Send a command and wait for the device prompt.
    pub async fn send_command(&mut self, command: &str) -> Result<Response> {
        let timeout = self.timeout;
        let (channel, prompts) = self.channel_and_prompts()?;

        channel.send(command).await?;
        let data = channel.read_until_pattern(&prompts.any, timeout).await?;
        let response = Response::from_raw(command, &String::from_utf8_lossy(&data));

        match self.platform.detect_failure(&response.result) {
            Some(pattern) => {
                warn!("{}: {:?} failed: {}", self.ssh_config.host, command, pattern);
                Ok(response.with_failure(pattern))
            }
            None => Ok(response),
        }
    }

    /// Send a command and read until the device goes quiet.
    ///
    /// Returns the raw output, which may end in a confirmation question
    /// rather than a prompt.
    pub async fn send_command_timing(&mut self, command: &str) -> Result<String> {
        let (channel, _) = self.channel_and_prompts()?;
        channel.send(command).await?;
        let data = channel.read_until_idle().await?;
        Ok(String::from_utf8_lossy(&data).to_string())
    }

    /// Apply a set of configuration commands.
    ///
    /// Enters configuration mode, writes every command in a single write
    /// followed by the exit command, and reads until the exec prompt returns.
    pub async fn send_config_set(&mut self, commands: &[String]) -> Result<String> {
        let config_level = self
            .platform
            .config_level()
            .ok_or_else(|| DriverError::NoConfigMode {
                platform: self.platform.name.clone(),
            })?;
        let enter = config_level
            .escalate_command
            .clone()
            .unwrap_or_else(|| "configure terminal".to_string());
        let exit = config_level
            .deescalate_command
            .clone()
            .unwrap_or_else(|| "end".to_string());

        let timeout = self.timeout;
        let (channel, prompts) = self.channel_and_prompts()?;

        channel.send(&enter).await?;
        let mut transcript = channel.read_until_pattern(&prompts.config, timeout).await?;

        let mut batch = String::new();
        for command in commands {
            batch.push_str(command);
            batch.push('\n');
        }
        batch.push_str(&exit);
        batch.push('\n');
        channel.send_raw(batch.as_bytes()).await?;

        transcript.extend(channel.read_until_pattern(&prompts.exec, timeout).await?);
        Ok(String::from_utf8_lossy(&transcript).to_string())
    }
}

/// Derive the hostname from the last prompt line of `output`.
///
/// `R1#` and `R1>` give `R1`; a configuration prompt such as
/// `R1(config-if)#` also gives `R1`.
pub(crate) fn extract_base_prompt(output: &str) -> Option<String> {
    let line = output.lines().map(str::trim).rfind(|line| !line.is_empty())?;
    let line = line.trim_end_matches(['#', '>']);
    let base = match line.find('(') {
        Some(pos) => &line[..pos],
        None => line,
    };
    (!base.is_empty()).then(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_base_prompt() {
        assert_eq!(extract_base_prompt("\r\nR1#").as_deref(), Some("R1"));
        assert_eq!(extract_base_prompt("banner\r\ncore-sw1>\r\n").as_deref(), Some("core-sw1"));
        assert_eq!(extract_base_prompt("R1(config-if)#").as_deref(), Some("R1"));
        assert_eq!(extract_base_prompt("\r\n\r\n"), None);
        assert_eq!(extract_base_prompt("#"), None);
    }

    #[test]
    fn test_host_prompts() {
        let prompts = HostPrompts::new("edge.lab-1".to_string()).unwrap();

        assert!(prompts.any.is_match(b"output\nedge.lab-1#"));
        assert!(prompts.any.is_match(b"edge.lab-1>"));
        assert!(prompts.any.is_match(b"edge.lab-1(config-if)# "));
        assert!(!prompts.any.is_match(b"edgeXlab-1#"));

        assert!(prompts.exec.is_match(b"edge.lab-1(config)#end\nedge.lab-1#"));
        assert!(!prompts.exec.is_match(b"edge.lab-1(config-if)#"));

        assert!(prompts.config.is_match(b"Enter configuration commands\nedge.lab-1(config)#"));
        assert!(!prompts.config.is_match(b"edge.lab-1#"));
    }
}

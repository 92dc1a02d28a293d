//! The session seam between workers and the remote device.
//!
//! Workers only see [`Connector`] and [`Session`]. [`SshConnector`] is the
//! production implementation on top of [`GenericDriver`]; tests substitute
//! a scripted fake.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use log::debug;
use secrecy::{ExposeSecret, SecretString};

use crate::config::RunnerConfig;
use crate::driver::{DriverBuilder, GenericDriver};
use crate::error::Result;
use crate::inventory::DeviceSpec;
use crate::platform::PlatformRegistry;
use crate::prompt::RunContext;
use crate::transport::{AuthMethod, HostKeyVerification};

/// Everything needed to open one session: the device merged with the
/// run's credentials and settings.
#[derive(Debug)]
pub struct SessionParams {
    pub host: String,
    pub port: u16,
    pub device_type: String,
    pub username: String,
    pub auth: AuthMethod,
    pub timeout: Duration,
    pub host_key_verification: HostKeyVerification,
    pub known_hosts_path: Option<PathBuf>,
}

impl SessionParams {
    /// Merge run credentials into a device's connection parameters.
    ///
    /// A device with a `key_file` authenticates with that key; every other
    /// device uses the run password.
    pub fn for_device(device: &DeviceSpec, ctx: &RunContext, config: &RunnerConfig) -> Self {
        let auth = match &device.key_file {
            Some(path) => AuthMethod::PrivateKey {
                path: path.clone(),
                passphrase: None,
            },
            None => AuthMethod::Password(SecretString::from(
                ctx.password.expose_secret().to_owned(),
            )),
        };

        Self {
            host: device.ip.clone(),
            port: device.port,
            device_type: device.device_type.clone(),
            username: ctx.username.clone(),
            auth,
            timeout: config.timeout,
            host_key_verification: config.host_key_verification,
            known_hosts_path: config.known_hosts.clone(),
        }
    }
}

/// Opens sessions to devices.
pub trait Connector: Send + Sync + 'static {
    type Session: Session;

    /// Connect and authenticate.
    fn open(&self, params: SessionParams) -> impl Future<Output = Result<Self::Session>> + Send;
}

/// A live, authenticated command session on one device.
pub trait Session: Send {
    /// The device's self-reported name (its base prompt).
    fn identity(&self) -> &str;

    /// Send one command and wait for the prompt; returns normalized output.
    fn send_command(&mut self, command: &str) -> impl Future<Output = Result<String>> + Send;

    /// Apply a whole configuration batch in one operation.
    fn send_batch(&mut self, commands: &[String]) -> impl Future<Output = Result<String>> + Send;

    /// Send one line and return whatever arrives before the device goes quiet.
    fn send_timed(&mut self, command: &str) -> impl Future<Output = Result<String>> + Send;

    /// End the session.
    fn close(self) -> impl Future<Output = Result<()>> + Send;
}

/// Connector that opens SSH sessions with platform-aware drivers.
#[derive(Debug)]
pub struct SshConnector {
    registry: PlatformRegistry,
}

impl SshConnector {
    pub fn new(registry: PlatformRegistry) -> Self {
        Self { registry }
    }
}

impl Default for SshConnector {
    fn default() -> Self {
        Self::new(PlatformRegistry::with_builtins())
    }
}

impl Connector for SshConnector {
    type Session = GenericDriver;

    async fn open(&self, params: SessionParams) -> Result<GenericDriver> {
        let platform = self.registry.get(&params.device_type)?.clone();

        let mut builder = DriverBuilder::new(params.host)
            .port(params.port)
            .username(params.username)
            .auth(params.auth)
            .platform(platform)
            .timeout(params.timeout)
            .host_key_verification(params.host_key_verification);
        if let Some(path) = params.known_hosts_path {
            builder = builder.known_hosts_path(path);
        }
        let mut driver = builder.build()?;

        // A shell may already be up when prompt discovery fails
        if let Err(e) = driver.open().await {
            if let Err(close_err) = GenericDriver::close(&mut driver).await {
                debug!("{}: close after failed open: {}", driver.host(), close_err);
            }
            return Err(e);
        }
        Ok(driver)
    }
}

impl Session for GenericDriver {
    fn identity(&self) -> &str {
        self.base_prompt().unwrap_or_else(|| self.host())
    }

    async fn send_command(&mut self, command: &str) -> Result<String> {
        let response = GenericDriver::send_command(self, command).await?;
        if let Some(failure) = &response.failure_message {
            debug!("{}: {:?} reported {:?}", self.host(), command, failure);
        }
        Ok(response.result)
    }

    async fn send_batch(&mut self, commands: &[String]) -> Result<String> {
        self.send_config_set(commands).await
    }

    async fn send_timed(&mut self, command: &str) -> Result<String> {
        self.send_command_timing(command).await
    }

    async fn close(mut self) -> Result<()> {
        GenericDriver::close(&mut self).await
    }
}


#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_params_merge_run_credentials() {
        let device = DeviceSpec::new("10.0.0.1");
        let ctx = RunContext::new("CHG0001", "netops", "s3cret");
        let params = SessionParams::for_device(&device, &ctx, &RunnerConfig::default());

        assert_eq!(params.host, "10.0.0.1");
        assert_eq!(params.port, 22);
        assert_eq!(params.username, "netops");
        assert_eq!(params.timeout, Duration::from_secs(30));
        match params.auth {
            AuthMethod::Password(password) => assert_eq!(password.expose_secret(), "s3cret"),
            other => panic!("expected password auth, got {other:?}"),
        }
    }

    #[test]
    fn test_params_prefer_key_file() {
        let mut device = DeviceSpec::new("edge1.example.net");
        device.key_file = Some(PathBuf::from("/keys/id_ed25519"));
        let ctx = RunContext::new("CHG0001", "netops", "s3cret");
        let params = SessionParams::for_device(&device, &ctx, &RunnerConfig::default());

        assert!(matches!(params.auth, AuthMethod::PrivateKey { ref path, .. } if path == &PathBuf::from("/keys/id_ed25519")));
    }

    #[test]
    fn test_params_carry_known_hosts_file() {
        let config = RunnerConfig {
            known_hosts: Some(PathBuf::from("/etc/cmdrunner/known_hosts")),
            ..RunnerConfig::default()
        };
        let ctx = RunContext::new("CHG0001", "netops", "s3cret");
        let params = SessionParams::for_device(&DeviceSpec::new("10.0.0.1"), &ctx, &config);
        assert_eq!(
            params.known_hosts_path,
            Some(PathBuf::from("/etc/cmdrunner/known_hosts"))
        );

        let params =
            SessionParams::for_device(&DeviceSpec::new("10.0.0.1"), &ctx, &RunnerConfig::default());
        assert!(params.known_hosts_path.is_none());
    }

    #[tokio::test]
    async fn test_failed_open_returns_original_error() {
        // Accepts the TCP connection, then hangs up before any SSH banner
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            drop(socket);
        });

        let mut device = DeviceSpec::new("127.0.0.1");
        device.port = port;
        let config = RunnerConfig {
            timeout: Duration::from_secs(5),
            ..RunnerConfig::default()
        };
        let ctx = RunContext::new("CHG0001", "netops", "s3cret");
        let params = SessionParams::for_device(&device, &ctx, &config);

        let err = SshConnector::default().open(params).await.err().unwrap();
        assert_ne!(err.failure_kind(), crate::error::FailureKind::Authentication);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_ssh_connector_rejects_unknown_platform() {
        let mut device = DeviceSpec::new("10.0.0.1");
        device.device_type = "juniper_junos".to_string();
        let ctx = RunContext::new("CHG0001", "netops", "s3cret");
        let params = SessionParams::for_device(&device, &ctx, &RunnerConfig::default());

        let err = SshConnector::default().open(params).await.err().unwrap();
        assert_eq!(err.failure_kind(), crate::error::FailureKind::Session);
    }
}

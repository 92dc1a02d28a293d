use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::builder::RangedU64ValueParser;
use clap::{Parser, ValueEnum};
use console::Term;
use log::warn;

use cmdrunner::{
    AuditLog, CommandBatch, HostKeyVerification, RunContext, RunnerConfig, SshConnector, banner,
    inventory, runner,
};

#[derive(Parser, Debug)]
#[command(name = "cmdrunner", version)]
#[command(about = "Apply a command file to every device of an inventory over SSH.")]
struct Cli {
    /// JSON array of devices
    devices: PathBuf,

    /// Configuration commands, one per line
    commands: PathBuf,

    /// Audit log, appended to
    #[arg(long, env = "CMDRUNNER_LOG_FILE", default_value = "cmdrunner.log")]
    log_file: PathBuf,

    /// Seconds allowed for connecting and for each device read
    #[arg(long, env = "CMDRUNNER_TIMEOUT", default_value_t = 30)]
    timeout: u64,

    /// Results buffered between workers and the report
    #[arg(
        long,
        env = "CMDRUNNER_CHANNEL_CAPACITY",
        default_value_t = 40,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    channel_capacity: usize,

    /// Host key policy
    #[arg(long, value_enum, default_value_t = HostKeyChecking::Off)]
    host_key_checking: HostKeyChecking,

    /// known_hosts file used by strict and accept-new checking
    #[arg(long, env = "CMDRUNNER_KNOWN_HOSTS")]
    known_hosts: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum HostKeyChecking {
    /// Only connect to hosts already in known_hosts
    Strict,
    /// Learn unknown hosts, reject changed keys
    AcceptNew,
    /// Accept any key
    Off,
}

impl From<HostKeyChecking> for HostKeyVerification {
    fn from(mode: HostKeyChecking) -> Self {
        match mode {
            HostKeyChecking::Strict => HostKeyVerification::Strict,
            HostKeyChecking::AcceptNew => HostKeyVerification::AcceptNew,
            HostKeyChecking::Off => HostKeyVerification::Disabled,
        }
    }
}

impl Cli {
    fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            log_file: self.log_file.clone(),
            timeout: Duration::from_secs(self.timeout),
            channel_capacity: self.channel_capacity,
            host_key_verification: self.host_key_checking.into(),
            known_hosts: self.known_hosts.clone(),
            ..RunnerConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let devices = inventory::load_devices(&cli.devices)
        .with_context(|| format!("loading devices from {}", cli.devices.display()))?;
    let batch = CommandBatch::load(&cli.commands)
        .with_context(|| format!("loading commands from {}", cli.commands.display()))?;
    let config = cli.runner_config();

    println!("{}", banner::rule());
    let ctx = RunContext::prompt(&Term::stdout()).context("reading ticket and credentials")?;

    let audit = match AuditLog::open(&config.log_file) {
        Ok(log) => log,
        Err(e) => {
            warn!(
                "audit log {} unavailable, continuing without it: {}",
                config.log_file.display(),
                e
            );
            AuditLog::disabled()
        }
    };
    let audit = Arc::new(audit);

    let report = runner::run(
        SshConnector::default(),
        devices,
        batch,
        ctx,
        config,
        audit.clone(),
    )
    .await;

    let rendered = report.render(&mut io::stdout().lock());
    audit.close();

    match rendered {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other.context("writing report"),
    }
}

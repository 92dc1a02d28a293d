//! PTY channel abstraction for interactive sessions.

use std::time::Duration;

use log::trace;
use regex::bytes::Regex;
use russh::client::Msg;
use russh::{Channel, ChannelMsg};
use tokio::time::{Instant, timeout_at};

use super::buffer::PatternBuffer;
use crate::error::{ChannelError, Result};

/// Configuration for PTY channel behavior.
#[derive(Debug, Clone)]
pub struct PtyConfig {
    /// Default timeout for operations.
    pub timeout: Duration,

    /// Search depth for pattern matching.
    pub search_depth: usize,

    /// How long the channel must stay quiet before a timing read completes.
    pub idle_delay: Duration,
}

impl Default for PtyConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            search_depth: 1000,
            idle_delay: Duration::from_secs(2),
        }
    }
}

/// High-level PTY channel for interactive device sessions.
///
/// Wraps an open russh shell channel and provides pattern-based and
/// timing-based reads on top of a [`PatternBuffer`].
pub struct PtyChannel {
    channel: Channel<Msg>,
    buffer: PatternBuffer,
    config: PtyConfig,
}

impl PtyChannel {
    /// Wrap an open shell channel.
    pub fn new(channel: Channel<Msg>, config: PtyConfig) -> Self {
        Self {
            channel,
            buffer: PatternBuffer::new(config.search_depth),
            config,
        }
    }

    /// Send a line of input (a newline is appended).
    pub async fn send(&mut self, input: &str) -> Result<()> {
        let line = format!("{input}\n");
        self.send_raw(line.as_bytes()).await
    }

    /// Send raw bytes without appending anything.
    pub async fn send_raw(&mut self, data: &[u8]) -> Result<()> {
        trace!("send: {:?}", String::from_utf8_lossy(data));
        self.channel
            .data(data)
            .await
            .map_err(ChannelError::Ssh)?;
        Ok(())
    }

    /// Read until `pattern` matches the tail of the buffer.
    ///
    /// Returns everything read, including the matched prompt.
    pub async fn read_until_pattern(&mut self, pattern: &Regex, timeout: Duration) -> Result<Vec<u8>> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.buffer.tail_contains(pattern) {
                return Ok(self.buffer.take());
            }
            match timeout_at(deadline, self.channel.wait()).await {
                Err(_) => return Err(ChannelError::PatternTimeout(timeout).into()),
                Ok(None) => return Err(ChannelError::Closed.into()),
                Ok(Some(msg)) => self.absorb(msg)?,
            }
        }
    }

    /// Read until the device stops sending for the configured idle delay.
    ///
    /// Used for commands whose completion cannot be recognized by a prompt,
    /// such as those that may stop at a confirmation question. The overall
    /// read is bounded by the channel timeout.
    pub async fn read_until_idle(&mut self) -> Result<Vec<u8>> {
        let deadline = Instant::now() + self.config.timeout;
        loop {
            let quiet = (Instant::now() + self.config.idle_delay).min(deadline);
            match timeout_at(quiet, self.channel.wait()).await {
                Err(_) => return Ok(self.buffer.take()),
                Ok(None) => return Err(ChannelError::Closed.into()),
                Ok(Some(msg)) => self.absorb(msg)?,
            }
        }
    }

    /// Fold one channel message into the buffer.
    fn absorb(&mut self, msg: ChannelMsg) -> Result<()> {
        match msg {
            ChannelMsg::Data { ref data } => self.buffer.extend(data),
            ChannelMsg::ExtendedData { ref data, .. } => self.buffer.extend(data),
            ChannelMsg::Eof | ChannelMsg::Close => return Err(ChannelError::Closed.into()),
            _ => {}
        }
        Ok(())
    }

    /// Close the channel.
    pub async fn close(self) -> Result<()> {
        self.channel.close().await.map_err(ChannelError::Ssh)?;
        Ok(())
    }
}

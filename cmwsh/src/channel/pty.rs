//! PTY channel for interactive device sessions.

use std::time::Duration;

use log::trace;
use regex::bytes::Regex;
use russh::client::Msg;
use russh::{Channel, ChannelMsg};

use super::buffer::PatternBuffer;
use crate::error::{ChannelError, Result};

/// Configuration for PTY channel reads.
#[derive(Debug, Clone)]
pub struct PtyConfig {
    /// How long one read attempt waits for data.
    pub poll_interval: Duration,

    /// Default number of read attempts before giving up on a pattern.
    pub max_loops: usize,

    /// Search depth for prompt matching.
    pub search_depth: usize,
}

impl Default for PtyConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            max_loops: 500,
            search_depth: 1000,
        }
    }
}

/// Interactive shell channel with pattern-based reads.
///
/// Exactly one request/response exchange is in flight at a time; every
/// method takes `&mut self`.
pub struct PtyChannel {
    channel: Channel<Msg>,
    buffer: PatternBuffer,
    config: PtyConfig,
}

impl PtyChannel {
    /// Wrap an already opened shell channel.
    pub fn new(channel: Channel<Msg>, config: PtyConfig) -> Self {
        Self {
            buffer: PatternBuffer::new(config.search_depth),
            channel,
            config,
        }
    }

    /// Send a line of input, terminated with a newline.
    pub async fn send(&mut self, input: &str) -> Result<()> {
        trace!("pty send: {:?}", input);
        let line = format!("{input}\n");
        self.write_raw(line.as_bytes()).await
    }

    /// Write raw bytes without waiting for any response.
    pub async fn write_raw(&mut self, data: &[u8]) -> Result<()> {
        self.channel
            .data(data)
            .await
            .map_err(ChannelError::Ssh)?;
        Ok(())
    }

    /// Read until `pattern` appears in the buffer tail.
    ///
    /// Each attempt waits at most one poll interval for data. When
    /// `max_loops` attempts (or the configured default) pass without a match,
    /// [`ChannelError::PatternTimeout`] is returned. The matched data,
    /// prompt included, is drained from the buffer.
    pub async fn read_until_pattern(
        &mut self,
        pattern: &Regex,
        max_loops: Option<usize>,
    ) -> Result<Vec<u8>> {
        let attempts = max_loops.unwrap_or(self.config.max_loops);

        for _ in 0..attempts {
            if self.buffer.tail_contains(pattern) {
                return Ok(self.buffer.take());
            }

            match tokio::time::timeout(self.config.poll_interval, self.channel.wait()).await {
                Err(_) => continue,
                Ok(Some(ChannelMsg::Data { data })) => {
                    trace!("pty read {} bytes", data.len());
                    self.buffer.extend(&data);
                }
                Ok(Some(ChannelMsg::ExtendedData { data, .. })) => {
                    self.buffer.extend(&data);
                }
                Ok(Some(ChannelMsg::Eof | ChannelMsg::Close)) | Ok(None) => {
                    return Err(ChannelError::Closed.into());
                }
                Ok(Some(_)) => {}
            }
        }

        if self.buffer.tail_contains(pattern) {
            return Ok(self.buffer.take());
        }

        Err(ChannelError::PatternTimeout {
            pattern: pattern.as_str().to_string(),
            attempts,
        }
        .into())
    }

    /// Close the channel.
    pub async fn close(self) -> Result<()> {
        self.channel.close().await.map_err(ChannelError::Ssh)?;
        Ok(())
    }

    pub fn config(&self) -> &PtyConfig {
        &self.config
    }
}

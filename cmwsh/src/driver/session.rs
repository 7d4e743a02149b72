//! SSH-backed interactive session.

use std::time::Instant;

use log::{debug, warn};
use regex::bytes::Regex;

use super::CliSession;
use super::response::Response;
use crate::channel::{PtyChannel, PtyConfig};
use crate::error::{ChannelError, DriverError, Result};
use crate::platform::PlatformDefinition;
use crate::transport::{SshConfig, SshTransport};

/// Interactive CLI session over an SSH PTY.
///
/// Handles:
/// - SSH transport and shell channel lifetime
/// - Prompt detection with the platform's combined prompt pattern
/// - Tracking the current view from each prompt seen
/// - Output normalization and failure pattern detection
pub struct SshSession {
    ssh_config: SshConfig,
    platform: PlatformDefinition,
    pty_config: PtyConfig,
    transport: Option<SshTransport>,
    channel: Option<PtyChannel>,
    prompt_pattern: Regex,
    current_privilege: Option<String>,
}

impl SshSession {
    /// Create a session; nothing is connected until [`open`](CliSession::open).
    pub fn new(
        ssh_config: SshConfig,
        platform: PlatformDefinition,
        pty_config: PtyConfig,
    ) -> Result<Self> {
        let prompt_pattern = platform
            .prompt_pattern()
            .map_err(ChannelError::InvalidPattern)?;

        Ok(Self {
            ssh_config,
            platform,
            pty_config,
            transport: None,
            channel: None,
            prompt_pattern,
            current_privilege: None,
        })
    }

    /// Get a reference to the platform definition.
    pub fn platform(&self) -> &PlatformDefinition {
        &self.platform
    }

    /// Name of the view the last prompt belonged to.
    pub fn current_privilege(&self) -> Option<&str> {
        self.current_privilege.as_deref()
    }

    fn update_privilege(&mut self, prompt: &str) {
        if let Some(level) = self.platform.determine_privilege(prompt) {
            self.current_privilege = Some(level.name.clone());
        }
    }

    async fn exchange(
        &mut self,
        command: &str,
        pattern: &Regex,
        max_loops: Option<usize>,
    ) -> Result<Response> {
        let channel = self.channel.as_mut().ok_or(DriverError::NotConnected)?;

        debug!("send: {:?}", command);
        let start = Instant::now();

        channel.send(command).await?;
        let data = channel.read_until_pattern(pattern, max_loops).await?;

        let elapsed = start.elapsed();
        let raw = String::from_utf8_lossy(&data).to_string();

        let prompt = pattern
            .find_iter(&data)
            .last()
            .map(|m| String::from_utf8_lossy(m.as_bytes()).trim().to_string())
            .unwrap_or_default();
        self.update_privilege(&prompt);

        let result = self.platform.normalize_output(&raw, command);
        let folded = raw.replace("\r\n", "\n");
        let failure = self.platform.detect_failure(&result).map(str::to_string);

        let response = Response::new(command, result, folded, prompt, elapsed);
        Ok(match failure {
            Some(message) => {
                debug!("command {:?} matched failure pattern {:?}", command, message);
                response.with_failure(message)
            }
            None => response,
        })
    }
}

impl CliSession for SshSession {
    async fn open(&mut self) -> Result<()> {
        if self.transport.is_some() {
            return Err(DriverError::AlreadyConnected.into());
        }

        let transport = SshTransport::connect(self.ssh_config.clone()).await?;
        let shell = transport.open_shell().await?;
        self.transport = Some(transport);

        let mut channel = PtyChannel::new(shell, self.pty_config.clone());
        let banner = channel.read_until_pattern(&self.prompt_pattern, None).await?;
        self.channel = Some(channel);

        let banner = String::from_utf8_lossy(&banner);
        if let Some(last) = banner.lines().map(str::trim).rfind(|l| !l.is_empty()) {
            self.update_privilege(last);
        }
        debug!(
            "session open on {} ({:?})",
            self.platform.name, self.current_privilege
        );

        for command in self.platform.on_open_commands.clone() {
            self.send_command(&command).await?;
        }

        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(channel) = self.channel.take() {
            if let Err(e) = channel.close().await {
                warn!("failed to close shell channel: {}", e);
            }
        }
        self.current_privilege = None;
        if let Some(transport) = self.transport.take() {
            transport.close().await?;
        }
        Ok(())
    }

    async fn send_command(&mut self, command: &str) -> Result<Response> {
        let pattern = self.prompt_pattern.clone();
        self.exchange(command, &pattern, None).await
    }

    async fn send_command_expect(
        &mut self,
        command: &str,
        expect: &Regex,
        max_loops: Option<usize>,
    ) -> Result<Response> {
        self.exchange(command, expect, max_loops).await
    }

    async fn write_raw(&mut self, data: &[u8]) -> Result<()> {
        let channel = self.channel.as_mut().ok_or(DriverError::NotConnected)?;
        channel.write_raw(data).await
    }

    fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    async fn is_alive(&mut self) -> bool {
        let transport_up = self
            .transport
            .as_ref()
            .is_some_and(|transport| !transport.is_closed());
        transport_up && self.write_raw(&[0]).await.is_ok()
    }

    fn in_config_mode(&self) -> bool {
        self.current_privilege.as_deref() == Some(self.platform.config_privilege.as_str())
    }
}

impl Drop for SshSession {
    fn drop(&mut self) {
        if self.transport.is_some() {
            warn!(
                "SshSession to {} dropped without close()",
                self.ssh_config.host
            );
        }
    }
}

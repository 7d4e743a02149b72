//! SFTP upload of candidate configuration files.

use std::path::Path;

use log::debug;
use russh_sftp::client::SftpSession;
use tokio::io::AsyncWriteExt;

use super::FileTransfer;
use super::config::SshConfig;
use super::ssh::SshTransport;
use crate::error::{Result, TransportError};

/// File transfer over a dedicated SSH connection's SFTP subsystem.
///
/// Each `put` opens its own connection so a long upload never shares the
/// interactive shell's channel.
#[derive(Debug, Clone)]
pub struct SftpTransfer {
    config: SshConfig,
}

impl SftpTransfer {
    pub fn new(config: SshConfig) -> Self {
        Self { config }
    }
}

impl FileTransfer for SftpTransfer {
    async fn put(&mut self, local_path: &Path, remote_name: &str) -> Result<()> {
        debug!(
            "sftp put {} -> {}:{}",
            local_path.display(),
            self.config.host,
            remote_name
        );

        let transport = SshTransport::connect(self.config.clone()).await?;
        let channel = transport.open_sftp_channel().await?;

        let sftp = SftpSession::new(channel.into_stream())
            .await
            .map_err(|e| TransportError::Sftp(e.to_string()))?;

        let mut local = tokio::fs::File::open(local_path).await?;
        let mut remote = sftp
            .create(remote_name)
            .await
            .map_err(|e| TransportError::Sftp(e.to_string()))?;

        tokio::io::copy(&mut local, &mut remote).await?;
        remote.shutdown().await?;

        sftp.close()
            .await
            .map_err(|e| TransportError::Sftp(e.to_string()))?;
        transport.close().await
    }
}

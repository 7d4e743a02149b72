//! SSH transport layer wrapping russh.
//!
//! This module provides the low-level SSH connection management and the
//! file-transfer collaborator used to stage replacement configurations.

pub mod config;
mod sftp;
mod ssh;

pub use config::{AuthMethod, SshConfig};
pub use sftp::SftpTransfer;
pub use ssh::SshTransport;

use std::future::Future;
use std::path::Path;

use crate::error::Result;

/// Uploads a local file to the device's default file system.
pub trait FileTransfer: Send {
    /// Copy `local_path` to the device under `remote_name`.
    fn put(&mut self, local_path: &Path, remote_name: &str)
    -> impl Future<Output = Result<()>> + Send;
}

//! Free-space and checksum checks that gate candidate uploads.

use std::path::{Path, PathBuf};

use log::debug;
use md5::{Digest, Md5};
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::io::AsyncReadExt;

use crate::driver::CliSession;
use crate::error::{ConfigError, FormatError, Result, TransportError};

static FREE_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([\d,]+)\s*KB free\)").expect("valid free space pattern"));

/// Decision record for one candidate upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferTicket {
    pub local_path: PathBuf,
    pub remote_name: String,
    /// Lower-case hex MD5 of the local file.
    pub local_hash: String,
    /// Device-reported MD5, when the remote file exists.
    pub remote_hash: Option<String>,
    pub requires_transfer: bool,
}

/// Device-side file checks.
#[derive(Debug, Clone)]
pub struct IntegrityVerifier {
    file_system: String,
    block_size: usize,
}

impl Default for IntegrityVerifier {
    fn default() -> Self {
        Self::new("flash:")
    }
}

impl IntegrityVerifier {
    pub fn new(file_system: impl Into<String>) -> Self {
        Self {
            file_system: file_system.into(),
            block_size: 1 << 20,
        }
    }

    /// Read size used when hashing local files.
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    pub fn file_system(&self) -> &str {
        &self.file_system
    }

    /// Fully qualified device path, e.g. `flash:/candidate.cfg`.
    pub fn remote_path(&self, name: &str) -> String {
        format!("{}/{}", self.file_system, name)
    }

    /// Bytes free on the file system, from a `dir` listing.
    pub async fn free_space<S: CliSession>(&self, session: &mut S) -> Result<u64> {
        let response = session
            .send_command(&format!("dir {}", self.file_system))
            .await?;
        Ok(parse_free_space(&response.result)?)
    }

    /// Fail with [`ConfigError::InsufficientSpace`] unless `file_size`
    /// bytes fit on the file system.
    pub async fn check_space<S: CliSession>(&self, session: &mut S, file_size: u64) -> Result<()> {
        let available = self.free_space(session).await?;
        debug!("{} bytes free, need {}", available, file_size);
        if file_size > available {
            return Err(ConfigError::InsufficientSpace {
                required: file_size,
                available,
            }
            .into());
        }
        Ok(())
    }

    /// Whether `name` exists on the file system.
    pub async fn file_exists<S: CliSession>(&self, session: &mut S, name: &str) -> Result<bool> {
        let response = session
            .send_command(&format!("dir {}", self.remote_path(name)))
            .await?;
        Ok(!response.contains("No file found"))
    }

    /// Device-reported MD5 of `name`.
    pub async fn remote_md5<S: CliSession>(&self, session: &mut S, name: &str) -> Result<String> {
        let response = session
            .send_command(&format!("display system file-md5 {}", self.remote_path(name)))
            .await?;
        Ok(parse_remote_md5(&response.result, name)?)
    }

    /// MD5 of a local file, read in fixed-size blocks.
    pub async fn local_md5(&self, path: &Path) -> Result<String> {
        let mut file = tokio::fs::File::open(path)
            .await
            .map_err(|_| ConfigError::Validation {
                path: path.to_path_buf(),
            })?;

        let mut hasher = Md5::new();
        let mut block = vec![0u8; self.block_size];
        loop {
            let n = file
                .read(&mut block)
                .await
                .map_err(TransportError::Io)?;
            if n == 0 {
                break;
            }
            hasher.update(&block[..n]);
        }

        Ok(hex::encode(hasher.finalize()))
    }

    /// Build the upload decision for `local_path` as `remote_name`.
    ///
    /// A transfer is skipped only when the remote file exists and its
    /// checksum equals the local one.
    pub async fn ticket<S: CliSession>(
        &self,
        session: &mut S,
        local_path: &Path,
        remote_name: &str,
    ) -> Result<TransferTicket> {
        let local_hash = self.local_md5(local_path).await?;

        let remote_hash = if self.file_exists(session, remote_name).await? {
            Some(self.remote_md5(session, remote_name).await?)
        } else {
            None
        };

        let requires_transfer = remote_hash
            .as_deref()
            .is_none_or(|remote| !remote.eq_ignore_ascii_case(&local_hash));

        debug!(
            "{} -> {}: local {} remote {:?}, transfer: {}",
            local_path.display(),
            remote_name,
            local_hash,
            remote_hash,
            requires_transfer
        );

        Ok(TransferTicket {
            local_path: local_path.to_path_buf(),
            remote_name: remote_name.to_string(),
            local_hash,
            remote_hash,
            requires_transfer,
        })
    }

    /// Whether `local_path` must be uploaded to `remote_name`.
    pub async fn needs_transfer<S: CliSession>(
        &self,
        session: &mut S,
        remote_name: &str,
        local_path: &Path,
    ) -> Result<bool> {
        Ok(self
            .ticket(session, local_path, remote_name)
            .await?
            .requires_transfer)
    }
}

/// Parse the `(<n> KB free)` fragment of a `dir` listing into bytes.
pub fn parse_free_space(output: &str) -> std::result::Result<u64, FormatError> {
    let caps = FREE_SPACE
        .captures(output)
        .ok_or_else(|| FormatError::Unexpected {
            message: "Failed to get free space of file system".to_string(),
            output: output.to_string(),
        })?;

    let digits: String = caps[1].chars().filter(char::is_ascii_digit).collect();
    let kbytes: u64 = digits.parse().map_err(|_| FormatError::InvalidValue {
        field: "free_space",
        value: caps[1].to_string(),
    })?;

    Ok(kbytes.saturating_mul(1024))
}

/// Pick the checksum for `name` out of `display system file-md5` output.
pub fn parse_remote_md5(output: &str, name: &str) -> std::result::Result<String, FormatError> {
    let basename = name.rsplit(['/', ':']).next().unwrap_or(name);
    let pattern = Regex::new(&format!(r"{}\s+(\w+)", regex::escape(basename))).map_err(|e| {
        FormatError::Unexpected {
            message: e.to_string(),
            output: output.to_string(),
        }
    })?;

    pattern
        .captures(output)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| FormatError::Unexpected {
            message: format!("No checksum for {} in output", basename),
            output: output.to_string(),
        })
}

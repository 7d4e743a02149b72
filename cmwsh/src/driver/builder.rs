//! Builder for creating Comware devices.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

use super::session::SshSession;
use crate::channel::PtyConfig;
use crate::device::ComwareDevice;
use crate::error::{DriverError, Result};
use crate::platform::comware;
use crate::transport::SftpTransfer;
use crate::transport::config::{AuthMethod, SshConfig};

/// Tunables that usually come from an inventory or config file.
///
/// Every field has a default, so `{}` deserializes to a usable value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeviceOptions {
    /// SSH port.
    pub port: u16,

    /// Connect timeout in seconds.
    pub timeout: u64,

    /// Switch the device to `file prompt quiet` before file operations.
    pub auto_file_prompt: bool,

    /// File system candidates and snapshots are stored on.
    pub file_system: String,

    /// Read attempts before a pattern wait gives up.
    pub max_loops: usize,

    /// Check the server key against known_hosts.
    pub verify_host_key: bool,
}

impl Default for DeviceOptions {
    fn default() -> Self {
        Self {
            port: 22,
            timeout: 60,
            auto_file_prompt: true,
            file_system: "flash:".to_string(),
            max_loops: 500,
            verify_host_key: false,
        }
    }
}

/// Builder for constructing a [`ComwareDevice`] over SSH.
///
/// # Example
///
/// ```rust,no_run
/// use cmwsh::driver::DriverBuilder;
///
/// # async fn example() -> Result<(), cmwsh::Error> {
/// let mut device = DriverBuilder::new("192.168.1.1")
///     .username("admin")
///     .password("secret")
///     .build()?;
/// device.open().await?;
/// let facts = device.get_facts().await?;
/// println!("{} running {}", facts.hostname, facts.os_version);
/// device.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct DriverBuilder {
    host: String,
    username: Option<String>,
    auth: AuthMethod,
    known_hosts_path: Option<PathBuf>,
    options: DeviceOptions,
}

impl DriverBuilder {
    /// Create a new builder for the specified host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            username: None,
            auth: AuthMethod::None,
            known_hosts_path: None,
            options: DeviceOptions::default(),
        }
    }

    /// Replace all tunables at once.
    pub fn options(mut self, options: DeviceOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the SSH port (default: 22).
    pub fn port(mut self, port: u16) -> Self {
        self.options.port = port;
        self
    }

    /// Set the username for authentication.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set password authentication.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.auth = AuthMethod::Password(SecretString::from(password.into()));
        self
    }

    /// Set private key authentication.
    pub fn private_key(mut self, key_path: impl Into<PathBuf>) -> Self {
        self.auth = AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: None,
        };
        self
    }

    /// Set private key authentication with passphrase.
    pub fn private_key_with_passphrase(
        mut self,
        key_path: impl Into<PathBuf>,
        passphrase: impl Into<String>,
    ) -> Self {
        self.auth = AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: Some(SecretString::from(passphrase.into())),
        };
        self
    }

    /// Set the connection timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout.as_secs();
        self
    }

    /// Toggle automatic `file prompt quiet` (default: on).
    pub fn auto_file_prompt(mut self, enabled: bool) -> Self {
        self.options.auto_file_prompt = enabled;
        self
    }

    /// Require the host key to be present in known_hosts.
    pub fn verify_host_key(mut self, verify: bool) -> Self {
        self.options.verify_host_key = verify;
        self
    }

    /// Use a specific known_hosts file.
    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Set the read attempt budget for pattern waits.
    pub fn max_loops(mut self, max_loops: usize) -> Self {
        self.options.max_loops = max_loops;
        self
    }

    /// Build the device.
    ///
    /// This does not connect. Call `open()` on the returned device to
    /// establish the session.
    pub fn build(self) -> Result<ComwareDevice<SshSession, SftpTransfer>> {
        let ssh_config = self.ssh_config()?;
        let platform = comware::platform();

        let pty_config = PtyConfig {
            max_loops: self.options.max_loops,
            ..PtyConfig::default()
        };

        let session = SshSession::new(ssh_config.clone(), platform, pty_config)?;
        let transfer = SftpTransfer::new(ssh_config);

        Ok(ComwareDevice::new(session, transfer, self.options))
    }

    fn ssh_config(&self) -> Result<SshConfig> {
        let username = self
            .username
            .clone()
            .ok_or_else(|| DriverError::InvalidConfig {
                message: "Username is required".to_string(),
            })?;

        if self.options.max_loops == 0 {
            return Err(DriverError::InvalidConfig {
                message: "max_loops must be at least 1".to_string(),
            }
            .into());
        }

        let platform = comware::platform();
        Ok(SshConfig {
            host: self.host.clone(),
            port: self.options.port,
            username,
            auth: self.auth.clone(),
            timeout: Duration::from_secs(self.options.timeout),
            terminal_width: platform.terminal_width,
            terminal_height: platform.terminal_height,
            verify_host_key: self.options.verify_host_key,
            known_hosts_path: self.known_hosts_path.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_defaults_from_empty_json() {
        let options: DeviceOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, DeviceOptions::default());
        assert_eq!(options.file_system, "flash:");
        assert_eq!(options.max_loops, 500);
        assert!(options.auto_file_prompt);
    }

    #[test]
    fn test_options_partial_override() {
        let options: DeviceOptions =
            serde_json::from_str(r#"{"port": 2222, "auto_file_prompt": false}"#).unwrap();
        assert_eq!(options.port, 2222);
        assert!(!options.auto_file_prompt);
        assert_eq!(options.timeout, 60);
    }

    #[test]
    fn test_username_required() {
        let err = DriverBuilder::new("10.0.0.1").ssh_config().unwrap_err();
        assert!(err.to_string().contains("Username is required"));
    }

    #[test]
    fn test_ssh_config_from_options() {
        let config = DriverBuilder::new("10.0.0.1")
            .username("admin")
            .password("secret")
            .port(830)
            .timeout(Duration::from_secs(5))
            .verify_host_key(true)
            .ssh_config()
            .unwrap();

        assert_eq!(config.socket_addr(), "10.0.0.1:830");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.verify_host_key);
        assert_eq!(config.terminal_width, 511);
        assert!(matches!(config.auth, AuthMethod::Password(_)));
    }

    #[test]
    fn test_zero_max_loops_rejected() {
        let err = DriverBuilder::new("10.0.0.1")
            .username("admin")
            .max_loops(0)
            .ssh_config()
            .unwrap_err();
        assert!(err.to_string().contains("max_loops"));
    }
}

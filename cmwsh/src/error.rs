//! Error types for cmwsh.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Main error type for cmwsh operations.
#[derive(Error, Debug)]
pub enum Error {
    /// SSH/SFTP transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Channel operation errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Driver-level errors
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Unparseable or unexpected device output
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// Configuration lifecycle errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Transport layer errors (SSH connection, authentication, file transfer).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to connect to host
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// SSH key error
    #[error("SSH key error: {0}")]
    Key(String),

    /// Server host key was rejected by known_hosts verification
    #[error("Host key for {host}:{port} rejected: {reason}")]
    HostKeyRejected {
        host: String,
        port: u16,
        reason: String,
    },

    /// SFTP subsystem error
    #[error("SFTP error: {0}")]
    Sftp(String),

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Channel layer errors (pattern matching, PTY operations).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Failed to open PTY channel
    #[error("Failed to open PTY channel")]
    PtyOpenFailed,

    /// Failed to request shell
    #[error("Failed to request shell")]
    ShellRequestFailed,

    /// The expected pattern was not seen within the attempt budget
    #[error("Pattern '{pattern}' not found after {attempts} read attempts")]
    PatternTimeout { pattern: String, attempts: usize },

    /// Channel closed unexpectedly
    #[error("Channel closed")]
    Closed,

    /// SSH protocol error on the channel
    #[error("Channel SSH error: {0}")]
    Ssh(russh::Error),

    /// Invalid regex pattern
    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Driver layer errors (connection state, command execution).
#[derive(Error, Debug)]
pub enum DriverError {
    /// Driver not connected
    #[error("Driver not connected - call open() first")]
    NotConnected,

    /// Driver already connected
    #[error("Driver already connected")]
    AlreadyConnected,

    /// Command execution failed
    #[error("Command failed: {message}")]
    CommandFailed { message: String },

    /// Invalid configuration in the driver builder
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Device output that could not be parsed.
///
/// Every variant carries the raw text that triggered it so callers can log
/// exactly what the device sent.
#[derive(Error, Debug)]
pub enum FormatError {
    /// The boundary pattern matched nowhere in the output
    #[error("No sections matching '{pattern}' in output:\n{output}")]
    NoSections { pattern: String, output: String },

    /// Splitting produced fragments that do not pair into header/body
    #[error("Unpaired section fragments ({count}) in output:\n{output}")]
    UnpairedSections { count: usize, output: String },

    /// A mandatory field was not present in a section
    #[error("Missing mandatory field '{field}' in:\n{section}")]
    MissingField {
        field: &'static str,
        section: String,
    },

    /// A field matched but its value could not be converted
    #[error("Invalid value '{value}' for field '{field}'")]
    InvalidValue { field: &'static str, value: String },

    /// Output did not have the expected overall shape
    #[error("{message}:\n{output}")]
    Unexpected { message: String, output: String },
}

/// Configuration lifecycle errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Commit or compare requested with nothing staged
    #[error("No candidate configuration loaded")]
    NotLoaded,

    /// A candidate is already staged
    #[error("A candidate configuration is already loaded; commit or discard it first")]
    AlreadyStaged,

    /// Referenced local file is missing or unreadable
    #[error("Candidate file {} not found", path.display())]
    Validation { path: PathBuf },

    /// Remote file system cannot hold the candidate
    #[error("Not enough space on device: need {required} bytes, {available} available")]
    InsufficientSpace { required: u64, available: u64 },

    /// Candidate upload failed
    #[error("Could not transfer file: {message}")]
    Transfer { message: String },

    /// Applying a staged change failed
    #[error("Commit failed: {message}\nconfiguration output: {transcript}")]
    Commit { message: String, transcript: String },

    /// A device file operation (save, load, delete) reported failure
    #[error("{message}. Command output: {output}")]
    Command { message: String, output: String },
}

impl ConfigError {
    /// Captured device transcript, if this error carries one.
    pub fn transcript(&self) -> Option<&str> {
        match self {
            Self::Commit { transcript, .. } => Some(transcript),
            Self::Command { output, .. } => Some(output),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Transport(TransportError::Io(err))
    }
}

/// Result type alias using cmwsh's Error.
pub type Result<T> = std::result::Result<T, Error>;

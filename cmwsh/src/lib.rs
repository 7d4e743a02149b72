//! # cmwsh
//!
//! Async SSH configuration management for H3C Comware switches.
//!
//! cmwsh drives the Comware CLI over SSH and manages the configuration
//! lifecycle of a device: stage a candidate, compare it with the running
//! configuration, commit it behind an automatic snapshot, and roll back.
//! Read-only fact readers turn `display` output into typed records.
//!
//! ## Features
//!
//! - Async SSH sessions via russh, candidate upload via SFTP
//! - Merge candidates applied line by line in system view
//! - Replace candidates verified by MD5 and uploaded only when changed
//! - Snapshot before every commit, one-step rollback
//! - Facts, interfaces, counters, addresses, LLDP, ARP, MAC tables and ping
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cmwsh::DriverBuilder;
//! use cmwsh::config::CandidateSource;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), cmwsh::Error> {
//!     let mut device = DriverBuilder::new("192.168.1.1")
//!         .username("admin")
//!         .password("secret")
//!         .build()?;
//!
//!     device.open().await?;
//!
//!     let facts = device.get_facts().await?;
//!     println!("{} running {}", facts.hostname, facts.os_version);
//!
//!     device
//!         .load_replace_candidate(CandidateSource::File("sw1.cfg".into()))
//!         .await?;
//!     println!("{}", device.compare_config().await?);
//!     device.commit_config().await?;
//!
//!     device.close().await?;
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod config;
pub mod device;
pub mod driver;
pub mod error;
pub mod facts;
pub mod parse;
pub mod platform;
pub mod transport;

// Re-export main types for convenience
pub use config::{CandidateSource, ConfigManager};
pub use device::{ComwareDevice, ConfigRetrieve, DeviceConfig};
pub use driver::{CliSession, DeviceOptions, DriverBuilder, Response, SshSession};
pub use error::{Error, Result};
pub use platform::PlatformDefinition;
pub use transport::{AuthMethod, FileTransfer, SftpTransfer, SshConfig};

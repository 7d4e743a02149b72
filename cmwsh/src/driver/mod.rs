//! Interactive session driver.
//!
//! [`CliSession`] is the seam between the configuration and fact layers and
//! the device's interactive CLI. [`SshSession`] implements it over russh.

mod builder;
#[cfg(test)]
pub(crate) mod mock;
pub(crate) mod response;
mod session;

pub use builder::{DeviceOptions, DriverBuilder};
pub use response::Response;
pub use session::SshSession;

use std::future::Future;

use regex::bytes::Regex;

use crate::error::Result;

/// An interactive CLI session with one device.
///
/// Only one request/response exchange is in flight at a time; every
/// exchanging method takes `&mut self`, so sharing a session between tasks
/// needs an external mutex.
pub trait CliSession: Send {
    /// Open the session and settle at the first prompt.
    fn open(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Close the session.
    fn close(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Send a command and wait for any known prompt.
    fn send_command(&mut self, command: &str) -> impl Future<Output = Result<Response>> + Send;

    /// Send a command and wait for `expect` instead of the prompt.
    ///
    /// `max_loops` overrides the session's read attempt budget. When the
    /// budget runs out a [`ChannelError::PatternTimeout`](crate::error::ChannelError::PatternTimeout)
    /// is returned; the session never retries on its own.
    fn send_command_expect(
        &mut self,
        command: &str,
        expect: &Regex,
        max_loops: Option<usize>,
    ) -> impl Future<Output = Result<Response>> + Send;

    /// Write raw bytes without waiting for output.
    fn write_raw(&mut self, data: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Check if the session is open.
    fn is_open(&self) -> bool;

    /// Probe the connection by writing a NUL byte.
    ///
    /// Returns `false` when the session is closed or the write fails.
    fn is_alive(&mut self) -> impl Future<Output = bool> + Send;

    /// Whether the last prompt seen was a configuration view.
    fn in_config_mode(&self) -> bool;
}

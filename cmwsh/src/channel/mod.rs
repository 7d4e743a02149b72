//! Channel layer for pattern matching and PTY operations.
//!
//! This module handles the interactive shell: reading until a prompt or
//! confirmation pattern shows up, with ANSI stripping on the way in.

mod buffer;
pub mod patterns;
mod pty;

pub use buffer::PatternBuffer;
pub use pty::{PtyChannel, PtyConfig};

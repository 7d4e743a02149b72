//! Privilege level (CLI view) definition.

use regex::bytes::Regex;

/// A CLI view on the device.
///
/// Comware views form a short chain: user view at the root, system view
/// (and its sub-views) above it.
#[derive(Debug, Clone)]
pub struct PrivilegeLevel {
    /// Name of this level (e.g., "user_view", "system_view").
    pub name: String,

    /// Regex pattern to match the prompt for this level.
    pub pattern: Regex,

    /// Name of the parent level (None for root level).
    pub previous_priv: Option<String>,

    /// Command to enter this level from the parent.
    pub escalate_command: Option<String>,

    /// Command to leave this level back to the root view.
    pub deescalate_command: Option<String>,
}

impl PrivilegeLevel {
    /// Create a new privilege level with minimal required fields.
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            pattern: Regex::new(pattern)?,
            previous_priv: None,
            escalate_command: None,
            deescalate_command: None,
        })
    }

    /// Set the parent privilege level.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.previous_priv = Some(parent.into());
        self
    }

    /// Set the escalation command.
    pub fn with_escalate(mut self, command: impl Into<String>) -> Self {
        self.escalate_command = Some(command.into());
        self
    }

    /// Set the de-escalation command.
    pub fn with_deescalate(mut self, command: impl Into<String>) -> Self {
        self.deescalate_command = Some(command.into());
        self
    }

    /// Check if this privilege level matches a prompt.
    pub fn matches(&self, prompt: &str) -> bool {
        self.pattern.is_match(prompt.as_bytes())
    }
}

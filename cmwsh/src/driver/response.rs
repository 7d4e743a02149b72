//! Response type for command execution results.

use std::time::Duration;

/// Response from a command execution.
#[derive(Debug, Clone)]
pub struct Response {
    /// The command that was executed.
    pub command: String,

    /// The command output (normalized - command echo and trailing prompt removed).
    pub result: String,

    /// The output before normalization, line endings folded.
    ///
    /// Confirmation questions such as `[Y/N]` end up only here since they
    /// sit where the prompt normally is.
    pub raw_result: String,

    /// The prompt (or expect pattern match) seen at the end.
    pub prompt: String,

    /// Time taken to execute the command.
    pub elapsed: Duration,

    /// Failure message if the output matched a platform failure pattern.
    pub failure_message: Option<String>,
}

impl Response {
    /// Create a new successful response.
    pub fn new(
        command: impl Into<String>,
        result: impl Into<String>,
        raw_result: impl Into<String>,
        prompt: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            command: command.into(),
            result: result.into(),
            raw_result: raw_result.into(),
            prompt: prompt.into(),
            elapsed,
            failure_message: None,
        }
    }

    /// Mark the response as failed.
    pub fn with_failure(mut self, failure_message: impl Into<String>) -> Self {
        self.failure_message = Some(failure_message.into());
        self
    }

    /// Check if the response indicates success.
    pub fn is_success(&self) -> bool {
        self.failure_message.is_none()
    }

    /// Whether the device's reply mentions "error" in any letter case.
    ///
    /// Only the normalized output is searched; the echoed command and the
    /// prompt may legitimately contain the word.
    pub fn mentions_error(&self) -> bool {
        self.result.to_ascii_lowercase().contains("error")
    }

    /// Check if the raw output contains a substring.
    pub fn contains(&self, pattern: &str) -> bool {
        self.raw_result.contains(pattern)
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.result)
    }
}

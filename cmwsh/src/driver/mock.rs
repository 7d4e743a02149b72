//! Scripted session and transfer doubles for unit tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use std::time::Duration;

use regex::bytes::Regex;

use super::CliSession;
use super::response::Response;
use crate::channel::patterns::CONFIRM;
use crate::error::{ChannelError, Result, TransportError};
use crate::platform::{PlatformDefinition, comware};
use crate::transport::FileTransfer;

/// A session that answers commands from a script.
///
/// Each command has a queue of outputs; the last queued output keeps being
/// returned once the others are used up. Unscripted commands return "".
pub(crate) struct MockSession {
    platform: PlatformDefinition,
    scripts: HashMap<String, VecDeque<String>>,
    timeouts: HashSet<String>,
    pub sent: Vec<String>,
    pub raw_writes: Vec<Vec<u8>>,
    open: bool,
    config_mode: bool,
}

impl MockSession {
    pub fn new() -> Self {
        Self {
            platform: comware::platform(),
            scripts: HashMap::new(),
            timeouts: HashSet::new(),
            sent: Vec::new(),
            raw_writes: Vec::new(),
            open: true,
            config_mode: false,
        }
    }

    /// Queue an output for `command`.
    pub fn on(mut self, command: &str, output: &str) -> Self {
        self.scripts
            .entry(command.to_string())
            .or_default()
            .push_back(output.to_string());
        self
    }

    /// Make `command` exhaust its read budget.
    pub fn timeout_on(mut self, command: &str) -> Self {
        self.timeouts.insert(command.to_string());
        self
    }

    pub fn closed(mut self) -> Self {
        self.open = false;
        self
    }

    /// Whether `command` was sent at least once.
    pub fn saw(&self, command: &str) -> bool {
        self.sent.iter().any(|c| c == command)
    }

    fn reply(&mut self, command: &str) -> Result<Response> {
        self.sent.push(command.to_string());

        if self.timeouts.contains(command) {
            return Err(ChannelError::PatternTimeout {
                pattern: "mock".to_string(),
                attempts: 1,
            }
            .into());
        }

        match command {
            "system-view" => self.config_mode = true,
            "return" => self.config_mode = false,
            _ => {}
        }

        let output = match self.scripts.get_mut(command) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_default(),
            Some(queue) => queue.front().cloned().unwrap_or_default(),
            None => String::new(),
        };

        let prompt = if self.config_mode { "[sw1]" } else { "<sw1>" };
        let response = Response::new(
            command,
            output.clone(),
            raw_output(command, &output, prompt),
            prompt,
            Duration::ZERO,
        );
        Ok(match self.platform.detect_failure(&output) {
            Some(message) => response.with_failure(message),
            None => response,
        })
    }
}

/// The folded stream a real session would have read: the echoed command,
/// the output, then the prompt. Reads stop at a `[Y/N]` question, so no
/// prompt follows one.
fn raw_output(command: &str, output: &str, prompt: &str) -> String {
    let mut raw = format!("{command}\n");
    if !output.is_empty() {
        raw.push_str(output);
        raw.push('\n');
    }
    let asks = output
        .lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .is_some_and(|line| CONFIRM.is_match(line.as_bytes()));
    if asks {
        raw.truncate(raw.len() - 1);
    } else {
        raw.push_str(prompt);
    }
    raw
}

impl CliSession for MockSession {
    async fn open(&mut self) -> Result<()> {
        self.open = true;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.open = false;
        Ok(())
    }

    async fn send_command(&mut self, command: &str) -> Result<Response> {
        self.reply(command)
    }

    async fn send_command_expect(
        &mut self,
        command: &str,
        _expect: &Regex,
        _max_loops: Option<usize>,
    ) -> Result<Response> {
        self.reply(command)
    }

    async fn write_raw(&mut self, data: &[u8]) -> Result<()> {
        self.raw_writes.push(data.to_vec());
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    async fn is_alive(&mut self) -> bool {
        self.open && self.write_raw(&[0]).await.is_ok()
    }

    fn in_config_mode(&self) -> bool {
        self.config_mode
    }
}

/// A transfer double that records uploads and can be told to fail.
///
/// Uploads are recorded as `(remote_name, file content)` since staged
/// temporary files are gone by the time a test inspects them.
#[derive(Default)]
pub(crate) struct MockTransfer {
    pub puts: Vec<(String, String)>,
    pub fail: bool,
}

impl MockTransfer {
    pub fn failing() -> Self {
        Self {
            puts: Vec::new(),
            fail: true,
        }
    }
}

impl FileTransfer for MockTransfer {
    async fn put(&mut self, local_path: &Path, remote_name: &str) -> Result<()> {
        if self.fail {
            return Err(TransportError::Sftp("connection reset".to_string()).into());
        }
        let content = std::fs::read_to_string(local_path)?;
        self.puts.push((remote_name.to_string(), content));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_raw_result_has_echo_and_prompt() {
        let mut session = MockSession::new()
            .on("display clock", "09:12:40 UTC Thu 03/14/2024")
            .on("save force", "Continue? [Y/N]:");

        let response = session.send_command("display clock").await.unwrap();
        assert_eq!(response.result, "09:12:40 UTC Thu 03/14/2024");
        assert_eq!(
            response.raw_result,
            "display clock\n09:12:40 UTC Thu 03/14/2024\n<sw1>"
        );

        let response = session.send_command("system-view").await.unwrap();
        assert_eq!(response.raw_result, "system-view\n[sw1]");

        let response = session.send_command("save force").await.unwrap();
        assert_eq!(response.raw_result, "save force\nContinue? [Y/N]:");
    }
}

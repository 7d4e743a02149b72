//! Platform definition for vendor-specific CLI behavior.

use indexmap::IndexMap;
use memchr::memrchr;
use regex::bytes::Regex;

use super::privilege_level::PrivilegeLevel;

/// Platform definition containing the CLI conventions of one device family.
#[derive(Debug, Clone)]
pub struct PlatformDefinition {
    /// Platform name (e.g., "h3c_comware").
    pub name: String,

    /// Privilege levels (views) for this platform, root first.
    pub privilege_levels: IndexMap<String, PrivilegeLevel>,

    /// Name of the level that counts as configuration context.
    pub config_privilege: String,

    /// Substrings that mark a command as failed.
    pub failed_when_contains: Vec<String>,

    /// Commands to run when connection is established.
    pub on_open_commands: Vec<String>,

    /// Terminal width for PTY.
    pub terminal_width: u32,

    /// Terminal height for PTY.
    pub terminal_height: u32,
}

impl PlatformDefinition {
    /// Create a new platform definition with minimal required fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            privilege_levels: IndexMap::new(),
            config_privilege: String::new(),
            failed_when_contains: vec![],
            on_open_commands: vec![],
            terminal_width: 511,
            terminal_height: 24,
        }
    }

    /// Add a privilege level.
    pub fn with_privilege(mut self, level: PrivilegeLevel) -> Self {
        self.privilege_levels.insert(level.name.clone(), level);
        self
    }

    /// Set the configuration privilege level.
    pub fn with_config_privilege(mut self, name: impl Into<String>) -> Self {
        self.config_privilege = name.into();
        self
    }

    /// Add a failure pattern.
    pub fn with_failure_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.failed_when_contains.push(pattern.into());
        self
    }

    /// Add an on_open command.
    pub fn with_on_open_command(mut self, command: impl Into<String>) -> Self {
        self.on_open_commands.push(command.into());
        self
    }

    /// Set terminal dimensions.
    pub fn with_terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }

    /// Build one regex matching the prompt of any privilege level.
    pub fn prompt_pattern(&self) -> Result<Regex, regex::Error> {
        let combined = self
            .privilege_levels
            .values()
            .map(|level| format!("(?:{})", level.pattern.as_str()))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&combined)
    }

    /// Find the privilege level whose pattern matches `prompt`.
    pub fn determine_privilege(&self, prompt: &str) -> Option<&PrivilegeLevel> {
        self.privilege_levels
            .values()
            .find(|level| level.matches(prompt))
    }

    /// Return the first failure pattern present in `output`.
    pub fn detect_failure(&self, output: &str) -> Option<&str> {
        self.failed_when_contains
            .iter()
            .find(|pattern| output.contains(pattern.as_str()))
            .map(String::as_str)
    }

    /// Strip the command echo and trailing prompt from raw output.
    ///
    /// Line endings are folded to `\n`.
    pub fn normalize_output(&self, raw: &str, command: &str) -> String {
        let folded = raw.replace("\r\n", "\n").replace('\r', "");

        let output = folded.trim_start_matches('\n');
        let output = output
            .strip_prefix(command)
            .unwrap_or(output)
            .trim_start_matches('\n');

        match memrchr(b'\n', output.as_bytes()) {
            Some(pos) => output[..pos].to_string(),
            None if self.determine_privilege(output.trim()).is_some() => String::new(),
            None => output.to_string(),
        }
    }
}

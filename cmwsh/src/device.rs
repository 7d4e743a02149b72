//! The device facade tying a session, a file transfer and the
//! configuration lifecycle together.

use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::Serialize;

use crate::channel::patterns::{SYSTEM_VIEW, USER_VIEW, compile_expect_pattern};
use crate::config::{Candidate, CandidateSource, ConfigManager, IntegrityVerifier};
use crate::driver::{CliSession, DeviceOptions, Response};
use crate::error::{ChannelError, DriverError, Result};
use crate::facts::{
    self, ArpEntry, DeviceFacts, FactsOutput, Interface, InterfaceAddresses, InterfaceCounters,
    LldpNeighbor, MacEntry, PingOptions, PingResult,
};
use crate::transport::FileTransfer;

/// Which configurations [`ComwareDevice::get_config`] should fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigRetrieve {
    #[default]
    All,
    Running,
    Startup,
    Candidate,
}

impl ConfigRetrieve {
    fn includes(self, other: Self) -> bool {
        self == Self::All || self == other
    }
}

/// Configurations of a device. Parts not retrieved are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceConfig {
    pub running: String,
    /// The platform offers no way to read the startup file back; always empty.
    pub startup: String,
    /// Staged merge lines, if any.
    pub candidate: String,
}

/// An H3C Comware switch.
///
/// Owns one CLI session, the file transfer used for replace candidates,
/// and the configuration lifecycle state.
///
/// # Example
///
/// ```rust,no_run
/// use cmwsh::driver::DriverBuilder;
///
/// # async fn example() -> Result<(), cmwsh::Error> {
/// let mut device = DriverBuilder::new("10.0.0.1")
///     .username("admin")
///     .password("secret")
///     .build()?;
/// device.open().await?;
///
/// device.load_merge_candidate(["interface Vlan-interface10", " description users"])?;
/// println!("{}", device.compare_config().await?);
/// device.commit_config().await?;
///
/// device.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct ComwareDevice<S: CliSession, T: FileTransfer> {
    session: S,
    transfer: T,
    config: ConfigManager,
    options: DeviceOptions,
    file_prompt_changed: bool,
    file_prompt_checked: bool,
}

impl<S: CliSession, T: FileTransfer> ComwareDevice<S, T> {
    pub fn new(session: S, transfer: T, options: DeviceOptions) -> Self {
        let verifier = IntegrityVerifier::new(options.file_system.clone());
        Self {
            session,
            transfer,
            config: ConfigManager::new(verifier),
            options,
            file_prompt_changed: false,
            file_prompt_checked: false,
        }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn options(&self) -> &DeviceOptions {
        &self.options
    }

    pub fn config_manager(&self) -> &ConfigManager {
        &self.config
    }

    pub async fn open(&mut self) -> Result<()> {
        self.session.open().await
    }

    /// Restore the file prompt mode if it was changed, then close the
    /// session.
    ///
    /// The session is closed even when restoring fails.
    pub async fn close(&mut self) -> Result<()> {
        if self.file_prompt_changed && self.session.is_open() {
            match self.set_file_prompt("file prompt alert").await {
                Ok(()) => debug!("file prompt restored to alert"),
                Err(e) => warn!("failed to restore file prompt: {}", e),
            }
        }
        self.file_prompt_changed = false;
        self.file_prompt_checked = false;
        self.session.close().await
    }

    pub async fn is_alive(&mut self) -> bool {
        self.session.is_alive().await
    }

    /// Run each command and collect its output, in order.
    pub async fn cli<I, C>(&mut self, commands: I) -> Result<IndexMap<String, String>>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        let mut outputs = IndexMap::new();
        for command in commands {
            let command = command.as_ref();
            let response = self.session.send_command(command).await?;
            outputs.insert(command.to_string(), response.result);
        }
        Ok(outputs)
    }

    /// Run a command and wait for a caller-supplied pattern.
    pub async fn cli_expect(&mut self, command: &str, pattern: &str) -> Result<Response> {
        let pattern = compile_expect_pattern(pattern).map_err(ChannelError::InvalidPattern)?;
        self.session
            .send_command_expect(command, &pattern, Some(self.options.max_loops))
            .await
    }

    async fn output(&mut self, command: &str) -> Result<String> {
        Ok(self.session.send_command(command).await?.result)
    }

    pub async fn get_facts(&mut self) -> Result<DeviceFacts> {
        let version = self.output("display version").await?;
        let sysname = self
            .output("display current-configuration | include sysname")
            .await?;
        let interface_brief = self.output("display ip interface brief").await?;
        let manuinfo = self.output("display device manuinfo").await?;

        Ok(DeviceFacts::parse(FactsOutput {
            version: &version,
            sysname: &sysname,
            interface_brief: &interface_brief,
            manuinfo: &manuinfo,
        }))
    }

    pub async fn get_config(&mut self, retrieve: ConfigRetrieve) -> Result<DeviceConfig> {
        let mut config = DeviceConfig::default();

        if retrieve.includes(ConfigRetrieve::Running) {
            config.running = self.output("display current-configuration").await?;
        }
        if retrieve.includes(ConfigRetrieve::Candidate) {
            if let Some(Candidate::Merge { lines }) = self.config.state().candidate() {
                config.candidate = lines.join("\n");
            }
        }
        Ok(config)
    }

    pub async fn get_interfaces(&mut self) -> Result<IndexMap<String, Interface>> {
        let output = self.output("display interface").await?;
        Ok(facts::parse_interfaces(&output)?)
    }

    pub async fn get_interfaces_counters(&mut self) -> Result<IndexMap<String, InterfaceCounters>> {
        let output = self.output("display interface").await?;
        Ok(facts::parse_counters(&output)?)
    }

    pub async fn get_interfaces_ip(&mut self) -> Result<IndexMap<String, InterfaceAddresses>> {
        let ipv4 = self.output("display ip interface").await?;
        let ipv6 = self.output("display ipv6 interface").await?;
        Ok(facts::parse_addresses(&ipv4, &ipv6)?)
    }

    pub async fn get_lldp_neighbors(&mut self) -> Result<IndexMap<String, Vec<LldpNeighbor>>> {
        let output = self
            .output("display lldp neighbor-information list")
            .await?;
        Ok(facts::parse_lldp_neighbors(&output))
    }

    pub async fn get_arp_table(&mut self) -> Result<Vec<ArpEntry>> {
        let output = self.output("display arp").await?;
        Ok(facts::parse_arp_table(&output))
    }

    pub async fn get_mac_address_table(&mut self) -> Result<Vec<MacEntry>> {
        let output = self.output("display mac-address").await?;
        Ok(facts::parse_mac_address_table(&output)?)
    }

    pub async fn ping(&mut self, destination: &str, options: &PingOptions) -> Result<PingResult> {
        let output = self.output(&options.command(destination)).await?;
        Ok(facts::parse_ping(&output, destination)?)
    }

    /// Stage command lines for a merge commit.
    pub fn load_merge_candidate<I, L>(&mut self, lines: I) -> Result<()>
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        self.config.stage_merge(lines)
    }

    /// Stage a block of configuration text for a merge commit.
    pub fn load_merge_candidate_text(&mut self, text: &str) -> Result<()> {
        self.config.stage_merge_text(text)
    }

    /// Upload and stage a full replacement configuration.
    pub async fn load_replace_candidate(&mut self, source: CandidateSource) -> Result<()> {
        self.ensure_file_prompt_quiet().await?;
        self.config
            .stage_replace(&mut self.session, &mut self.transfer, source)
            .await
    }

    pub async fn compare_config(&mut self) -> Result<String> {
        self.config.compare(&mut self.session).await
    }

    pub async fn commit_config(&mut self) -> Result<()> {
        self.ensure_file_prompt_quiet().await?;
        self.config.commit(&mut self.session).await
    }

    pub async fn discard_config(&mut self) -> Result<()> {
        if self.config.state().candidate().is_some_and(Candidate::is_replace) {
            self.ensure_file_prompt_quiet().await?;
        }
        self.config.discard(&mut self.session).await
    }

    pub async fn rollback(&mut self) -> Result<()> {
        if self.config.has_rollback() {
            self.ensure_file_prompt_quiet().await?;
        }
        self.config.rollback(&mut self.session).await
    }

    /// Switch file operations to quiet mode once per session.
    ///
    /// Devices already configured with `file prompt quiet` are left alone
    /// and not restored on close.
    async fn ensure_file_prompt_quiet(&mut self) -> Result<()> {
        if !self.options.auto_file_prompt || self.file_prompt_checked {
            return Ok(());
        }

        let current = self
            .output("display current-configuration | include file prompt")
            .await?;
        if !current.contains("file prompt quiet") {
            self.set_file_prompt("file prompt quiet").await?;
            self.file_prompt_changed = true;
            info!("file prompt set to quiet for this session");
        }
        self.file_prompt_checked = true;
        Ok(())
    }

    async fn set_file_prompt(&mut self, command: &str) -> Result<()> {
        self.session
            .send_command_expect("system-view", &SYSTEM_VIEW, None)
            .await?;
        let response = self
            .session
            .send_command_expect(command, &SYSTEM_VIEW, None)
            .await;
        // leave system view whatever happened to the command itself
        self.session
            .send_command_expect("return", &USER_VIEW, None)
            .await?;

        let response = response?;
        if let Some(message) = response.failure_message {
            return Err(DriverError::CommandFailed { message }.into());
        }
        Ok(())
    }
}

impl<S: CliSession, T: FileTransfer> Drop for ComwareDevice<S, T> {
    fn drop(&mut self) {
        if self.file_prompt_changed {
            warn!("ComwareDevice dropped without close(); file prompt left in quiet mode");
        }
    }
}

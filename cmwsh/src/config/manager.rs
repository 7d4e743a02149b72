//! Candidate staging, commit and rollback against a live session.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::{debug, info, warn};

use super::integrity::IntegrityVerifier;
use super::state::{Candidate, ConfigSnapshot, ConfigState, Effect};
use crate::channel::patterns::{CONFIRM, CONFIRM_OR_VIEW, SYSTEM_VIEW, USER_VIEW};
use crate::driver::{CliSession, Response};
use crate::error::{ConfigError, Error, Result, TransportError};
use crate::transport::FileTransfer;

/// Remote name used for candidates staged from in-memory content.
pub const CONTENT_CANDIDATE_NAME: &str = "cmwsh_candidate.cfg";

/// Where a replace candidate comes from.
#[derive(Debug, Clone)]
pub enum CandidateSource {
    /// An existing local file, uploaded under its own file name.
    File(PathBuf),
    /// Full configuration text, written to a temporary file first.
    Content(String),
}

/// Lines of `candidate` not already present verbatim in `running`.
///
/// Empty lines and `!` comment lines are never part of the diff. Order is
/// preserved.
pub fn merge_diff(candidate: &[String], running: &str) -> Vec<String> {
    let running: Vec<&str> = running.lines().collect();
    candidate
        .iter()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| !line.trim_start().starts_with('!'))
        .filter(|line| !running.contains(&line.as_str()))
        .cloned()
        .collect()
}

/// Runs the configuration lifecycle for one device.
///
/// A single manager must not be driven from several tasks at once; the
/// `&mut self` receivers enforce that within safe code.
#[derive(Debug, Default)]
pub struct ConfigManager {
    state: ConfigState,
    verifier: IntegrityVerifier,
}

impl ConfigManager {
    pub fn new(verifier: IntegrityVerifier) -> Self {
        Self {
            state: ConfigState::default(),
            verifier,
        }
    }

    pub fn state(&self) -> &ConfigState {
        &self.state
    }

    pub fn verifier(&self) -> &IntegrityVerifier {
        &self.verifier
    }

    /// Whether a commit can currently be rolled back.
    pub fn has_rollback(&self) -> bool {
        self.state.rollback_snapshot().is_some()
    }

    fn transition(
        &mut self,
        step: impl FnOnce(ConfigState) -> std::result::Result<ConfigState, ConfigError>,
    ) -> Result<()> {
        self.state = step(self.state.clone())?;
        debug!("config state -> {:?}", self.state);
        Ok(())
    }

    /// Stage command lines to merge into the running configuration.
    pub fn stage_merge<I, L>(&mut self, lines: I) -> Result<()>
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        let lines = lines.into_iter().map(Into::into).collect();
        self.transition(|state| state.stage(Candidate::Merge { lines }))
    }

    /// Stage a block of configuration text, one command per line.
    pub fn stage_merge_text(&mut self, text: &str) -> Result<()> {
        self.stage_merge(text.lines())
    }

    /// Stage a full replacement configuration.
    ///
    /// The file is uploaded only when the device does not already hold an
    /// identical copy. On transfer failure any partial remote file is
    /// removed and the state stays idle.
    pub async fn stage_replace<S, T>(
        &mut self,
        session: &mut S,
        transfer: &mut T,
        source: CandidateSource,
    ) -> Result<()>
    where
        S: CliSession,
        T: FileTransfer,
    {
        self.state.ensure_idle()?;

        // the temporary file lives until staging is over
        let (_scratch, local_path, remote_name) = match source {
            CandidateSource::File(path) => {
                let remote_name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .ok_or_else(|| ConfigError::Validation { path: path.clone() })?;
                (None, path, remote_name)
            }
            CandidateSource::Content(content) => {
                let scratch = write_scratch(&content)?;
                let path = scratch.path().to_path_buf();
                (Some(scratch), path, CONTENT_CANDIDATE_NAME.to_string())
            }
        };

        let size = tokio::fs::metadata(&local_path)
            .await
            .ok()
            .filter(|meta| meta.is_file())
            .map(|meta| meta.len())
            .ok_or_else(|| ConfigError::Validation {
                path: local_path.clone(),
            })?;

        self.verifier.check_space(session, size).await?;

        let ticket = self
            .verifier
            .ticket(session, &local_path, &remote_name)
            .await?;

        if ticket.requires_transfer {
            self.upload(session, transfer, &local_path, &remote_name)
                .await?;
        } else {
            debug!("{} already on device, skipping transfer", remote_name);
        }

        self.transition(|state| {
            state.stage(Candidate::Replace {
                remote_name: ticket.remote_name,
                local_hash: ticket.local_hash,
            })
        })
    }

    async fn upload<S, T>(
        &self,
        session: &mut S,
        transfer: &mut T,
        local_path: &Path,
        remote_name: &str,
    ) -> Result<()>
    where
        S: CliSession,
        T: FileTransfer,
    {
        info!("uploading {} as {}", local_path.display(), remote_name);

        if let Err(e) = transfer.put(local_path, remote_name).await {
            if let Err(cleanup) = self.delete_file(session, remote_name).await {
                warn!("failed to remove partial {}: {}", remote_name, cleanup);
            }
            return Err(ConfigError::Transfer {
                message: format!("There was an error during transfer: {}", e),
            }
            .into());
        }

        if !self.verifier.file_exists(session, remote_name).await? {
            return Err(ConfigError::Transfer {
                message: format!("{} not found on device after upload", remote_name),
            }
            .into());
        }
        Ok(())
    }

    /// Difference between the candidate and the running configuration.
    ///
    /// Merge candidates are compared line by line here; replace candidates
    /// are diffed by the device. Nothing staged gives an empty string.
    pub async fn compare<S: CliSession>(&self, session: &mut S) -> Result<String> {
        match self.state.candidate() {
            None => Ok(String::new()),
            Some(Candidate::Merge { lines }) => {
                if lines.is_empty() {
                    return Ok(String::new());
                }
                let running = session
                    .send_command("display current-configuration")
                    .await?;
                Ok(merge_diff(lines, &running.result).join("\n"))
            }
            Some(Candidate::Replace { remote_name, .. }) => {
                let response = session
                    .send_command(&format!(
                        "display configuration changes running file {}",
                        self.verifier.remote_path(remote_name)
                    ))
                    .await?;
                Ok(response.result)
            }
        }
    }

    /// Apply the staged candidate.
    ///
    /// A snapshot of the running configuration is saved first; if that
    /// fails nothing is changed. Any failure while applying is reported as
    /// [`ConfigError::Commit`] with the device transcript, and the candidate
    /// stays staged.
    pub async fn commit<S: CliSession>(&mut self, session: &mut S) -> Result<()> {
        self.commit_at(session, Local::now()).await
    }

    pub(crate) async fn commit_at<S: CliSession>(
        &mut self,
        session: &mut S,
        now: DateTime<Local>,
    ) -> Result<()> {
        let candidate = self
            .state
            .candidate()
            .cloned()
            .ok_or(ConfigError::NotLoaded)?;

        let snapshot = ConfigSnapshot::at(now);
        if self.verifier.file_exists(session, &snapshot.filename).await? {
            self.delete_file(session, &snapshot.filename).await?;
        }
        self.save_config(session, Some(&snapshot.filename)).await?;
        debug!("saved snapshot {}", snapshot.filename);

        let mut transcript = String::new();
        let applied = match &candidate {
            Candidate::Replace { remote_name, .. } => {
                self.load_config(session, remote_name, &mut transcript)
                    .await
            }
            Candidate::Merge { lines } => apply_merge(session, lines, &mut transcript).await,
        };
        if let Err(e) = applied {
            warn!("commit failed, snapshot {} kept", snapshot.filename);
            return Err(into_commit_error(e, transcript));
        }

        info!("committed candidate, rollback source {}", snapshot.filename);
        self.transition(|state| state.committed(snapshot))?;

        self.save_config(session, None).await
    }

    /// Drop the staged candidate without touching the running
    /// configuration.
    pub async fn discard<S: CliSession>(&mut self, session: &mut S) -> Result<()> {
        let (state, effect) = self.state.clone().discarded();
        self.state = state;
        debug!("candidate discarded");

        if let Some(Effect::DeleteRemoteFile(name)) = effect {
            self.delete_file(session, &name).await?;
        }
        Ok(())
    }

    /// Restore the snapshot taken before the last successful commit.
    ///
    /// Does nothing when there is no such commit.
    pub async fn rollback<S: CliSession>(&mut self, session: &mut S) -> Result<()> {
        let Some(snapshot) = self.state.rollback_snapshot().cloned() else {
            debug!("nothing to roll back");
            return Ok(());
        };

        info!("rolling back to {}", snapshot.filename);
        let mut transcript = String::new();
        self.load_config(session, &snapshot.filename, &mut transcript)
            .await?;
        self.state = self.state.clone().rolled_back();

        self.save_config(session, None).await
    }

    async fn delete_file<S: CliSession>(&self, session: &mut S, name: &str) -> Result<()> {
        session
            .send_command(&format!(
                "delete /unreserved /quiet {}",
                self.verifier.remote_path(name)
            ))
            .await?;
        Ok(())
    }

    /// Save the running configuration to `name`, or to the startup file
    /// when `None`.
    async fn save_config<S: CliSession>(&self, session: &mut S, name: Option<&str>) -> Result<()> {
        let command = match name {
            Some(name) => format!("save {}", self.verifier.remote_path(name)),
            None => "save force".to_string(),
        };
        let mut transcript = String::new();
        let response = session
            .send_command_expect(&command, &CONFIRM_OR_VIEW, None)
            .await?;
        confirm(session, response, &mut transcript).await?;

        if !transcript.contains("successfully") {
            return Err(ConfigError::Command {
                message: "Failed to save config".to_string(),
                output: transcript,
            }
            .into());
        }
        Ok(())
    }

    /// Replace the running configuration with the device file `name`.
    async fn load_config<S: CliSession>(
        &self,
        session: &mut S,
        name: &str,
        transcript: &mut String,
    ) -> Result<()> {
        let command = format!(
            "rollback configuration to file {}",
            self.verifier.remote_path(name)
        );
        let response = session
            .send_command_expect(&command, &CONFIRM_OR_VIEW, None)
            .await?;
        confirm(session, response, transcript).await?;

        if !(transcript.contains("succeeded") || transcript.contains("finished")) {
            return Err(ConfigError::Command {
                message: "Failed to load config".to_string(),
                output: transcript.clone(),
            }
            .into());
        }
        Ok(())
    }
}

/// Questions answered per file operation before giving up on the dialog.
const MAX_CONFIRMATIONS: usize = 3;

/// Whether the last line of a response is a `[Y/N]` question.
fn asks_confirmation(response: &Response) -> bool {
    response
        .raw_result
        .lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .is_some_and(|line| CONFIRM.is_match(line.as_bytes()))
}

/// Record `response` and answer `y` to each question that follows, such as
/// the overwrite prompt of `save` or the clear-information prompt of a
/// configuration rollback.
async fn confirm<S: CliSession>(
    session: &mut S,
    mut response: Response,
    transcript: &mut String,
) -> Result<()> {
    transcript.push_str(&response.raw_result);
    for _ in 0..MAX_CONFIRMATIONS {
        if !asks_confirmation(&response) {
            break;
        }
        response = session
            .send_command_expect("y", &CONFIRM_OR_VIEW, None)
            .await?;
        transcript.push_str(&response.raw_result);
    }
    Ok(())
}

/// Enter system view and apply `lines` one at a time.
///
/// Stops at the first line the device complains about, or that could not be
/// sent, leaves system view discarding anything uncommitted, and fails.
async fn apply_merge<S: CliSession>(
    session: &mut S,
    lines: &[String],
    transcript: &mut String,
) -> Result<()> {
    let enter = session
        .send_command_expect("system-view", &SYSTEM_VIEW, None)
        .await?;
    transcript.push_str(&enter.raw_result);

    if !session.in_config_mode() {
        return Err(ConfigError::Commit {
            message: "Not in configuration mode".to_string(),
            transcript: transcript.clone(),
        }
        .into());
    }

    for line in lines.iter().filter(|line| !line.trim().is_empty()) {
        let response = match session.send_command_expect(line, &SYSTEM_VIEW, None).await {
            Ok(response) => response,
            Err(e) => {
                if let Err(cleanup) = leave_uncommitted(session, transcript).await {
                    warn!("failed to leave system view after {:?}: {}", line, cleanup);
                }
                return Err(e);
            }
        };
        transcript.push_str(&response.raw_result);

        if response.mentions_error() || !response.is_success() {
            leave_uncommitted(session, transcript).await?;
            return Err(ConfigError::Commit {
                message: format!("Error while applying config line {:?}", line),
                transcript: transcript.clone(),
            }
            .into());
        }
    }

    let commit = session
        .send_command_expect("commit", &SYSTEM_VIEW, None)
        .await?;
    transcript.push_str(&commit.raw_result);

    let leave = session
        .send_command_expect("return", &USER_VIEW, None)
        .await?;
    transcript.push_str(&leave.raw_result);
    Ok(())
}

/// Leave system view, declining to commit anything applied so far.
async fn leave_uncommitted<S: CliSession>(session: &mut S, transcript: &mut String) -> Result<()> {
    let leave = session
        .send_command_expect("return", &CONFIRM_OR_VIEW, None)
        .await?;
    transcript.push_str(&leave.raw_result);

    if leave.contains("Uncommitted configurations") {
        let discard = session.send_command_expect("n", &USER_VIEW, None).await?;
        transcript.push_str(&discard.raw_result);
    }
    Ok(())
}

fn into_commit_error(error: Error, transcript: String) -> Error {
    match error {
        Error::Config(ConfigError::Commit { .. }) => error,
        Error::Config(ConfigError::Command { message, output }) => ConfigError::Commit {
            message,
            transcript: output,
        }
        .into(),
        other => ConfigError::Commit {
            message: other.to_string(),
            transcript,
        }
        .into(),
    }
}

fn write_scratch(content: &str) -> Result<tempfile::NamedTempFile> {
    use std::io::Write;

    let mut scratch = tempfile::Builder::new()
        .prefix("cmw-candidate-")
        .suffix(".cfg")
        .tempfile()
        .map_err(TransportError::Io)?;
    scratch
        .write_all(content.as_bytes())
        .map_err(TransportError::Io)?;
    scratch.flush().map_err(TransportError::Io)?;
    Ok(scratch)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use chrono::TimeZone;

    use super::*;
    use crate::driver::mock::{MockSession, MockTransfer};

    const DIR_FLASH: &str = "524288 KB total (364920 KB free)";
    const SNAPSHOT: &str = "flash:/config_20240314_0912.cfg";
    const SAVE_QUESTION: &str =
        "The current configuration will be saved to flash:/config_20240314_0912.cfg. Continue? [Y/N]:";
    const SAVED: &str = "Validating file. Please wait...\nSaved the current configuration to mainboard device successfully.";
    const RUNNING: &str = "\
#
 sysname sw1
#
interface Vlan10
 ip address 10.0.0.1 255.255.255.0
#
return";

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 14, 9, 12, 40).unwrap()
    }

    fn error_of(result: Result<()>) -> ConfigError {
        match result {
            Err(Error::Config(e)) => e,
            other => panic!("expected config error, got {:?}", other),
        }
    }

    /// A session that can take a snapshot and save the startup config.
    fn saving_session() -> MockSession {
        MockSession::new()
            .on(&format!("dir {SNAPSHOT}"), "No file found.")
            .on(&format!("save {SNAPSHOT}"), SAVE_QUESTION)
            .on("save force", SAVED)
    }

    #[test]
    fn test_merge_diff_vlan_scenario() {
        let lines = vec!["interface Vlan10".to_string(), "description test".to_string()];
        assert_eq!(merge_diff(&lines, RUNNING), vec!["description test".to_string()]);
    }

    #[test]
    fn test_merge_diff_skips_comments_and_blanks() {
        let lines = vec![
            "! access vlan".to_string(),
            String::new(),
            "  !indented comment".to_string(),
            "vlan 20".to_string(),
        ];
        assert_eq!(merge_diff(&lines, RUNNING), vec!["vlan 20".to_string()]);
    }

    #[tokio::test]
    async fn test_compare_vlan_scenario() {
        let mut manager = ConfigManager::default();
        let mut session = MockSession::new().on("display current-configuration", RUNNING);

        manager
            .stage_merge(["interface Vlan10", "description test"])
            .unwrap();
        assert_eq!(manager.compare(&mut session).await.unwrap(), "description test");
    }

    #[tokio::test]
    async fn test_compare_empty_and_unstaged() {
        let mut manager = ConfigManager::default();
        let mut session = MockSession::new();

        assert_eq!(manager.compare(&mut session).await.unwrap(), "");

        manager.stage_merge(Vec::<String>::new()).unwrap();
        assert_eq!(manager.compare(&mut session).await.unwrap(), "");
        assert!(session.sent.is_empty());
    }

    #[tokio::test]
    async fn test_discard_after_compare_empties_buffer() {
        let mut manager = ConfigManager::default();
        let mut session = MockSession::new().on("display current-configuration", RUNNING);

        manager.stage_merge_text("vlan 30\n name users\n").unwrap();
        assert!(!manager.compare(&mut session).await.unwrap().is_empty());

        manager.discard(&mut session).await.unwrap();
        assert!(!manager.state().is_staged());
        assert_eq!(manager.compare(&mut session).await.unwrap(), "");
        assert!(!session.sent.iter().any(|c| c.starts_with("delete")));
    }

    #[test]
    fn test_second_stage_rejected() {
        let mut manager = ConfigManager::default();
        manager.stage_merge(["vlan 10"]).unwrap();
        let err = error_of(manager.stage_merge(["vlan 20"]));
        assert!(matches!(err, ConfigError::AlreadyStaged));
        assert_eq!(
            manager.state().candidate(),
            Some(&Candidate::Merge {
                lines: vec!["vlan 10".to_string()]
            })
        );
    }

    #[tokio::test]
    async fn test_commit_without_candidate() {
        let mut manager = ConfigManager::default();
        let mut session = MockSession::new();
        let err = error_of(manager.commit(&mut session).await);
        assert!(matches!(err, ConfigError::NotLoaded));
        assert!(session.sent.is_empty());
    }

    #[tokio::test]
    async fn test_commit_merge_success() {
        let mut manager = ConfigManager::default();
        let mut session = saving_session().on("y", SAVED);

        manager.stage_merge(["vlan 10", "", " name users"]).unwrap();
        manager.commit_at(&mut session, now()).await.unwrap();

        assert!(!manager.state().is_staged());
        assert!(manager.has_rollback());
        assert_eq!(
            session.sent,
            vec![
                format!("dir {SNAPSHOT}"),
                format!("save {SNAPSHOT}"),
                "y".to_string(),
                "system-view".to_string(),
                "vlan 10".to_string(),
                " name users".to_string(),
                "commit".to_string(),
                "return".to_string(),
                "save force".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_commit_replaces_existing_snapshot() {
        let mut manager = ConfigManager::default();
        let mut session = MockSession::new()
            .on(&format!("dir {SNAPSHOT}"), "   3 -rw-  2316 Mar 14 2024 09:12:00   config_20240314_0912.cfg")
            .on(&format!("save {SNAPSHOT}"), SAVE_QUESTION)
            .on("y", SAVED)
            .on("save force", SAVED);

        manager.stage_merge(["vlan 10"]).unwrap();
        manager.commit_at(&mut session, now()).await.unwrap();
        assert!(session.saw(&format!("delete /unreserved /quiet {SNAPSHOT}")));
    }

    #[tokio::test]
    async fn test_commit_merge_error_aborts() {
        let mut manager = ConfigManager::default();
        let mut session = saving_session()
            .on("y", SAVED)
            .on("ip address 10.0.0.1 33", "Error: Invalid mask length.")
            .on(
                "return",
                "Uncommitted configurations found. Commit them before exiting? [Y/N]:",
            );

        manager
            .stage_merge(["interface Vlan10", "ip address 10.0.0.1 33", "description never sent"])
            .unwrap();
        let err = error_of(manager.commit_at(&mut session, now()).await);

        match &err {
            ConfigError::Commit { transcript, .. } => {
                assert!(transcript.contains("Invalid mask"));
                assert!(transcript.contains("Uncommitted configurations"));
            }
            other => panic!("expected commit error, got {:?}", other),
        }
        assert!(session.saw(&format!("save {SNAPSHOT}")));
        assert!(session.saw("n"));
        assert!(!session.saw("commit"));
        assert!(!session.saw("description never sent"));
        assert!(!session.saw("save force"));

        // candidate kept for a retry, nothing to roll back
        assert!(manager.state().is_staged());
        assert!(!manager.has_rollback());
    }

    #[tokio::test]
    async fn test_commit_merge_platform_failure_aborts() {
        let mut manager = ConfigManager::default();
        let mut session = saving_session()
            .on("y", SAVED)
            .on("vlan 5000", " ^\n% Wrong parameter found at '^' position.")
            .on("return", "");

        manager.stage_merge(["vlan 5000"]).unwrap();
        let err = error_of(manager.commit_at(&mut session, now()).await);
        assert!(matches!(err, ConfigError::Commit { .. }));
        assert!(!session.saw("n"));
        assert!(!session.saw("commit"));
    }

    #[tokio::test]
    async fn test_commit_merge_line_naming_errors_succeeds() {
        let mut manager = ConfigManager::default();
        let mut session = saving_session().on("y", SAVED);

        manager
            .stage_merge([
                "interface Vlan-interface10",
                " description uplink-error-counters",
                "info-center source default logbuffer level error",
            ])
            .unwrap();
        manager.commit_at(&mut session, now()).await.unwrap();

        assert!(session.saw("commit"));
        assert!(session.saw("save force"));
        assert!(!manager.state().is_staged());
    }

    #[tokio::test]
    async fn test_commit_merge_timeout_leaves_system_view() {
        let mut manager = ConfigManager::default();
        let mut session = saving_session()
            .on("y", SAVED)
            .timeout_on(" name users")
            .on(
                "return",
                "Uncommitted configurations found. Commit them before exiting? [Y/N]:",
            );

        manager.stage_merge(["vlan 10", " name users", "vlan 20"]).unwrap();
        let err = error_of(manager.commit_at(&mut session, now()).await);

        match err {
            ConfigError::Commit { transcript, .. } => {
                assert!(transcript.contains("Uncommitted configurations"))
            }
            other => panic!("expected commit error, got {:?}", other),
        }
        assert_eq!(
            &session.sent[session.sent.len() - 3..],
            [" name users", "return", "n"]
        );
        assert!(!session.in_config_mode());
        assert!(!session.saw("vlan 20"));
        assert!(!session.saw("commit"));
        assert!(manager.state().is_staged());
    }

    #[tokio::test]
    async fn test_snapshot_failure_aborts_before_apply() {
        let mut manager = ConfigManager::default();
        let mut session = saving_session().on("y", "The file system is full.");

        manager.stage_merge(["vlan 10"]).unwrap();
        let err = error_of(manager.commit_at(&mut session, now()).await);
        assert!(matches!(err, ConfigError::Command { .. }));
        assert!(!session.saw("system-view"));
        assert!(manager.state().is_staged());
    }

    #[tokio::test]
    async fn test_unprompted_save_sends_no_answer() {
        let mut manager = ConfigManager::default();
        let mut session = MockSession::new()
            .on(&format!("dir {SNAPSHOT}"), "No file found.")
            .on(&format!("save {SNAPSHOT}"), SAVED)
            .on("save force", SAVED);

        manager.stage_merge(["vlan 10"]).unwrap();
        manager.commit_at(&mut session, now()).await.unwrap();
        assert!(!session.saw("y"));
    }

    #[tokio::test]
    async fn test_stage_replace_from_content() {
        let mut manager = ConfigManager::default();
        let mut transfer = MockTransfer::default();
        let mut session = MockSession::new()
            .on("dir flash:", DIR_FLASH)
            .on("dir flash:/cmwsh_candidate.cfg", "No file found.")
            .on(
                "dir flash:/cmwsh_candidate.cfg",
                "   4 -rw-  24 Mar 14 2024 09:13:00   cmwsh_candidate.cfg",
            );

        manager
            .stage_replace(
                &mut session,
                &mut transfer,
                CandidateSource::Content("sysname sw1\nvlan 10\n".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(
            transfer.puts,
            vec![(
                "cmwsh_candidate.cfg".to_string(),
                "sysname sw1\nvlan 10\n".to_string()
            )]
        );
        assert!(matches!(
            manager.state().candidate(),
            Some(Candidate::Replace { remote_name, .. }) if remote_name == "cmwsh_candidate.cfg"
        ));
    }

    #[tokio::test]
    async fn test_stage_replace_skips_identical_upload() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"sysname sw1\n").unwrap();
        let name = file.path().file_name().unwrap().to_string_lossy().into_owned();
        let hash = manager_md5(file.path()).await;

        let mut manager = ConfigManager::default();
        let mut transfer = MockTransfer::default();
        let mut session = MockSession::new()
            .on("dir flash:", DIR_FLASH)
            .on(&format!("dir flash:/{name}"), &format!("   4 -rw-  12 Mar 14 2024   {name}"))
            .on(
                &format!("display system file-md5 flash:/{name}"),
                &format!("MD5 digest:\nflash:/{name}  {hash}"),
            );

        manager
            .stage_replace(
                &mut session,
                &mut transfer,
                CandidateSource::File(file.path().to_path_buf()),
            )
            .await
            .unwrap();

        assert!(transfer.puts.is_empty());
        assert!(manager.state().is_staged());
    }

    async fn manager_md5(path: &Path) -> String {
        IntegrityVerifier::default().local_md5(path).await.unwrap()
    }

    #[tokio::test]
    async fn test_stage_replace_missing_file() {
        let mut manager = ConfigManager::default();
        let mut session = MockSession::new();
        let err = error_of(
            manager
                .stage_replace(
                    &mut session,
                    &mut MockTransfer::default(),
                    CandidateSource::File(PathBuf::from("/nonexistent/new.cfg")),
                )
                .await,
        );
        assert!(matches!(err, ConfigError::Validation { .. }));
        assert!(session.sent.is_empty());
    }

    #[tokio::test]
    async fn test_stage_replace_insufficient_space() {
        let mut manager = ConfigManager::default();
        let mut transfer = MockTransfer::default();
        let mut session = MockSession::new().on("dir flash:", "524288 KB total (0 KB free)");

        let err = error_of(
            manager
                .stage_replace(
                    &mut session,
                    &mut transfer,
                    CandidateSource::Content("sysname sw1\n".to_string()),
                )
                .await,
        );
        assert!(matches!(err, ConfigError::InsufficientSpace { available: 0, .. }));
        assert!(transfer.puts.is_empty());
        assert!(!manager.state().is_staged());
    }

    #[tokio::test]
    async fn test_stage_replace_transfer_failure_cleans_up() {
        let mut manager = ConfigManager::default();
        let mut transfer = MockTransfer::failing();
        let mut session = MockSession::new()
            .on("dir flash:", DIR_FLASH)
            .on("dir flash:/cmwsh_candidate.cfg", "No file found.");

        let err = error_of(
            manager
                .stage_replace(
                    &mut session,
                    &mut transfer,
                    CandidateSource::Content("sysname sw1\n".to_string()),
                )
                .await,
        );
        assert!(matches!(err, ConfigError::Transfer { .. }));
        assert!(session.saw("delete /unreserved /quiet flash:/cmwsh_candidate.cfg"));
        assert!(!manager.state().is_staged());
    }

    #[tokio::test]
    async fn test_replace_compare_discard() {
        let mut manager = ConfigManager::default();
        manager.state = ConfigState::default()
            .stage(Candidate::Replace {
                remote_name: "new.cfg".to_string(),
                local_hash: "00".to_string(),
            })
            .unwrap();
        let mut session = MockSession::new().on(
            "display configuration changes running file flash:/new.cfg",
            "--- Current configuration\n+++ flash:/new.cfg\n+vlan 30",
        );

        let diff = manager.compare(&mut session).await.unwrap();
        assert!(diff.contains("+vlan 30"));

        manager.discard(&mut session).await.unwrap();
        assert!(session.saw("delete /unreserved /quiet flash:/new.cfg"));
        assert!(!manager.state().is_staged());
    }

    #[tokio::test]
    async fn test_commit_replace_then_rollback() {
        let mut manager = ConfigManager::default();
        manager.state = ConfigState::default()
            .stage(Candidate::Replace {
                remote_name: "new.cfg".to_string(),
                local_hash: "00".to_string(),
            })
            .unwrap();
        let mut session = saving_session()
            .on("rollback configuration to file flash:/new.cfg", "Continue? [Y/N]:")
            .on(&format!("rollback configuration to file {SNAPSHOT}"), "Continue? [Y/N]:")
            .on("y", SAVED)
            .on("y", "Rollback configuration. Please wait...\nClear the information? [Y/N]:")
            .on("y", "Rollback finished!");

        manager.commit_at(&mut session, now()).await.unwrap();
        assert!(session.saw("rollback configuration to file flash:/new.cfg"));
        assert!(manager.has_rollback());

        manager.rollback(&mut session).await.unwrap();
        assert!(session.saw(&format!("rollback configuration to file {SNAPSHOT}")));
        assert!(!manager.has_rollback());
        assert_eq!(session.sent.iter().filter(|c| *c == "save force").count(), 2);
    }

    #[tokio::test]
    async fn test_rollback_without_commit_is_noop() {
        let mut manager = ConfigManager::default();
        let mut session = MockSession::new();
        manager.rollback(&mut session).await.unwrap();
        assert!(session.sent.is_empty());
    }

    #[tokio::test]
    async fn test_failed_load_is_commit_error() {
        let mut manager = ConfigManager::default();
        manager.state = ConfigState::default()
            .stage(Candidate::Replace {
                remote_name: "new.cfg".to_string(),
                local_hash: "00".to_string(),
            })
            .unwrap();
        let mut session = saving_session()
            .on("rollback configuration to file flash:/new.cfg", "Continue? [Y/N]:")
            .on("y", SAVED)
            .on("y", "Rollback failed: file is not a configuration file.");

        let err = error_of(manager.commit_at(&mut session, now()).await);
        match err {
            ConfigError::Commit { transcript, .. } => assert!(transcript.contains("Rollback failed")),
            other => panic!("expected commit error, got {:?}", other),
        }
        assert!(manager.state().is_staged());
    }
}

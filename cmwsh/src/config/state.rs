//! Candidate lifecycle state and its pure transitions.
//!
//! Transitions never talk to the device. Each returns the next state plus
//! the side effects the caller has to perform, which keeps the sequencing
//! rules testable without a session.
//!
//! ```text
//! Idle ──stage──► Staged ──commit ok──► Idle { rollback: Some(snapshot) }
//!   ▲               │
//!   └───discard─────┘   (commit failure keeps Staged)
//! ```

use chrono::{DateTime, Local};

use crate::error::ConfigError;

/// A staged change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// Individual commands applied on top of the running configuration.
    Merge { lines: Vec<String> },

    /// A full configuration file already on the device.
    Replace {
        remote_name: String,
        local_hash: String,
    },
}

impl Candidate {
    pub fn is_replace(&self) -> bool {
        matches!(self, Self::Replace { .. })
    }
}

/// A saved copy of the running configuration taken right before a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSnapshot {
    pub filename: String,
    pub created_at: DateTime<Local>,
}

impl ConfigSnapshot {
    /// Snapshot named after `now`, e.g. `config_20240314_0912.cfg`.
    pub fn at(now: DateTime<Local>) -> Self {
        Self {
            filename: format!("config_{}.cfg", now.format("%Y%m%d_%H%M")),
            created_at: now,
        }
    }
}

/// Work a transition asks the caller to do on the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    DeleteRemoteFile(String),
}

/// Lifecycle state of one device's configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigState {
    Idle {
        /// Set once a commit succeeded; cleared by a rollback.
        rollback: Option<ConfigSnapshot>,
    },
    Staged {
        candidate: Candidate,
        rollback: Option<ConfigSnapshot>,
    },
}

impl Default for ConfigState {
    fn default() -> Self {
        Self::Idle { rollback: None }
    }
}

impl ConfigState {
    pub fn candidate(&self) -> Option<&Candidate> {
        match self {
            Self::Staged { candidate, .. } => Some(candidate),
            Self::Idle { .. } => None,
        }
    }

    pub fn is_staged(&self) -> bool {
        matches!(self, Self::Staged { .. })
    }

    /// Snapshot a rollback would restore.
    pub fn rollback_snapshot(&self) -> Option<&ConfigSnapshot> {
        match self {
            Self::Idle { rollback } | Self::Staged { rollback, .. } => rollback.as_ref(),
        }
    }

    /// Check that a new candidate may be staged.
    pub fn ensure_idle(&self) -> Result<(), ConfigError> {
        match self {
            Self::Idle { .. } => Ok(()),
            Self::Staged { .. } => Err(ConfigError::AlreadyStaged),
        }
    }

    /// Idle → Staged.
    pub fn stage(self, candidate: Candidate) -> Result<Self, ConfigError> {
        match self {
            Self::Idle { rollback } => Ok(Self::Staged {
                candidate,
                rollback,
            }),
            Self::Staged { .. } => Err(ConfigError::AlreadyStaged),
        }
    }

    /// Staged → Idle after a successful commit; `snapshot` becomes the
    /// rollback source.
    pub fn committed(self, snapshot: ConfigSnapshot) -> Result<Self, ConfigError> {
        match self {
            Self::Staged { .. } => Ok(Self::Idle {
                rollback: Some(snapshot),
            }),
            Self::Idle { .. } => Err(ConfigError::NotLoaded),
        }
    }

    /// Drop the candidate. A staged replace file has to be removed from
    /// the device.
    pub fn discarded(self) -> (Self, Option<Effect>) {
        match self {
            Self::Staged {
                candidate,
                rollback,
            } => {
                let effect = match candidate {
                    Candidate::Replace { remote_name, .. } => {
                        Some(Effect::DeleteRemoteFile(remote_name))
                    }
                    Candidate::Merge { .. } => None,
                };
                (Self::Idle { rollback }, effect)
            }
            idle @ Self::Idle { .. } => (idle, None),
        }
    }

    /// Forget the rollback source once it has been reapplied.
    pub fn rolled_back(self) -> Self {
        match self {
            Self::Idle { .. } => Self::Idle { rollback: None },
            Self::Staged { candidate, .. } => Self::Staged {
                candidate,
                rollback: None,
            },
        }
    }
}

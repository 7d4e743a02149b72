//! Configuration lifecycle: stage, verify, transfer, commit, roll back.
//!
//! [`ConfigManager`] drives the device through a [`CliSession`](crate::driver::CliSession);
//! the state it tracks lives in [`ConfigState`], whose transitions are pure.

mod integrity;
mod manager;
mod state;

pub use integrity::{IntegrityVerifier, TransferTicket, parse_free_space, parse_remote_md5};
pub use manager::{CONTENT_CANDIDATE_NAME, CandidateSource, ConfigManager, merge_diff};
pub use state::{Candidate, ConfigSnapshot, ConfigState, Effect};

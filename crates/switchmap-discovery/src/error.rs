//! Discovery error types

use thiserror::Error;

use switchmap_core::FailureKind;
use switchmap_ssh::SshError;

/// Unrecoverable failure of one discovery strategy invocation
///
/// Garbled CLI output never lands here; the strategies degrade to a
/// shorter neighbor list instead. Only session-level problems make
/// the whole `discover()` call fail.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Session unreachable, authentication rejected mid-session, or
    /// the shell channel dropped
    #[error("transport failure: {0}")]
    Transport(#[from] SshError),
}

impl DiscoveryError {
    /// How the crawl engine records this failure
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            DiscoveryError::Transport(_) => FailureKind::Transport,
        }
    }
}

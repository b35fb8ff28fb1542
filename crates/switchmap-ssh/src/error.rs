//! Error types for the SSH transport layer

use thiserror::Error;

/// Errors raised while driving a switch management shell
#[derive(Debug, Error)]
pub enum SshError {
    #[error("cannot resolve {0} to a socket address")]
    Resolve(String),

    #[error("tcp connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("ssh handshake failed: {0}")]
    Handshake(#[source] ssh2::Error),

    #[error("authentication rejected for user {user}")]
    AuthRejected { user: String },

    #[error("shell channel error: {0}")]
    Channel(#[source] ssh2::Error),

    #[error("shell read failed: {0}")]
    Read(#[source] std::io::Error),

    #[error("shell write failed: {0}")]
    Write(#[source] std::io::Error),

    #[error("session worker task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Errors loading the credential file at crawl bootstrap
#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("failed to read credential file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse credential file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

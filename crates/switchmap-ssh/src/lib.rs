//! SwitchMap SSH - Management-shell transport for switch CLIs
//!
//! Managed switches expose their introspection commands through an
//! interactive SSH shell rather than exec channels, so this crate
//! drives a blocking ssh2 session from async code via spawn_blocking
//! and reads shell output until the channel goes quiet.

pub mod credentials;
pub mod error;
pub mod session;

pub use credentials::{CredentialSource, FileCredentials, VendorCandidate};
pub use error::{CredentialsError, SshError};
pub use session::{ShellSession, SshSettings};

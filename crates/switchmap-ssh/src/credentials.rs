//! Credential lookup for switch management logins
//!
//! The crawl engine never reads credential storage itself; it goes
//! through the `CredentialSource` contract. The file-backed
//! implementation mirrors the operator-maintained credential document:
//! one entry per vendor with a default login and optional alternates.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use switchmap_core::{Address, Credentials, VendorTag};

use crate::error::CredentialsError;
use crate::session::SshSettings;

/// Logins to try for one vendor, in probe order
#[derive(Debug, Clone)]
pub struct VendorCandidate {
    pub vendor: VendorTag,
    pub credentials: Vec<Credentials>,
}

/// Resolves login candidates for an address
///
/// Lookup interface only; storage, rotation, and access policy live
/// with the implementor.
pub trait CredentialSource: Send + Sync {
    /// All vendor/login combinations worth probing for this address
    fn candidates(&self, address: &Address) -> Vec<VendorCandidate>;

    /// First usable credential pair for this address, if any
    fn resolve(&self, address: &Address) -> Option<Credentials> {
        self.candidates(address)
            .into_iter()
            .flat_map(|c| c.credentials)
            .next()
    }
}

// No Debug derive: entries hold passwords
#[derive(Clone, Deserialize)]
struct VendorEntry {
    username: String,
    password: String,
    #[serde(default)]
    alternatives: Vec<Credentials>,
}

/// Credential source backed by a TOML document
///
/// ```toml
/// [ssh]
/// port = 22
///
/// [vendors.hirschmann]
/// username = "admin"
/// password = "private"
///
/// [[vendors.hirschmann.alternatives]]
/// username = "admin"
/// password = "public"
/// ```
#[derive(Clone, Deserialize)]
pub struct FileCredentials {
    #[serde(default)]
    ssh: SshSettings,
    #[serde(default)]
    vendors: BTreeMap<String, VendorEntry>,
}

impl FileCredentials {
    /// Load and parse the credential document
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CredentialsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CredentialsError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let parsed: Self = toml::from_str(&text).map_err(|source| CredentialsError::Parse {
            path: path.display().to_string(),
            source,
        })?;

        info!(
            path = %path.display(),
            vendors = parsed.vendors.len(),
            "Credential file loaded"
        );
        Ok(parsed)
    }

    /// Parse from an in-memory TOML string
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Transport settings bundled with the credential document
    pub fn ssh_settings(&self) -> &SshSettings {
        &self.ssh
    }
}

impl CredentialSource for FileCredentials {
    // The document is keyed by vendor, not by address: every address
    // gets the same candidate list
    fn candidates(&self, _address: &Address) -> Vec<VendorCandidate> {
        self.vendors
            .iter()
            .map(|(vendor, entry)| {
                let mut credentials =
                    vec![Credentials::new(&entry.username, &entry.password)];
                credentials.extend(entry.alternatives.iter().cloned());
                VendorCandidate {
                    vendor: VendorTag::new(vendor),
                    credentials,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
[ssh]
port = 2200
connect_timeout_secs = 5

[vendors.hirschmann]
username = "admin"
password = "private"

[[vendors.hirschmann.alternatives]]
username = "admin"
password = "public"

[vendors.kontron]
username = "admin"
password = "admin"
"#;

    #[test]
    fn parses_vendor_entries_and_settings() {
        let creds = FileCredentials::from_toml(SAMPLE).unwrap();
        assert_eq!(creds.ssh_settings().port, 2200);

        let candidates = creds.candidates(&Address::from("10.0.0.1"));
        assert_eq!(candidates.len(), 2);

        let hirschmann = candidates
            .iter()
            .find(|c| c.vendor == VendorTag::new("hirschmann"))
            .unwrap();
        assert_eq!(hirschmann.credentials.len(), 2);
        assert_eq!(hirschmann.credentials[0].password, "private");
        assert_eq!(hirschmann.credentials[1].password, "public");
    }

    #[test]
    fn resolve_returns_first_candidate() {
        let creds = FileCredentials::from_toml(SAMPLE).unwrap();
        let first = creds.resolve(&Address::from("10.0.0.1")).unwrap();
        // BTreeMap order: hirschmann before kontron
        assert_eq!(first.username, "admin");
        assert_eq!(first.password, "private");
    }

    #[test]
    fn empty_document_yields_no_candidates() {
        let creds = FileCredentials::from_toml("").unwrap();
        assert!(creds.candidates(&Address::from("10.0.0.1")).is_empty());
        assert!(creds.resolve(&Address::from("10.0.0.1")).is_none());
        assert_eq!(creds.ssh_settings().port, 22);
    }

    #[test]
    fn load_reports_missing_file() {
        // No unwrap_err here: FileCredentials has no Debug on purpose
        assert!(matches!(
            FileCredentials::load("/nonexistent/credentials.toml"),
            Err(CredentialsError::Read { .. })
        ));
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let creds = FileCredentials::load(file.path()).unwrap();
        assert_eq!(creds.ssh_settings().connect_timeout_secs, 5);
    }
}

//! Vendor classification probe
//!
//! Given an address with no prior assumption, the probe tries every
//! credential candidate, runs the vendor's identification command on
//! the ones that log in, and confirms the vendor by matching known
//! response patterns. Every session opened here is closed again
//! before the probe returns; the discovery strategy opens its own.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use switchmap_core::{Address, Credentials, VendorTag};
use switchmap_ssh::{CredentialSource, ShellSession, SshError, SshSettings};

/// Result of one classification attempt
///
/// Both fields absent means the address could not be classified;
/// a vendor without credentials means the login that confirmed the
/// vendor is not usable for discovery. Failures are values here,
/// never errors; the caller owns failure policy.
#[derive(Debug, Clone, Default)]
pub struct ProbeOutcome {
    pub vendor: Option<VendorTag>,
    pub credentials: Option<Credentials>,
}

impl ProbeOutcome {
    pub fn classified(vendor: VendorTag, credentials: Credentials) -> Self {
        Self {
            vendor: Some(vendor),
            credentials: Some(credentials),
        }
    }

    pub fn unknown() -> Self {
        Self::default()
    }
}

/// Classifies the vendor of a switch at an address
#[async_trait]
pub trait VendorProbe: Send + Sync {
    async fn probe(&self, address: &Address) -> ProbeOutcome;
}

/// Identification command and confirmation patterns for one vendor
#[derive(Debug, Clone)]
pub struct DetectionRule {
    pub vendor: VendorTag,
    /// Vendor-native identification command
    pub command: &'static str,
    /// Lowercase substrings that confirm the vendor when present in
    /// the command output
    pub patterns: &'static [&'static str],
}

/// Detection rules for the vendors shipped with SwitchMap
pub fn builtin_detection_rules() -> Vec<DetectionRule> {
    vec![
        DetectionRule {
            vendor: VendorTag::new("hirschmann"),
            command: "show system info",
            patterns: &["hirschmann", "hios", "bobcat"],
        },
        DetectionRule {
            vendor: VendorTag::new("lantech"),
            command: "System configuration",
            patterns: &["lantech", "tpes"],
        },
        DetectionRule {
            vendor: VendorTag::new("kontron"),
            command: "show version",
            patterns: &["kontron", "kswitch", "istax"],
        },
        DetectionRule {
            vendor: VendorTag::new("nomad"),
            command: "show version",
            patterns: &["nomad"],
        },
    ]
}

/// SSH-backed probe driven by a credential source
pub struct SshVendorProbe {
    source: Arc<dyn CredentialSource>,
    settings: SshSettings,
    rules: Vec<DetectionRule>,
}

impl SshVendorProbe {
    pub fn new(source: Arc<dyn CredentialSource>, settings: SshSettings) -> Self {
        Self::with_rules(source, settings, builtin_detection_rules())
    }

    pub fn with_rules(
        source: Arc<dyn CredentialSource>,
        settings: SshSettings,
        rules: Vec<DetectionRule>,
    ) -> Self {
        Self {
            source,
            settings,
            rules,
        }
    }

    /// Log in and run the identification command
    async fn confirm_vendor(
        &self,
        address: &Address,
        credentials: &Credentials,
        rule: &DetectionRule,
    ) -> Confirmation {
        let session = match ShellSession::connect(address, credentials, &self.settings).await {
            Ok(session) => session,
            Err(e) => {
                debug!(addr = %address, vendor = %rule.vendor, error = %e, "Probe login failed");
                return Confirmation::LoginFailed;
            }
        };

        let result = probe_output(&session, rule).await;
        if let Err(e) = &result {
            debug!(
                addr = %address,
                vendor = %rule.vendor,
                error = %e,
                "Session dropped during identification"
            );
        }
        let confirmation = confirmation_from_output(rule, result);

        // Classification sessions never leak into discovery
        session.close().await;
        confirmation
    }
}

/// Outcome of one login-and-identify attempt
#[derive(Debug, PartialEq, Eq)]
enum Confirmation {
    /// Output matched the rule's patterns
    Vendor,
    /// Logged in and got output, but nothing matched
    Mismatch,
    /// The login itself was rejected or unreachable
    LoginFailed,
    /// Logged in but the session dropped before output came back
    SessionLost,
}

fn confirmation_from_output(
    rule: &DetectionRule,
    output: Result<String, SshError>,
) -> Confirmation {
    match output {
        Ok(output) => {
            let lower = output.to_lowercase();
            if rule.patterns.iter().any(|p| lower.contains(p)) {
                Confirmation::Vendor
            } else {
                Confirmation::Mismatch
            }
        }
        Err(_) => Confirmation::SessionLost,
    }
}

async fn probe_output(session: &ShellSession, rule: &DetectionRule) -> Result<String, SshError> {
    session.drain_banner().await?;
    session.send_command(rule.command).await
}

#[async_trait]
impl VendorProbe for SshVendorProbe {
    async fn probe(&self, address: &Address) -> ProbeOutcome {
        for candidate in self.source.candidates(address) {
            let Some(rule) = self.rules.iter().find(|r| r.vendor == candidate.vendor) else {
                debug!(
                    addr = %address,
                    vendor = %candidate.vendor,
                    "No detection rule for vendor, skipping candidate"
                );
                continue;
            };

            for credentials in &candidate.credentials {
                match self.confirm_vendor(address, credentials, rule).await {
                    Confirmation::Vendor => {
                        info!(addr = %address, vendor = %rule.vendor, "Vendor classified");
                        return ProbeOutcome::classified(
                            rule.vendor.clone(),
                            credentials.clone(),
                        );
                    }
                    // Logged in but the output did not match: this is
                    // some other vendor, stop burning logins on it
                    Confirmation::Mismatch => {
                        debug!(
                            addr = %address,
                            vendor = %rule.vendor,
                            "Connected but vendor not confirmed"
                        );
                        break;
                    }
                    // Rejected login or dropped session: the next
                    // credential pair may still work
                    Confirmation::LoginFailed | Confirmation::SessionLost => continue,
                }
            }
        }

        debug!(addr = %address, "Vendor classification failed");
        ProbeOutcome::unknown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hirschmann_rule() -> DetectionRule {
        builtin_detection_rules()
            .into_iter()
            .find(|r| r.vendor == VendorTag::new("hirschmann"))
            .unwrap()
    }

    #[test]
    fn matching_output_confirms_the_vendor() {
        let output = "System Description.... Hirschmann BOBCAT switch".to_string();
        assert_eq!(
            confirmation_from_output(&hirschmann_rule(), Ok(output)),
            Confirmation::Vendor
        );
    }

    #[test]
    fn unmatched_output_is_a_mismatch() {
        let output = "Cisco IOS Software, C2960 ...".to_string();
        assert_eq!(
            confirmation_from_output(&hirschmann_rule(), Ok(output)),
            Confirmation::Mismatch
        );
    }

    #[test]
    fn session_error_is_not_a_vendor_mismatch() {
        // A dropped session must not abandon the remaining credential
        // candidates the way a genuine mismatch does
        let err = SshError::Resolve("10.0.0.1:22".to_string());
        assert_eq!(
            confirmation_from_output(&hirschmann_rule(), Err(err)),
            Confirmation::SessionLost
        );
    }
}

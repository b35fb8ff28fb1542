//! Hirschmann (HiOS) switch discovery
//!
//! Identity comes from `show system info`, which prints dotted-fill
//! key/value lines; neighbors come from `show lldp remote-data`.

use async_trait::async_trait;
use tracing::debug;

use switchmap_core::{Address, Credentials, SwitchRecord, SystemInfo, VendorTag};
use switchmap_ssh::{ShellSession, SshSettings};

use crate::error::DiscoveryError;
use crate::strategy::VendorDiscovery;

use super::scrape::{dotted_field, parse_remote_data_blocks};

pub struct HirschmannDiscovery {
    address: Address,
    credentials: Credentials,
    settings: SshSettings,
}

impl HirschmannDiscovery {
    pub fn new(address: Address, credentials: Credentials, settings: SshSettings) -> Self {
        Self {
            address,
            credentials,
            settings,
        }
    }
}

#[async_trait]
impl VendorDiscovery for HirschmannDiscovery {
    async fn discover(&self) -> Result<SwitchRecord, DiscoveryError> {
        let session =
            ShellSession::connect(&self.address, &self.credentials, &self.settings).await?;
        session.drain_banner().await?;

        let system_output = session.send_command("show system info").await?;
        let lldp_output = session.send_command("show lldp remote-data").await?;
        session.close().await;

        let mut record = SwitchRecord::new(self.address.clone(), VendorTag::new("hirschmann"));
        record.system = parse_system_info(&system_output);
        record.mac = dotted_field(&system_output, "MAC address (management)");
        record.neighbors = parse_remote_data_blocks(&lldp_output);

        debug!(
            addr = %self.address,
            neighbors = record.neighbors.len(),
            "Hirschmann discovery complete"
        );
        Ok(record)
    }
}

fn parse_system_info(output: &str) -> SystemInfo {
    let description = dotted_field(output, "System Description");

    // Model is sometimes only visible inside the description line
    let model = dotted_field(output, "Device hardware description").or_else(|| {
        description.as_deref().and_then(|desc| {
            if desc.contains("BOBCAT") {
                Some("BOBCAT".to_string())
            } else if desc.contains("BXP") {
                Some("BXP".to_string())
            } else {
                None
            }
        })
    });

    SystemInfo {
        hostname: dotted_field(output, "System name"),
        model,
        os_version: dotted_field(output, "Firmware software release (RAM)"),
        serial_number: dotted_field(output, "Serial number"),
        uptime: dotted_field(output, "System uptime"),
    }
}

//! Nomad switch discovery
//!
//! Nomad units run a generic industrial CLI: `show version` for
//! identity and `show lldp remote-data` with the same block format
//! Hirschmann prints.

use async_trait::async_trait;
use tracing::debug;

use switchmap_core::{Address, Credentials, SwitchRecord, SystemInfo, VendorTag};
use switchmap_ssh::{ShellSession, SshSettings};

use crate::error::DiscoveryError;
use crate::strategy::VendorDiscovery;

use super::scrape::{dotted_field, find_mac, parse_remote_data_blocks};

pub struct NomadDiscovery {
    address: Address,
    credentials: Credentials,
    settings: SshSettings,
}

impl NomadDiscovery {
    pub fn new(address: Address, credentials: Credentials, settings: SshSettings) -> Self {
        Self {
            address,
            credentials,
            settings,
        }
    }
}

#[async_trait]
impl VendorDiscovery for NomadDiscovery {
    async fn discover(&self) -> Result<SwitchRecord, DiscoveryError> {
        let session =
            ShellSession::connect(&self.address, &self.credentials, &self.settings).await?;
        session.drain_banner().await?;
        session.send_command("terminal length 0").await?;

        let version_output = session.send_command("show version").await?;
        let lldp_output = session.send_command("show lldp remote-data").await?;
        session.close().await;

        let mut record = SwitchRecord::new(self.address.clone(), VendorTag::new("nomad"));
        record.system = parse_version(&version_output);
        record.mac = version_output
            .lines()
            .find(|line| line.to_lowercase().contains("mac address"))
            .and_then(find_mac);
        record.neighbors = parse_remote_data_blocks(&lldp_output);

        debug!(
            addr = %self.address,
            neighbors = record.neighbors.len(),
            "Nomad discovery complete"
        );
        Ok(record)
    }
}

fn parse_version(output: &str) -> SystemInfo {
    SystemInfo {
        hostname: dotted_field(output, "System name"),
        model: dotted_field(output, "Model"),
        os_version: dotted_field(output, "Software version"),
        serial_number: dotted_field(output, "Serial number"),
        uptime: dotted_field(output, "Uptime"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_output_parses_identity() {
        let output = "\
NOMAD industrial switch
System name.........nomad-edge-07
Model...............NMD-2408
Software version....3.2.1-rc2
Serial number.......N7-0042
Uptime..............18 days
MAC address.........02:42:ac:11:00:07
";
        let info = parse_version(output);
        assert_eq!(info.hostname.as_deref(), Some("nomad-edge-07"));
        assert_eq!(info.model.as_deref(), Some("NMD-2408"));
        assert_eq!(info.os_version.as_deref(), Some("3.2.1-rc2"));
        assert_eq!(info.serial_number.as_deref(), Some("N7-0042"));
        assert_eq!(info.uptime.as_deref(), Some("18 days"));
    }

    #[test]
    fn empty_version_output_yields_defaults() {
        assert_eq!(parse_version(""), SystemInfo::default());
    }
}

//! Lantech switch discovery
//!
//! Lantech units answer `System configuration` with a dotted-fill
//! summary but expose no LLDP table on the firmware in the field, so
//! discovery captures identity only and reports no neighbor edges.

use async_trait::async_trait;
use tracing::debug;

use switchmap_core::{Address, Credentials, SwitchRecord, SystemInfo, VendorTag};
use switchmap_ssh::{ShellSession, SshSettings};

use crate::error::DiscoveryError;
use crate::strategy::VendorDiscovery;

use super::scrape::dotted_field;

pub struct LantechDiscovery {
    address: Address,
    credentials: Credentials,
    settings: SshSettings,
}

impl LantechDiscovery {
    pub fn new(address: Address, credentials: Credentials, settings: SshSettings) -> Self {
        Self {
            address,
            credentials,
            settings,
        }
    }
}

#[async_trait]
impl VendorDiscovery for LantechDiscovery {
    async fn discover(&self) -> Result<SwitchRecord, DiscoveryError> {
        let session =
            ShellSession::connect(&self.address, &self.credentials, &self.settings).await?;
        session.drain_banner().await?;

        let config_output = session.send_command("System configuration").await?;
        session.close().await;

        let mut record = SwitchRecord::new(self.address.clone(), VendorTag::new("lantech"));
        record.system = parse_configuration(&config_output);
        record.mac = dotted_field(&config_output, "MAC address");

        debug!(addr = %self.address, "Lantech discovery complete (no neighbor table)");
        Ok(record)
    }
}

fn parse_configuration(output: &str) -> SystemInfo {
    SystemInfo {
        hostname: dotted_field(output, "System name"),
        model: dotted_field(output, "Model name"),
        os_version: dotted_field(output, "Firmware version"),
        serial_number: None,
        uptime: None,
    }
}

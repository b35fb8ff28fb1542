//! Kontron (KSwitch/IStaX) switch discovery
//!
//! Kontron CLIs page long outputs even after `terminal length 0` on
//! some firmware lines, so command output is drained through a
//! pager-tolerant send loop.

use async_trait::async_trait;
use tracing::debug;

use switchmap_core::{Address, Credentials, NeighborEdge, SwitchRecord, SystemInfo, VendorTag};
use switchmap_ssh::{ShellSession, SshSettings};

use crate::error::DiscoveryError;
use crate::strategy::VendorDiscovery;

use super::scrape::{find_ipv4, find_mac, vendor_from_description, PendingNeighbor};

/// Upper bound on pager continuation round trips per command
const MAX_PAGER_ROUNDS: usize = 10;

pub struct KontronDiscovery {
    address: Address,
    credentials: Credentials,
    settings: SshSettings,
}

impl KontronDiscovery {
    pub fn new(address: Address, credentials: Credentials, settings: SshSettings) -> Self {
        Self {
            address,
            credentials,
            settings,
        }
    }

    /// Send a command and keep feeding the pager a space until the
    /// output stops asking for more
    async fn send_with_pager(
        &self,
        session: &ShellSession,
        command: &str,
    ) -> Result<String, DiscoveryError> {
        let mut output = session.send_command(command).await?;

        for _ in 0..MAX_PAGER_ROUNDS {
            let lower = output.to_lowercase();
            if !lower.contains("--more--") && !lower.contains("-- more --") {
                break;
            }
            let continuation = session.send_command(" ").await?;
            if continuation.is_empty() {
                break;
            }
            output.push_str(&continuation);
        }

        Ok(output)
    }
}

#[async_trait]
impl VendorDiscovery for KontronDiscovery {
    async fn discover(&self) -> Result<SwitchRecord, DiscoveryError> {
        let session =
            ShellSession::connect(&self.address, &self.credentials, &self.settings).await?;
        session.drain_banner().await?;
        session.send_command("terminal length 0").await?;

        let version_output = self.send_with_pager(&session, "show version").await?;
        let lldp_output = self.send_with_pager(&session, "show lldp neighbors").await?;
        session.close().await;

        let mut record = SwitchRecord::new(self.address.clone(), VendorTag::new("kontron"));
        record.system = parse_version(&version_output);
        record.mac = version_output
            .lines()
            .find(|line| line.to_lowercase().contains("mac address"))
            .and_then(find_mac);
        record.neighbors = parse_lldp_neighbors(&lldp_output);

        debug!(
            addr = %self.address,
            neighbors = record.neighbors.len(),
            "Kontron discovery complete"
        );
        Ok(record)
    }
}

fn parse_version(output: &str) -> SystemInfo {
    let mut info = SystemInfo::default();
    for line in output.lines() {
        let line = line.trim();
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match key.trim().to_lowercase().as_str() {
            "hostname" | "system name" => info.hostname = Some(value.to_string()),
            "product" | "model" => info.model = Some(value.to_string()),
            "version" | "software version" => info.os_version = Some(value.to_string()),
            "serial number" => info.serial_number = Some(value.to_string()),
            "system uptime" | "uptime" => info.uptime = Some(value.to_string()),
            _ => {}
        }
    }
    info
}

/// Parse `show lldp neighbors` output: one block per neighbor,
/// starting at the `Local Interface` line
fn parse_lldp_neighbors(output: &str) -> Vec<NeighborEdge> {
    let mut neighbors = Vec::new();
    let mut current = PendingNeighbor::default();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with("Local Interface") {
            current.flush_into(&mut neighbors);
            current.local_port = value_after_colon(line);
        } else if line.contains("Management Address") && line.contains("IPv4") {
            current.address = find_ipv4(line);
        } else if line.starts_with("Chassis ID") {
            current.mac = find_mac(line);
        } else if line.starts_with("Port ID") {
            current.remote_port = value_after_colon(line);
        } else if line.starts_with("System Description") {
            current.vendor = vendor_from_description(line);
        }
    }
    current.flush_into(&mut neighbors);

    neighbors
}

fn value_after_colon(line: &str) -> Option<String> {
    line.split_once(':')
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

//! Output document encoding
//!
//! Two persisted projections of a crawl: a per-run topology document
//! (JSON) and a cumulative inventory document (YAML) merged across
//! runs. Pure encoding; nothing here feeds back into the crawl.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use switchmap_core::{Address, SwitchRecord, Topology};

/// Write the per-run topology snapshot as pretty JSON
///
/// The file name embeds the seed so runs against different seeds do
/// not clobber each other.
pub fn write_topology(dir: &Path, seed: &Address, topology: &Topology) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("cannot create output directory {}", dir.display()))?;

    let file_name = format!("topology_{}.json", seed.as_str().replace(['.', ':'], "_"));
    let path = dir.join(file_name);

    let json = serde_json::to_string_pretty(topology)?;
    std::fs::write(&path, json)
        .with_context(|| format!("cannot write topology document {}", path.display()))?;

    Ok(path)
}

/// Cumulative switch inventory maintained across runs
#[derive(Debug, Default, Serialize, Deserialize)]
struct Inventory {
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    switches: BTreeMap<Address, SwitchRecord>,
}

/// Merge this run's switches into `inventory.yaml`
///
/// Records replace earlier entries for the same address; switches
/// only seen in earlier runs are kept.
pub fn update_inventory(dir: &Path, topology: &Topology) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("cannot create output directory {}", dir.display()))?;
    let path = dir.join("inventory.yaml");

    let mut inventory = match std::fs::read_to_string(&path) {
        Ok(text) => serde_yaml::from_str(&text).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Inventory unreadable, starting fresh");
            Inventory::default()
        }),
        Err(_) => Inventory::default(),
    };

    for switch in topology.switches() {
        inventory
            .switches
            .insert(switch.address.clone(), switch.clone());
    }
    inventory.updated_at = Some(topology.discovery_timestamp);

    let yaml = serde_yaml::to_string(&inventory)?;
    std::fs::write(&path, yaml)
        .with_context(|| format!("cannot write inventory document {}", path.display()))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchmap_core::{NeighborEdge, VendorTag};

    fn topology_with(addr: &str, vendor: &str, neighbors: &[&str]) -> Topology {
        let mut record = SwitchRecord::new(addr, VendorTag::new(vendor));
        record.neighbors = neighbors.iter().map(|n| NeighborEdge::new(*n)).collect();
        let mut topology = Topology::new();
        topology.insert(record);
        topology
    }

    #[test]
    fn topology_document_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let topology = topology_with("10.0.0.1", "hirschmann", &["10.0.0.2"]);

        let path = write_topology(dir.path(), &Address::from("10.0.0.1"), &topology).unwrap();
        assert!(path.ends_with("topology_10_0_0_1.json"));

        let text = std::fs::read_to_string(&path).unwrap();
        let back: Topology = serde_json::from_str(&text).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back.neighbor_edge_count(), 1);
    }

    #[test]
    fn inventory_accumulates_across_runs() {
        let dir = tempfile::tempdir().unwrap();

        update_inventory(dir.path(), &topology_with("10.0.0.1", "hirschmann", &[])).unwrap();
        let path =
            update_inventory(dir.path(), &topology_with("10.0.0.2", "kontron", &[])).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let inventory: Inventory = serde_yaml::from_str(&text).unwrap();
        assert_eq!(inventory.switches.len(), 2);
        assert!(inventory.switches.contains_key(&Address::from("10.0.0.1")));
        assert!(inventory.switches.contains_key(&Address::from("10.0.0.2")));
    }

    #[test]
    fn inventory_replaces_rediscovered_switches() {
        let dir = tempfile::tempdir().unwrap();

        update_inventory(
            dir.path(),
            &topology_with("10.0.0.1", "hirschmann", &["10.0.0.9"]),
        )
        .unwrap();
        let path =
            update_inventory(dir.path(), &topology_with("10.0.0.1", "kontron", &[])).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let inventory: Inventory = serde_yaml::from_str(&text).unwrap();
        assert_eq!(inventory.switches.len(), 1);
        let record = &inventory.switches[&Address::from("10.0.0.1")];
        assert_eq!(record.vendor, VendorTag::new("kontron"));
        assert!(record.neighbors.is_empty());
    }

    #[test]
    fn corrupt_inventory_is_rebuilt_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("inventory.yaml"), "{not yaml: [").unwrap();

        let path =
            update_inventory(dir.path(), &topology_with("10.0.0.1", "nomad", &[])).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let inventory: Inventory = serde_yaml::from_str(&text).unwrap();
        assert_eq!(inventory.switches.len(), 1);
    }
}

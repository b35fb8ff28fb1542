//! Crawl result bookkeeping and summary statistics

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::switch::Address;
use crate::topology::Topology;

/// Why a visited switch could not be captured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// Vendor could not be determined, or no strategy handles it
    Classification,
    /// No usable credentials were resolved for the address
    Credentials,
    /// Session unreachable, rejected, or dropped mid-discovery
    Transport,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Classification => write!(f, "classification"),
            FailureKind::Credentials => write!(f, "credentials"),
            FailureKind::Transport => write!(f, "transport"),
        }
    }
}

/// Final outcome of one crawl run
///
/// The topology may be partial; failures are recorded per address
/// rather than aborting the run. Every address ever visited lands in
/// exactly one of `discovered` or `failed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlReport {
    pub topology: Topology,
    pub discovered: BTreeSet<Address>,
    pub failed: BTreeMap<Address, FailureKind>,
}

impl CrawlReport {
    /// All addresses visited during the run
    pub fn seen(&self) -> BTreeSet<Address> {
        self.discovered
            .iter()
            .chain(self.failed.keys())
            .cloned()
            .collect()
    }

    /// Derive summary statistics from the final state
    pub fn summary(&self) -> TopologySummary {
        let mut vendor_counts: BTreeMap<String, usize> = BTreeMap::new();
        for switch in self.topology.switches() {
            *vendor_counts
                .entry(switch.vendor.as_str().to_string())
                .or_insert(0) += 1;
        }

        TopologySummary {
            switch_count: self.topology.len(),
            vendor_counts,
            neighbor_edge_count: self.topology.neighbor_edge_count(),
            discovered: self.discovered.iter().cloned().collect(),
            failed: self.failed.keys().cloned().collect(),
            discovery_timestamp: self.topology.discovery_timestamp,
        }
    }
}

/// Statistics derived from a completed crawl
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologySummary {
    pub switch_count: usize,
    /// How many switches of each vendor tag were captured
    pub vendor_counts: BTreeMap<String, usize>,
    /// Directed edge total over all neighbor lists
    pub neighbor_edge_count: usize,
    pub discovered: Vec<Address>,
    pub failed: Vec<Address>,
    pub discovery_timestamp: chrono::DateTime<chrono::Utc>,
}

//! Topology graph accumulating switch records keyed by address

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::switch::{Address, SwitchRecord};

/// Network topology assembled by one crawl run
///
/// The timestamp is fixed when the topology is created and never
/// mutated afterwards. Every key equals the address of the record it
/// maps to; the insert API keys by the record itself so the invariant
/// cannot be broken from outside.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topology {
    /// When the crawl that produced this topology started
    pub discovery_timestamp: DateTime<Utc>,
    /// All discovered switches indexed by management address
    switches: BTreeMap<Address, SwitchRecord>,
}

impl Topology {
    /// Create an empty topology stamped with the current time
    pub fn new() -> Self {
        Self::with_timestamp(Utc::now())
    }

    /// Create an empty topology with an explicit timestamp
    pub fn with_timestamp(discovery_timestamp: DateTime<Utc>) -> Self {
        Self {
            discovery_timestamp,
            switches: BTreeMap::new(),
        }
    }

    /// Insert a switch record, replacing any prior record for the
    /// same address. Returns the replaced record if there was one.
    pub fn insert(&mut self, record: SwitchRecord) -> Option<SwitchRecord> {
        self.switches.insert(record.address.clone(), record)
    }

    /// Look up a switch by address
    pub fn get(&self, address: &Address) -> Option<&SwitchRecord> {
        self.switches.get(address)
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.switches.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.switches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.switches.is_empty()
    }

    /// Iterate all switch records in address order
    pub fn switches(&self) -> impl Iterator<Item = &SwitchRecord> {
        self.switches.values()
    }

    /// Total directed neighbor-edge count: the sum of per-switch
    /// neighbor list lengths, not deduplicated into undirected links
    pub fn neighbor_edge_count(&self) -> usize {
        self.switches.values().map(|s| s.neighbors.len()).sum()
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::new()
    }
}

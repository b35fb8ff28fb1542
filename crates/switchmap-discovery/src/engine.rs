//! Worklist-driven network crawl
//!
//! The engine owns all crawl-scoped state: the candidate worklist,
//! the seen/discovered/failed sets, and the topology under
//! construction. Per-node failures are recorded and skipped; nothing
//! a single switch does can abort the run.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use switchmap_core::{Address, CrawlReport, FailureKind, SwitchRecord, Topology};

use crate::probe::VendorProbe;
use crate::strategy::StrategyRegistry;

/// Real-time crawl progress notifications
#[derive(Debug, Clone)]
pub enum CrawlEvent {
    /// Crawl started from a seed address
    Started { seed: Address },
    /// A switch was captured into the topology
    SwitchDiscovered(SwitchRecord),
    /// A visited address could not be captured
    SwitchFailed { address: Address, kind: FailureKind },
    /// The worklist drained
    Completed { discovered: usize, failed: usize },
}

/// Crawls a switch network from a single seed address
pub struct DiscoveryEngine {
    probe: Arc<dyn VendorProbe>,
    registry: StrategyRegistry,
    event_tx: broadcast::Sender<CrawlEvent>,
}

impl DiscoveryEngine {
    pub fn new(probe: Arc<dyn VendorProbe>, registry: StrategyRegistry) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        Self {
            probe,
            registry,
            event_tx,
        }
    }

    /// Subscribe to crawl progress events
    pub fn subscribe(&self) -> broadcast::Receiver<CrawlEvent> {
        self.event_tx.subscribe()
    }

    /// Drain the worklist from the seed and return the assembled
    /// topology together with the discovered/failed bookkeeping
    ///
    /// Strictly sequential: one node is probed and discovered at a
    /// time. Failed nodes are never re-enqueued within a run.
    pub async fn crawl(&self, seed: Address) -> CrawlReport {
        let mut candidates: BTreeSet<Address> = BTreeSet::new();
        let mut seen: BTreeSet<Address> = BTreeSet::new();
        let mut discovered: BTreeSet<Address> = BTreeSet::new();
        let mut failed: BTreeMap<Address, FailureKind> = BTreeMap::new();
        let mut topology = Topology::new();

        info!(seed = %seed, "Starting network crawl");
        let _ = self.event_tx.send(CrawlEvent::Started { seed: seed.clone() });
        candidates.insert(seed);

        let mut visits = 0usize;
        while let Some(address) = candidates.pop_first() {
            seen.insert(address.clone());
            visits += 1;
            debug!(addr = %address, visit = visits, "Visiting switch");

            let outcome = self.probe.probe(&address).await;

            let Some(vendor) = outcome.vendor else {
                warn!(addr = %address, "Vendor classification failed");
                self.record_failure(&mut failed, address, FailureKind::Classification);
                continue;
            };

            let Some(credentials) = outcome.credentials else {
                warn!(addr = %address, vendor = %vendor, "No usable credentials resolved");
                self.record_failure(&mut failed, address, FailureKind::Credentials);
                continue;
            };

            // An unregistered tag counts as a classification failure;
            // the run keeps going either way
            let Some(strategy) = self.registry.build(&vendor, address.clone(), credentials)
            else {
                warn!(addr = %address, vendor = %vendor, "No strategy registered for vendor");
                self.record_failure(&mut failed, address, FailureKind::Classification);
                continue;
            };

            match strategy.discover().await {
                Ok(record) => {
                    for neighbor in record.neighbor_addresses() {
                        if !seen.contains(neighbor) {
                            candidates.insert(neighbor.clone());
                        }
                    }
                    info!(
                        addr = %address,
                        vendor = %vendor,
                        neighbors = record.neighbors.len(),
                        "Switch discovered"
                    );
                    let _ = self
                        .event_tx
                        .send(CrawlEvent::SwitchDiscovered(record.clone()));
                    topology.insert(record);
                    discovered.insert(address);
                }
                Err(e) => {
                    warn!(addr = %address, vendor = %vendor, error = %e, "Discovery failed");
                    self.record_failure(&mut failed, address, e.failure_kind());
                }
            }
        }

        info!(
            visited = visits,
            discovered = discovered.len(),
            failed = failed.len(),
            "Crawl complete"
        );
        let _ = self.event_tx.send(CrawlEvent::Completed {
            discovered: discovered.len(),
            failed: failed.len(),
        });

        CrawlReport {
            topology,
            discovered,
            failed,
        }
    }

    fn record_failure(
        &self,
        failed: &mut BTreeMap<Address, FailureKind>,
        address: Address,
        kind: FailureKind,
    ) {
        let _ = self.event_tx.send(CrawlEvent::SwitchFailed {
            address: address.clone(),
            kind,
        });
        failed.insert(address, kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    use switchmap_core::{Credentials, NeighborEdge, VendorTag};
    use switchmap_ssh::SshError;

    use crate::error::DiscoveryError;
    use crate::probe::ProbeOutcome;
    use crate::strategy::VendorDiscovery;

    /// Canned behavior for one mock switch
    #[derive(Clone)]
    enum Node {
        /// Discoverable, reporting these neighbor addresses
        Up(Vec<&'static str>),
        /// Probe classifies it but the discovery session fails
        TransportFail,
        /// Probe cannot classify the vendor
        Unclassified,
        /// Probe classifies it but resolves no credentials
        NoCredentials,
        /// Probe returns a vendor tag nothing is registered for
        UnknownVendor,
    }

    struct MockProbe {
        nodes: Arc<HashMap<Address, Node>>,
    }

    #[async_trait]
    impl VendorProbe for MockProbe {
        async fn probe(&self, address: &Address) -> ProbeOutcome {
            match self.nodes.get(address) {
                Some(Node::Unclassified) | None => ProbeOutcome::unknown(),
                Some(Node::NoCredentials) => ProbeOutcome {
                    vendor: Some(VendorTag::new("mockswitch")),
                    credentials: None,
                },
                Some(Node::UnknownVendor) => ProbeOutcome::classified(
                    VendorTag::new("cisco"),
                    Credentials::new("admin", "admin"),
                ),
                Some(_) => ProbeOutcome::classified(
                    VendorTag::new("mockswitch"),
                    Credentials::new("admin", "admin"),
                ),
            }
        }
    }

    struct MockStrategy {
        address: Address,
        nodes: Arc<HashMap<Address, Node>>,
    }

    #[async_trait]
    impl VendorDiscovery for MockStrategy {
        async fn discover(&self) -> Result<SwitchRecord, DiscoveryError> {
            match self.nodes.get(&self.address) {
                Some(Node::Up(neighbors)) => {
                    let mut record =
                        SwitchRecord::new(self.address.clone(), VendorTag::new("mockswitch"));
                    record.neighbors =
                        neighbors.iter().map(|n| NeighborEdge::new(*n)).collect();
                    Ok(record)
                }
                _ => Err(DiscoveryError::Transport(SshError::Resolve(
                    self.address.to_string(),
                ))),
            }
        }
    }

    /// Deterministic crawl environment over a canned node table
    fn engine_for(nodes: &[(&str, Node)]) -> DiscoveryEngine {
        let nodes: Arc<HashMap<Address, Node>> = Arc::new(
            nodes
                .iter()
                .map(|(addr, node)| (Address::from(*addr), node.clone()))
                .collect(),
        );

        let mut registry = StrategyRegistry::new();
        let strategy_nodes = Arc::clone(&nodes);
        registry.register(
            VendorTag::new("mockswitch"),
            Box::new(move |address, _creds| {
                Box::new(MockStrategy {
                    address,
                    nodes: Arc::clone(&strategy_nodes),
                })
            }),
        );

        DiscoveryEngine::new(Arc::new(MockProbe { nodes }), registry)
    }

    fn addr(s: &str) -> Address {
        Address::from(s)
    }

    fn assert_set_invariants(report: &CrawlReport) {
        for address in &report.discovered {
            assert!(
                !report.failed.contains_key(address),
                "{address} in both discovered and failed"
            );
        }
        let union = report.seen();
        assert_eq!(
            union.len(),
            report.discovered.len() + report.failed.len(),
            "seen must be the disjoint union of discovered and failed"
        );
    }

    #[tokio::test]
    async fn unclassified_seed_fails_with_empty_topology() {
        // Scenario A
        let engine = engine_for(&[("10.0.0.1", Node::Unclassified)]);
        let report = engine.crawl(addr("10.0.0.1")).await;

        assert!(report.discovered.is_empty());
        assert_eq!(
            report.failed.get(&addr("10.0.0.1")),
            Some(&FailureKind::Classification)
        );
        assert!(report.topology.is_empty());
        assert_set_invariants(&report);
    }

    #[tokio::test]
    async fn seed_with_two_leaf_neighbors_discovers_all_three() {
        // Scenario B
        let engine = engine_for(&[
            ("10.0.0.1", Node::Up(vec!["10.0.0.2", "10.0.0.3"])),
            ("10.0.0.2", Node::Up(vec![])),
            ("10.0.0.3", Node::Up(vec![])),
        ]);
        let report = engine.crawl(addr("10.0.0.1")).await;

        assert_eq!(report.discovered.len(), 3);
        assert!(report.failed.is_empty());
        assert_eq!(report.topology.len(), 3);
        assert_eq!(report.topology.neighbor_edge_count(), 2);
        assert_set_invariants(&report);
    }

    #[tokio::test]
    async fn neighbor_transport_failure_is_isolated() {
        // Scenario C: the edge to the failed node stays recorded
        let engine = engine_for(&[
            ("10.0.0.1", Node::Up(vec!["10.0.0.2"])),
            ("10.0.0.2", Node::TransportFail),
        ]);
        let report = engine.crawl(addr("10.0.0.1")).await;

        assert_eq!(report.discovered, [addr("10.0.0.1")].into_iter().collect());
        assert_eq!(
            report.failed.get(&addr("10.0.0.2")),
            Some(&FailureKind::Transport)
        );
        assert_eq!(report.topology.len(), 1);
        assert_eq!(report.topology.neighbor_edge_count(), 1);
        assert_set_invariants(&report);
    }

    #[tokio::test]
    async fn mutual_neighbors_terminate_without_revisit() {
        // Scenario D: X -> Y -> X cycle
        let engine = engine_for(&[
            ("10.0.0.1", Node::Up(vec!["10.0.0.2"])),
            ("10.0.0.2", Node::Up(vec!["10.0.0.1"])),
        ]);
        let report = engine.crawl(addr("10.0.0.1")).await;

        assert_eq!(report.discovered.len(), 2);
        assert!(report.failed.is_empty());
        assert_eq!(report.topology.neighbor_edge_count(), 2);
        assert_set_invariants(&report);
    }

    #[tokio::test]
    async fn self_reporting_switch_is_visited_once() {
        let engine = engine_for(&[("10.0.0.1", Node::Up(vec!["10.0.0.1"]))]);
        let report = engine.crawl(addr("10.0.0.1")).await;

        assert_eq!(report.discovered.len(), 1);
        assert_eq!(report.topology.neighbor_edge_count(), 1);
        assert_set_invariants(&report);
    }

    #[tokio::test]
    async fn lone_seed_yields_singleton_seen() {
        let engine = engine_for(&[("10.0.0.1", Node::Up(vec![]))]);
        let report = engine.crawl(addr("10.0.0.1")).await;

        assert_eq!(report.seen(), [addr("10.0.0.1")].into_iter().collect());
        assert_eq!(report.discovered.len(), 1);
        assert!(report.failed.is_empty());
        assert_set_invariants(&report);
    }

    #[tokio::test]
    async fn missing_credentials_recorded_as_credential_failure() {
        let engine = engine_for(&[("10.0.0.1", Node::NoCredentials)]);
        let report = engine.crawl(addr("10.0.0.1")).await;

        assert_eq!(
            report.failed.get(&addr("10.0.0.1")),
            Some(&FailureKind::Credentials)
        );
        assert_set_invariants(&report);
    }

    #[tokio::test]
    async fn unregistered_vendor_tag_is_isolated_not_fatal() {
        let engine = engine_for(&[
            ("10.0.0.1", Node::Up(vec!["10.0.0.2"])),
            ("10.0.0.2", Node::UnknownVendor),
        ]);
        let report = engine.crawl(addr("10.0.0.1")).await;

        assert_eq!(report.discovered.len(), 1);
        assert_eq!(
            report.failed.get(&addr("10.0.0.2")),
            Some(&FailureKind::Classification)
        );
        assert_set_invariants(&report);
    }

    #[tokio::test]
    async fn reachability_closure_over_a_deeper_graph() {
        let engine = engine_for(&[
            ("10.0.0.1", Node::Up(vec!["10.0.0.2", "10.0.0.3"])),
            ("10.0.0.2", Node::Up(vec!["10.0.0.4"])),
            ("10.0.0.3", Node::TransportFail),
            ("10.0.0.4", Node::Up(vec!["10.0.0.1", "10.0.0.5"])),
            ("10.0.0.5", Node::Unclassified),
        ]);
        let report = engine.crawl(addr("10.0.0.1")).await;

        // Every neighbor ever reported by a discovered switch got visited
        let seen = report.seen();
        for switch in report.topology.switches() {
            for neighbor in switch.neighbor_addresses() {
                assert!(seen.contains(neighbor), "{neighbor} never visited");
            }
        }
        assert_eq!(report.discovered.len(), 3);
        assert_eq!(report.failed.len(), 2);
        assert_set_invariants(&report);
    }

    #[tokio::test]
    async fn crawl_is_idempotent_against_fixed_environment() {
        let nodes: &[(&str, Node)] = &[
            ("10.0.0.1", Node::Up(vec!["10.0.0.2", "10.0.0.3"])),
            ("10.0.0.2", Node::Up(vec!["10.0.0.4"])),
            ("10.0.0.3", Node::TransportFail),
            ("10.0.0.4", Node::Up(vec![])),
        ];

        let first = engine_for(nodes).crawl(addr("10.0.0.1")).await;
        let second = engine_for(nodes).crawl(addr("10.0.0.1")).await;

        assert_eq!(first.discovered, second.discovered);
        assert_eq!(
            first.failed.keys().collect::<Vec<_>>(),
            second.failed.keys().collect::<Vec<_>>()
        );
        assert_eq!(
            first.topology.neighbor_edge_count(),
            second.topology.neighbor_edge_count()
        );
    }

    #[tokio::test]
    async fn events_mirror_the_crawl_outcome() {
        let engine = engine_for(&[
            ("10.0.0.1", Node::Up(vec!["10.0.0.2"])),
            ("10.0.0.2", Node::TransportFail),
        ]);
        let mut events = engine.subscribe();
        let _report = engine.crawl(addr("10.0.0.1")).await;

        let mut discovered = 0;
        let mut failed = 0;
        let mut completed = None;
        while let Ok(event) = events.try_recv() {
            match event {
                CrawlEvent::SwitchDiscovered(_) => discovered += 1,
                CrawlEvent::SwitchFailed { .. } => failed += 1,
                CrawlEvent::Completed {
                    discovered: d,
                    failed: f,
                } => completed = Some((d, f)),
                CrawlEvent::Started { .. } => {}
            }
        }

        assert_eq!(discovered, 1);
        assert_eq!(failed, 1);
        assert_eq!(completed, Some((1, 1)));
    }

    #[tokio::test]
    async fn summary_derives_from_final_state() {
        let engine = engine_for(&[
            ("10.0.0.1", Node::Up(vec!["10.0.0.2"])),
            ("10.0.0.2", Node::Up(vec![])),
        ]);
        let summary = engine.crawl(addr("10.0.0.1")).await.summary();

        assert_eq!(summary.switch_count, 2);
        assert_eq!(summary.neighbor_edge_count, 1);
        assert_eq!(summary.vendor_counts.get("mockswitch"), Some(&2));
        assert!(summary.failed.is_empty());
    }
}

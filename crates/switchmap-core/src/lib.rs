//! SwitchMap Core - Core types, topology graph, and crawl reporting
//!
//! This crate provides the foundational types for the SwitchMap system:
//! - Switch records and directed neighbor edges scraped from managed switches
//! - Topology graph keyed by management address
//! - Crawl report with discovered/failed bookkeeping and summary statistics

pub mod report;
pub mod switch;
pub mod topology;

pub use report::{CrawlReport, FailureKind, TopologySummary};
pub use switch::{Address, Credentials, NeighborEdge, SwitchRecord, SystemInfo, VendorTag};
pub use topology::Topology;

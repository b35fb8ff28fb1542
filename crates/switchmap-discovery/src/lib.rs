//! SwitchMap Discovery - Crawl engine and vendor-specific strategies
//!
//! This crate provides the discovery pipeline:
//! - Vendor probe that classifies an unknown switch by trying logins
//! - Per-vendor discovery strategies behind one capability trait
//! - Worklist-driven crawl engine with per-node failure isolation

pub mod engine;
pub mod error;
pub mod probe;
pub mod strategy;
pub mod vendors;

pub use engine::{CrawlEvent, DiscoveryEngine};
pub use error::DiscoveryError;
pub use probe::{DetectionRule, ProbeOutcome, SshVendorProbe, VendorProbe};
pub use strategy::{StrategyRegistry, VendorDiscovery};

//! Per-vendor discovery strategies
//!
//! Each module drives one vendor's management CLI and turns its
//! output into a `SwitchRecord`. The parsers are deliberately
//! tolerant: a garbled section yields fewer neighbor entries, never
//! a failed discovery.

pub mod hirschmann;
pub mod kontron;
pub mod lantech;
pub mod nomad;

mod scrape;

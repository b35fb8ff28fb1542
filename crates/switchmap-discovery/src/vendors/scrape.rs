//! Text-scraping helpers shared by the vendor parsers

use switchmap_core::{NeighborEdge, VendorTag};

/// Extract the value of a `Label.....value` line, the dotted-fill
/// key/value format most switch CLIs print
pub(crate) fn dotted_field(output: &str, label: &str) -> Option<String> {
    for line in output.lines() {
        let line = line.trim();
        let prefix_matches = line
            .get(..label.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(label));
        if prefix_matches {
            let value = line[label.len()..]
                .trim_start_matches(['.', ':', ' '])
                .trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// First IPv4 address embedded anywhere in a line
pub(crate) fn find_ipv4(line: &str) -> Option<String> {
    line.split(|c: char| !c.is_ascii_digit() && c != '.')
        .map(|token| token.trim_matches('.'))
        .find(|token| token.parse::<std::net::Ipv4Addr>().is_ok())
        .map(|token| token.to_string())
}

/// First MAC address (colon or dash separated) embedded in a line
pub(crate) fn find_mac(line: &str) -> Option<String> {
    line.split_whitespace()
        .map(|token| token.trim_matches([',', ';', '(', ')']))
        .find(|token| is_mac(token))
        .map(|token| token.to_string())
}

fn is_mac(token: &str) -> bool {
    let bytes = token.as_bytes();
    if bytes.len() != 17 {
        return false;
    }
    bytes.iter().enumerate().all(|(i, b)| {
        if i % 3 == 2 {
            *b == b':' || *b == b'-'
        } else {
            b.is_ascii_hexdigit()
        }
    })
}

/// Classify a neighbor's vendor from its advertised system description
pub(crate) fn vendor_from_description(line: &str) -> Option<VendorTag> {
    let lower = line.to_lowercase();
    for (needles, tag) in [
        (&["hirschmann", "hios", "bobcat"][..], "hirschmann"),
        (&["lantech", "tpes"][..], "lantech"),
        (&["kontron", "kswitch", "istax"][..], "kontron"),
        (&["nomad"][..], "nomad"),
    ] {
        if needles.iter().any(|n| lower.contains(n)) {
            return Some(VendorTag::new(tag));
        }
    }
    None
}

/// Parse `show lldp remote-data` block output (Hirschmann and Nomad
/// print the same shape): one block per remote port, each with an
/// IPv4 management address, a chassis MAC, and a system description
pub(crate) fn parse_remote_data_blocks(output: &str) -> Vec<NeighborEdge> {
    let mut neighbors = Vec::new();
    let mut current = PendingNeighbor::default();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        // A new block closes the previous one
        if line.starts_with("Remote data,") {
            current.flush_into(&mut neighbors);
        } else if line.contains("IPv4 Management address") {
            current.address = find_ipv4(line);
        } else if line.contains("Chassis ID") {
            current.mac = find_mac(line);
        } else if line.contains("System description") {
            current.vendor = vendor_from_description(line);
        }
    }
    current.flush_into(&mut neighbors);

    neighbors
}

/// Accumulator for one partially-parsed neighbor block
#[derive(Default)]
pub(crate) struct PendingNeighbor {
    pub address: Option<String>,
    pub mac: Option<String>,
    pub vendor: Option<VendorTag>,
    pub local_port: Option<String>,
    pub remote_port: Option<String>,
}

impl PendingNeighbor {
    /// Emit the entry if it has an address; blocks without one are
    /// unusable for the crawl and get dropped
    pub(crate) fn flush_into(&mut self, neighbors: &mut Vec<NeighborEdge>) {
        let pending = std::mem::take(self);
        if let Some(address) = pending.address {
            neighbors.push(NeighborEdge {
                address: address.into(),
                mac: pending.mac,
                vendor: pending.vendor,
                local_port: pending.local_port,
                remote_port: pending.remote_port,
            });
        }
    }
}

//! Switch record types built from one device's own management shell

use serde::{Deserialize, Serialize};

/// Management network address of a switch, used as the unique topology key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub String);

impl Address {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Vendor tag identifying which discovery strategy handles a switch
///
/// Open set: "hirschmann", "lantech", "kontron" and "nomad" are the
/// known values, but new vendors register under their own tag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VendorTag(String);

impl VendorTag {
    /// Create a tag, normalized to lowercase so registry lookups
    /// never miss on case
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self(tag.as_ref().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VendorTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Username/password pair resolved for one switch
///
/// Transient: held only for the lifetime of a session, never stored in
/// the topology or any output document.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Keep passwords out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Identity attributes scraped from a switch's system info output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub hostname: Option<String>,
    pub model: Option<String>,
    pub os_version: Option<String>,
    pub serial_number: Option<String>,
    pub uptime: Option<String>,
}

/// One directed adjacency taken from a switch's own neighbor table
///
/// Derived from a single endpoint's LLDP data and not confirmed from
/// the other side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborEdge {
    /// Management address of the neighbor
    pub address: Address,
    /// Chassis MAC of the neighbor, if advertised
    pub mac: Option<String>,
    /// Vendor classification inferred from the system description
    pub vendor: Option<VendorTag>,
    /// Interface on the reporting switch
    pub local_port: Option<String>,
    /// Port identifier advertised by the neighbor
    pub remote_port: Option<String>,
}

impl NeighborEdge {
    pub fn new(address: impl Into<Address>) -> Self {
        Self {
            address: address.into(),
            mac: None,
            vendor: None,
            local_port: None,
            remote_port: None,
        }
    }
}

/// Everything discovered about one switch in a single visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchRecord {
    /// Management address the switch was reached on
    pub address: Address,
    /// Vendor tag assigned by classification
    #[serde(rename = "type")]
    pub vendor: VendorTag,
    /// Management MAC address, if the vendor output exposes one
    pub mac: Option<String>,
    /// Free-form identity attributes
    #[serde(default)]
    pub system: SystemInfo,
    /// Directed neighbor edges in the order the switch reported them
    pub neighbors: Vec<NeighborEdge>,
}

impl SwitchRecord {
    pub fn new(address: impl Into<Address>, vendor: VendorTag) -> Self {
        Self {
            address: address.into(),
            vendor,
            mac: None,
            system: SystemInfo::default(),
            neighbors: Vec::new(),
        }
    }

    /// Addresses of all reported neighbors, in report order
    pub fn neighbor_addresses(&self) -> impl Iterator<Item = &Address> {
        self.neighbors.iter().map(|n| &n.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_tag_normalizes_case() {
        assert_eq!(VendorTag::new("Hirschmann"), VendorTag::new("hirschmann"));
        assert_eq!(VendorTag::new("KONTRON").as_str(), "kontron");
    }

    #[test]
    fn credentials_debug_redacts_password() {
        let creds = Credentials::new("admin", "private");
        let printed = format!("{:?}", creds);
        assert!(printed.contains("admin"));
        assert!(!printed.contains("private"));
    }

    #[test]
    fn switch_record_serializes_vendor_as_type() {
        let record = SwitchRecord::new("10.0.0.1", VendorTag::new("nomad"));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "nomad");
        assert_eq!(json["address"], "10.0.0.1");
    }
}

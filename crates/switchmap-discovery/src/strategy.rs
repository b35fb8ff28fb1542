//! Vendor discovery strategy trait and registry

use std::collections::HashMap;

use async_trait::async_trait;

use switchmap_core::{Address, Credentials, SwitchRecord, VendorTag};
use switchmap_ssh::SshSettings;

use crate::error::DiscoveryError;
use crate::vendors;

/// One vendor's discovery logic
///
/// A strategy is constructed per node from (address, credentials) and
/// opens its own authenticated session, independent from the probe's.
/// Unparseable output degrades to fewer or no neighbor entries;
/// session-level errors propagate.
#[async_trait]
pub trait VendorDiscovery: Send + Sync {
    async fn discover(&self) -> Result<SwitchRecord, DiscoveryError>;
}

/// Builds a strategy instance for one node
pub type StrategyFactory =
    Box<dyn Fn(Address, Credentials) -> Box<dyn VendorDiscovery> + Send + Sync>;

/// Maps vendor tags to strategy constructors
///
/// New vendors are added by registration; nothing in the engine
/// branches on a concrete vendor type.
#[derive(Default)]
pub struct StrategyRegistry {
    factories: HashMap<VendorTag, StrategyFactory>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the four vendors shipped with SwitchMap
    pub fn with_builtin(settings: SshSettings) -> Self {
        let mut registry = Self::new();

        let opts = settings.clone();
        registry.register(
            VendorTag::new("hirschmann"),
            Box::new(move |addr, creds| {
                Box::new(vendors::hirschmann::HirschmannDiscovery::new(
                    addr,
                    creds,
                    opts.clone(),
                ))
            }),
        );

        let opts = settings.clone();
        registry.register(
            VendorTag::new("kontron"),
            Box::new(move |addr, creds| {
                Box::new(vendors::kontron::KontronDiscovery::new(
                    addr,
                    creds,
                    opts.clone(),
                ))
            }),
        );

        let opts = settings.clone();
        registry.register(
            VendorTag::new("nomad"),
            Box::new(move |addr, creds| {
                Box::new(vendors::nomad::NomadDiscovery::new(addr, creds, opts.clone()))
            }),
        );

        let opts = settings;
        registry.register(
            VendorTag::new("lantech"),
            Box::new(move |addr, creds| {
                Box::new(vendors::lantech::LantechDiscovery::new(
                    addr,
                    creds,
                    opts.clone(),
                ))
            }),
        );

        registry
    }

    pub fn register(&mut self, vendor: VendorTag, factory: StrategyFactory) {
        self.factories.insert(vendor, factory);
    }

    pub fn contains(&self, vendor: &VendorTag) -> bool {
        self.factories.contains_key(vendor)
    }

    /// Build the strategy registered for a vendor tag, if any
    pub fn build(
        &self,
        vendor: &VendorTag,
        address: Address,
        credentials: Credentials,
    ) -> Option<Box<dyn VendorDiscovery>> {
        self.factories
            .get(vendor)
            .map(|factory| factory(address, credentials))
    }

    pub fn vendors(&self) -> impl Iterator<Item = &VendorTag> {
        self.factories.keys()
    }
}

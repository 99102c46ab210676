//! Availability of the multi-source inventory subsystem.
//!
//! The subsystem is probed once per [`CapabilityGate`]: first the required
//! modules, then each service handle individually. The outcome is kept until
//! [`CapabilityGate::reset`] is called.

use std::sync::{Arc, PoisonError, RwLock};

use stockfeed_core::LookupResult;

use crate::lookup::{
    ReservationsQuantity, SourceItemsBySku, StockItemConfigurationLookup, StockResolver, StockSourceLinks,
};

/// Modules that must all be enabled for multi-source resolution to be attempted.
pub const REQUIRED_MODULES: [&str; 5] = [
    "inventory-configuration",
    "inventory-configuration-api",
    "inventory-sales",
    "inventory-sales-api",
    "inventory-reservations-api",
];

/// Reports which parts of the multi-source subsystem are installed.
///
/// Handle constructors may fail independently; a failed handle is treated as missing.
pub trait CapabilityProbe: Send + Sync {
    fn is_module_enabled(&self, module: &str) -> bool;

    fn stock_resolver(&self) -> LookupResult<Arc<dyn StockResolver>>;

    fn stock_item_configuration(&self) -> LookupResult<Arc<dyn StockItemConfigurationLookup>>;

    fn stock_source_links(&self) -> LookupResult<Arc<dyn StockSourceLinks>>;

    fn source_items(&self) -> LookupResult<Arc<dyn SourceItemsBySku>>;

    fn reservations(&self) -> LookupResult<Arc<dyn ReservationsQuantity>>;
}

/// Service handles obtained from a successful probe.
#[derive(Clone, Default)]
pub struct MultiSourceServices {
    pub stock_resolver: Option<Arc<dyn StockResolver>>,
    pub stock_item_configuration: Option<Arc<dyn StockItemConfigurationLookup>>,
    pub stock_source_links: Option<Arc<dyn StockSourceLinks>>,
    pub source_items: Option<Arc<dyn SourceItemsBySku>>,
    pub reservations: Option<Arc<dyn ReservationsQuantity>>,
}

/// Borrowed handles needed to aggregate a quantity.
#[derive(Clone, Copy)]
pub struct AggregationServices<'a> {
    pub stock_resolver: &'a dyn StockResolver,
    pub stock_item_configuration: &'a dyn StockItemConfigurationLookup,
    pub source_items: &'a dyn SourceItemsBySku,
    pub reservations: &'a dyn ReservationsQuantity,
    pub stock_source_links: Option<&'a dyn StockSourceLinks>,
}

/// Borrowed handles needed to report per-source statuses.
#[derive(Clone, Copy)]
pub struct ReportingServices<'a> {
    pub stock_resolver: &'a dyn StockResolver,
    pub source_items: &'a dyn SourceItemsBySku,
    pub stock_source_links: Option<&'a dyn StockSourceLinks>,
}

impl MultiSourceServices {
    pub fn from_probe(probe: &dyn CapabilityProbe) -> Self {
        fn handle<T: ?Sized>(name: &str, result: LookupResult<Arc<T>>) -> Option<Arc<T>> {
            match result {
                Ok(handle) => Some(handle),
                Err(e) => {
                    tracing::debug!(service = name, error = %e, "multi-source service unavailable");
                    None
                }
            }
        }

        Self {
            stock_resolver: handle("stock_resolver", probe.stock_resolver()),
            stock_item_configuration: handle("stock_item_configuration", probe.stock_item_configuration()),
            stock_source_links: handle("stock_source_links", probe.stock_source_links()),
            source_items: handle("source_items", probe.source_items()),
            reservations: handle("reservations", probe.reservations()),
        }
    }

    /// All handles required by aggregation, or `None` if any is missing.
    pub fn aggregation(&self) -> Option<AggregationServices<'_>> {
        Some(AggregationServices {
            stock_resolver: self.stock_resolver.as_deref()?,
            stock_item_configuration: self.stock_item_configuration.as_deref()?,
            source_items: self.source_items.as_deref()?,
            reservations: self.reservations.as_deref()?,
            stock_source_links: self.stock_source_links.as_deref(),
        })
    }

    /// Handles required by source status reporting, or `None` if any is missing.
    pub fn reporting(&self) -> Option<ReportingServices<'_>> {
        Some(ReportingServices {
            stock_resolver: self.stock_resolver.as_deref()?,
            source_items: self.source_items.as_deref()?,
            stock_source_links: self.stock_source_links.as_deref(),
        })
    }
}

impl core::fmt::Debug for MultiSourceServices {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MultiSourceServices")
            .field("stock_resolver", &self.stock_resolver.is_some())
            .field("stock_item_configuration", &self.stock_item_configuration.is_some())
            .field("stock_source_links", &self.stock_source_links.is_some())
            .field("source_items", &self.source_items.is_some())
            .field("reservations", &self.reservations.is_some())
            .finish()
    }
}

/// Probe outcome.
#[derive(Debug, Clone, Default)]
pub enum Capability {
    #[default]
    Unprobed,
    Unavailable,
    Available(Arc<MultiSourceServices>),
}

/// One-time probe of the multi-source subsystem.
pub struct CapabilityGate {
    probe: Arc<dyn CapabilityProbe>,
    state: RwLock<Capability>,
}

impl CapabilityGate {
    pub fn new(probe: Arc<dyn CapabilityProbe>) -> Self {
        Self {
            probe,
            state: RwLock::new(Capability::Unprobed),
        }
    }

    /// Current state, without probing.
    pub fn state(&self) -> Capability {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Services of an available subsystem, probing on first use.
    pub fn services(&self) -> Option<Arc<MultiSourceServices>> {
        match self.state() {
            Capability::Available(services) => return Some(services),
            Capability::Unavailable => return None,
            Capability::Unprobed => {}
        }

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if let Capability::Unprobed = *state {
            *state = self.run_probe();
        }

        match &*state {
            Capability::Available(services) => Some(services.clone()),
            _ => None,
        }
    }

    /// Whether all required modules are enabled.
    pub fn is_enabled(&self) -> bool {
        self.services().is_some()
    }

    /// Return to [`Capability::Unprobed`]; the next request probes again.
    pub fn reset(&self) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = Capability::Unprobed;
    }

    fn run_probe(&self) -> Capability {
        if let Some(module) = REQUIRED_MODULES
            .iter()
            .find(|module| !self.probe.is_module_enabled(module))
        {
            tracing::info!(module = *module, "multi-source inventory disabled: required module not enabled");
            return Capability::Unavailable;
        }

        let services = MultiSourceServices::from_probe(self.probe.as_ref());
        tracing::info!(services = ?services, "multi-source inventory enabled");
        Capability::Available(Arc::new(services))
    }
}

impl core::fmt::Debug for CapabilityGate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CapabilityGate").field("state", &self.state()).finish()
    }
}

use std::sync::Arc;

use rust_decimal::Decimal;

use stockfeed_core::{LookupError, LookupResult, SourceCode, StockId};

use crate::aggregator::{MultiSourceAggregator, QuantityType, StockData};
use crate::capability::{CapabilityGate, CapabilityProbe};
use crate::catalog::{Product, Store};
use crate::legacy::LegacyStockRegistry;
use crate::snapshot_cache::fetch_source_snapshot;
use crate::source::SourceSnapshot;
use crate::topology::TopologyCache;
use crate::usable::UsableSourceFilter;

/// Quantity and status as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedStock {
    /// `None` means unlimited (stock is not managed).
    pub quantity: Option<Decimal>,
    pub in_stock: bool,
}

impl ResolvedStock {
    pub fn unlimited() -> Self {
        Self {
            quantity: None,
            in_stock: true,
        }
    }
}

/// Resolves product quantities from multi-source inventory, with legacy fallback.
///
/// Holds the process-lifetime caches (capability, stock topology, usable sources).
/// Per-product source snapshots live on the [`Product`] itself.
pub struct QtyResolver {
    capability: CapabilityGate,
    legacy: Arc<dyn LegacyStockRegistry>,
    topology: TopologyCache,
    usable_sources: UsableSourceFilter,
}

impl QtyResolver {
    pub fn new(probe: Arc<dyn CapabilityProbe>, legacy: Arc<dyn LegacyStockRegistry>) -> Self {
        Self {
            capability: CapabilityGate::new(probe),
            legacy,
            topology: TopologyCache::new(),
            usable_sources: UsableSourceFilter::new(),
        }
    }

    /// Whether the multi-source subsystem is enabled.
    pub fn is_using_multi_source(&self) -> bool {
        self.capability.is_enabled()
    }

    /// Restrict the sources counted for `store`. `None` counts every source.
    pub fn set_usable_sources(&self, store: &Store, codes: Option<Vec<SourceCode>>) {
        self.usable_sources.set(store.id(), codes);
    }

    pub fn is_usable_source(&self, store: &Store, code: &str) -> bool {
        self.usable_sources.is_usable(store.id(), code)
    }

    /// Multi-source stock data, without any fallback.
    pub fn compute_stock_data(&self, product: &Product, store: &Store, quantity_type: QuantityType) -> StockData {
        let Some(services) = self.capability.services() else {
            return StockData::Unavailable;
        };
        let Some(services) = services.aggregation() else {
            tracing::debug!(sku = product.sku(), "multi-source aggregation services missing");
            return StockData::Unavailable;
        };

        MultiSourceAggregator {
            services,
            topology: &self.topology,
            usable_sources: &self.usable_sources,
        }
        .compute(product, store, quantity_type)
    }

    /// Quantity and in-stock status of `product` for `store`.
    pub fn resolve(&self, product: &Product, store: &Store, quantity_type: QuantityType) -> ResolvedStock {
        match self.compute_stock_data(product, store, quantity_type) {
            StockData::Definite { in_stock, quantity } => ResolvedStock {
                quantity: Some(quantity),
                in_stock,
            },
            StockData::Unmanaged => ResolvedStock::unlimited(),
            StockData::Unavailable => {
                tracing::debug!(
                    sku = product.sku(),
                    store_id = %store.id(),
                    "falling back to legacy stock item"
                );
                self.resolve_legacy(product, store)
            }
        }
    }

    /// `None` means unlimited.
    pub fn resolve_quantity(&self, product: &Product, store: &Store, quantity_type: QuantityType) -> Option<Decimal> {
        self.resolve(product, store, quantity_type).quantity
    }

    pub fn resolve_in_stock(&self, product: &Product, store: &Store, quantity_type: QuantityType) -> bool {
        self.resolve(product, store, quantity_type).in_stock
    }

    /// Backorder support always comes from the legacy stock item.
    pub fn is_backorderable(&self, product: &Product, store: &Store) -> bool {
        self.legacy
            .stock_item(product.id(), store.website_id())
            .backorders
            .allows_backorders()
    }

    /// Source snapshot of `product` for `stock_id`, cached on the product.
    pub fn source_snapshot(&self, product: &Product, stock_id: StockId) -> LookupResult<Arc<SourceSnapshot>> {
        let services = self
            .capability
            .services()
            .ok_or_else(|| LookupError::unavailable("multi-source inventory"))?;
        let source_items = services
            .source_items
            .as_deref()
            .ok_or_else(|| LookupError::unavailable("source items lookup"))?;

        fetch_source_snapshot(
            product,
            stock_id,
            &self.topology,
            services.stock_source_links.as_deref(),
            source_items,
        )
    }

    /// Status of every source of the store's stock, regardless of usable sources.
    ///
    /// Empty whenever the statuses cannot be determined.
    pub fn source_statuses(&self, product: &Product, store: &Store) -> Arc<SourceSnapshot> {
        match self.try_source_statuses(product, store) {
            Ok(statuses) => statuses,
            Err(e) => {
                tracing::debug!(
                    sku = product.sku(),
                    store_id = %store.id(),
                    error = %e,
                    "source statuses unavailable"
                );
                Arc::new(SourceSnapshot::new())
            }
        }
    }

    /// Forget the cached website/stock/source links.
    pub fn reset_topology(&self) {
        self.topology.reset();
    }

    /// Probe the multi-source subsystem again on next use.
    pub fn reset_capability(&self) {
        self.capability.reset();
    }

    fn try_source_statuses(&self, product: &Product, store: &Store) -> LookupResult<Arc<SourceSnapshot>> {
        let services = self
            .capability
            .services()
            .ok_or_else(|| LookupError::unavailable("multi-source inventory"))?;
        let services = services
            .reporting()
            .ok_or_else(|| LookupError::unavailable("source reporting services"))?;

        let stock_id = self.topology.stock_id(services.stock_resolver, store.website())?;
        fetch_source_snapshot(
            product,
            stock_id,
            &self.topology,
            services.stock_source_links,
            services.source_items,
        )
    }

    fn resolve_legacy(&self, product: &Product, store: &Store) -> ResolvedStock {
        let mut item = self.legacy.stock_item(product.id(), store.website_id());
        // Inherited values are store-scoped.
        item.set_store_id(store.base_store_id());

        if item.manages_stock(self.legacy.as_ref()) {
            ResolvedStock {
                quantity: Some(item.qty),
                in_stock: item.is_in_stock,
            }
        } else {
            ResolvedStock::unlimited()
        }
    }
}

impl core::fmt::Debug for QtyResolver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("QtyResolver")
            .field("capability", &self.capability)
            .field("topology", &self.topology)
            .field("usable_sources", &self.usable_sources)
            .finish_non_exhaustive()
    }
}

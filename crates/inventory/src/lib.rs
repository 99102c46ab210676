//! Multi-source stock resolution.
//!
//! Resolves the quantity and in-stock status of a product for a store by
//! aggregating the inventory sources linked to the store's stock, and falls back
//! to the legacy single-source stock item whenever multi-source data cannot be
//! used. No IO happens here: every lookup goes through the collaborator traits
//! in [`lookup`] and [`legacy`].

pub mod aggregator;
pub mod capability;
pub mod catalog;
pub mod in_memory;
pub mod legacy;
pub mod lookup;
pub mod resolver;
pub mod snapshot_cache;
pub mod source;
pub mod topology;
pub mod usable;

pub use aggregator::{QuantityType, StockData};
pub use capability::{Capability, CapabilityGate, CapabilityProbe, MultiSourceServices, REQUIRED_MODULES};
pub use catalog::{Product, Store, Website};
pub use legacy::{Backorders, LegacyStockItem, LegacyStockRegistry};
pub use lookup::{
    ReservationsQuantity, SourceItemsBySku, StockItemConfiguration, StockItemConfigurationLookup,
    StockResolver, StockSourceLinks,
};
pub use resolver::{QtyResolver, ResolvedStock};
pub use snapshot_cache::SourceSnapshotCache;
pub use source::{SourceItem, SourceItemStatus, SourceSnapshot, SourceStatus};
pub use topology::TopologyCache;
pub use usable::{SourceSelection, UsableSourceFilter};

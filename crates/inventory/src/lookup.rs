//! Multi-source inventory lookups consumed by the resolver.
//!
//! Implementations wrap whatever backs the inventory (database, remote API, ...).
//! They are plain synchronous calls; any failure is reported as a [`LookupError`](stockfeed_core::LookupError)
//! and handled by the caller, never retried here.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockfeed_core::{LookupResult, SourceCode, StockId};

use crate::catalog::Website;
use crate::source::SourceItem;

/// Resolves the stock linked to a website.
pub trait StockResolver: Send + Sync {
    /// Fails with [`LookupError::NotFound`](stockfeed_core::LookupError::NotFound) when no stock is linked to the website.
    fn stock_for_website(&self, website: &Website) -> LookupResult<StockId>;
}

/// Lists the sources linked to a stock.
pub trait StockSourceLinks: Send + Sync {
    fn source_codes(&self, stock_id: StockId) -> LookupResult<Vec<SourceCode>>;
}

/// Lists the source items of a SKU, across all sources.
pub trait SourceItemsBySku: Send + Sync {
    fn source_items(&self, sku: &str) -> LookupResult<Vec<SourceItem>>;
}

/// Per-(SKU, stock) inventory configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockItemConfiguration {
    pub manage_stock: bool,
    /// Quantity below which the item is considered out of stock.
    pub min_qty: Decimal,
}

impl Default for StockItemConfiguration {
    fn default() -> Self {
        Self {
            manage_stock: true,
            min_qty: Decimal::ZERO,
        }
    }
}

pub trait StockItemConfigurationLookup: Send + Sync {
    /// Fails with [`LookupError::SkuNotAssignedToStock`](stockfeed_core::LookupError::SkuNotAssignedToStock) when the SKU is not part of the stock.
    fn configuration(&self, sku: &str, stock_id: StockId) -> LookupResult<StockItemConfiguration>;
}

/// Sum of the outstanding reservations of a SKU on a stock.
///
/// Reservations are signed: pending orders are recorded as negative quantities.
pub trait ReservationsQuantity: Send + Sync {
    fn reserved_quantity(&self, sku: &str, stock_id: StockId) -> LookupResult<Decimal>;
}

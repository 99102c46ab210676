use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use stockfeed_core::{LookupResult, StockId};

use crate::catalog::Product;
use crate::lookup::{SourceItemsBySku, StockSourceLinks};
use crate::source::SourceSnapshot;
use crate::topology::TopologyCache;

/// Per-product memo of source snapshots, keyed by stock.
///
/// Compute-or-fetch contract: the first successful computation for a stock is
/// kept and every later request for that stock returns the same snapshot.
/// Failed computations are not memoized.
#[derive(Debug, Default)]
pub struct SourceSnapshotCache {
    by_stock: RwLock<HashMap<StockId, Arc<SourceSnapshot>>>,
}

impl SourceSnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, stock_id: StockId) -> Option<Arc<SourceSnapshot>> {
        let map = self.by_stock.read().unwrap_or_else(PoisonError::into_inner);
        map.get(&stock_id).cloned()
    }

    /// Return the snapshot for `stock_id`, computing it with `compute` on a miss.
    ///
    /// `compute` runs without any lock held. If two callers race on the same stock,
    /// the first inserted snapshot wins and is returned to both.
    pub fn get_or_try_insert_with<F>(&self, stock_id: StockId, compute: F) -> LookupResult<Arc<SourceSnapshot>>
    where
        F: FnOnce() -> LookupResult<SourceSnapshot>,
    {
        if let Some(snapshot) = self.get(stock_id) {
            return Ok(snapshot);
        }

        let computed = Arc::new(compute()?);
        let mut map = self.by_stock.write().unwrap_or_else(PoisonError::into_inner);
        Ok(map.entry(stock_id).or_insert(computed).clone())
    }

    pub fn clear(&self) {
        self.by_stock.write().unwrap_or_else(PoisonError::into_inner).clear();
    }

    pub fn len(&self) -> usize {
        self.by_stock.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fetch the source snapshot of `product` for `stock_id`, through the product's cache.
///
/// The source items of the SKU are only looked up when the stock has linked sources.
pub(crate) fn fetch_source_snapshot(
    product: &Product,
    stock_id: StockId,
    topology: &TopologyCache,
    links: Option<&dyn StockSourceLinks>,
    items: &dyn SourceItemsBySku,
) -> LookupResult<Arc<SourceSnapshot>> {
    product.source_cache().get_or_try_insert_with(stock_id, || {
        let stock_sources = topology.stock_source_codes(links, stock_id)?;
        if stock_sources.is_empty() {
            tracing::debug!(sku = product.sku(), %stock_id, "stock has no linked sources");
            return Ok(SourceSnapshot::new());
        }

        let source_items = items.source_items(product.sku())?;
        let snapshot = SourceSnapshot::from_items(source_items, &stock_sources);
        tracing::debug!(
            sku = product.sku(),
            %stock_id,
            sources = snapshot.len(),
            "source snapshot populated"
        );
        Ok(snapshot)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use rust_decimal::Decimal;
    use stockfeed_core::{LookupError, SourceCode};

    use crate::source::SourceStatus;

    fn snapshot_with(code: &str, qty: i64) -> SourceSnapshot {
        [(
            SourceCode::new(code).unwrap(),
            SourceStatus {
                in_stock: qty > 0,
                quantity: Decimal::from(qty),
            },
        )]
        .into_iter()
        .collect()
    }

    #[test]
    fn computes_once_per_stock() {
        let cache = SourceSnapshotCache::new();
        let calls = Cell::new(0);

        for _ in 0..3 {
            let snapshot = cache
                .get_or_try_insert_with(StockId::new(1), || {
                    calls.set(calls.get() + 1);
                    Ok(snapshot_with("x", 4))
                })
                .unwrap();
            assert_eq!(snapshot.get("x").unwrap().quantity, Decimal::from(4));
        }

        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn stocks_are_cached_independently() {
        let cache = SourceSnapshotCache::new();
        cache.get_or_try_insert_with(StockId::new(1), || Ok(snapshot_with("x", 1))).unwrap();
        cache.get_or_try_insert_with(StockId::new(2), || Ok(snapshot_with("y", 2))).unwrap();

        assert_eq!(cache.len(), 2);
        assert!(cache.get(StockId::new(1)).unwrap().contains("x"));
        assert!(cache.get(StockId::new(2)).unwrap().contains("y"));
    }

    #[test]
    fn failures_are_not_memoized() {
        let cache = SourceSnapshotCache::new();
        let err = cache
            .get_or_try_insert_with(StockId::new(1), || Err(LookupError::backend("down")))
            .unwrap_err();
        assert_eq!(err, LookupError::backend("down"));
        assert!(cache.is_empty());

        let snapshot = cache
            .get_or_try_insert_with(StockId::new(1), || Ok(snapshot_with("x", 3)))
            .unwrap();
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn clear_forgets_snapshots() {
        let cache = SourceSnapshotCache::new();
        cache.get_or_try_insert_with(StockId::new(1), || Ok(SourceSnapshot::new())).unwrap();
        cache.clear();
        assert!(cache.get(StockId::new(1)).is_none());
    }
}

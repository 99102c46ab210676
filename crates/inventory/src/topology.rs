//! Process-lifetime caches of the stock topology (website -> stock -> sources).
//!
//! The topology is assumed stable while a resolver is alive. Call
//! [`TopologyCache::reset`] when stocks or source links are edited at runtime.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use stockfeed_core::{LookupError, LookupResult, SourceCode, StockId, WebsiteId};

use crate::catalog::Website;
use crate::lookup::{StockResolver, StockSourceLinks};

#[derive(Debug, Default)]
pub struct TopologyCache {
    /// `None` records a website known to have no linked stock.
    website_stocks: RwLock<HashMap<WebsiteId, Option<StockId>>>,
    stock_sources: RwLock<HashMap<StockId, Arc<[SourceCode]>>>,
}

impl TopologyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stock linked to `website`.
    ///
    /// Both outcomes of the resolver are cached: a linked stock, and the absence of
    /// one (reported as [`LookupError::NotFound`] on every call). Other failures are
    /// returned as-is and retried on the next call.
    pub fn stock_id(&self, resolver: &dyn StockResolver, website: &Website) -> LookupResult<StockId> {
        let cached = self
            .website_stocks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&website.id)
            .copied();

        let stock_id = match cached {
            Some(stock_id) => stock_id,
            None => {
                let resolved = match resolver.stock_for_website(website) {
                    Ok(stock_id) => Some(stock_id),
                    Err(LookupError::NotFound(_)) => None,
                    Err(e) => return Err(e),
                };
                self.website_stocks
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(website.id, resolved);
                resolved
            }
        };

        stock_id.ok_or_else(|| LookupError::not_found(format!("no stock linked to website '{}'", website.code)))
    }

    /// Source codes linked to `stock_id`.
    ///
    /// Without a source-link lookup the stock is treated (and cached) as having no sources.
    pub fn stock_source_codes(
        &self,
        links: Option<&dyn StockSourceLinks>,
        stock_id: StockId,
    ) -> LookupResult<Arc<[SourceCode]>> {
        if let Some(codes) = self
            .stock_sources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&stock_id)
        {
            return Ok(codes.clone());
        }

        let codes: Arc<[SourceCode]> = match links {
            Some(links) => links.source_codes(stock_id)?.into(),
            None => Arc::from(Vec::new()),
        };

        let mut map = self.stock_sources.write().unwrap_or_else(PoisonError::into_inner);
        Ok(map.entry(stock_id).or_insert(codes).clone())
    }

    /// Forget every cached link.
    pub fn reset(&self) {
        self.website_stocks.write().unwrap_or_else(PoisonError::into_inner).clear();
        self.stock_sources.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingResolver {
        answer: LookupResult<StockId>,
        calls: AtomicUsize,
    }

    impl StockResolver for CountingResolver {
        fn stock_for_website(&self, _website: &Website) -> LookupResult<StockId> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.clone()
        }
    }

    struct CountingLinks {
        calls: AtomicUsize,
    }

    impl StockSourceLinks for CountingLinks {
        fn source_codes(&self, _stock_id: StockId) -> LookupResult<Vec<SourceCode>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![SourceCode::new("x").unwrap()])
        }
    }

    fn website() -> Website {
        Website::new(WebsiteId::new(1), "base")
    }

    #[test]
    fn linked_stock_is_resolved_once() {
        let cache = TopologyCache::new();
        let resolver = CountingResolver {
            answer: Ok(StockId::new(3)),
            calls: AtomicUsize::new(0),
        };

        assert_eq!(cache.stock_id(&resolver, &website()).unwrap(), StockId::new(3));
        assert_eq!(cache.stock_id(&resolver, &website()).unwrap(), StockId::new(3));
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn missing_stock_is_cached_as_not_found() {
        let cache = TopologyCache::new();
        let resolver = CountingResolver {
            answer: Err(LookupError::not_found("stock")),
            calls: AtomicUsize::new(0),
        };

        for _ in 0..2 {
            let err = cache.stock_id(&resolver, &website()).unwrap_err();
            assert!(matches!(err, LookupError::NotFound(_)));
        }
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn backend_failures_are_retried() {
        let cache = TopologyCache::new();
        let resolver = CountingResolver {
            answer: Err(LookupError::backend("timeout")),
            calls: AtomicUsize::new(0),
        };

        assert!(cache.stock_id(&resolver, &website()).is_err());
        assert!(cache.stock_id(&resolver, &website()).is_err());
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn source_codes_are_cached_until_reset() {
        let cache = TopologyCache::new();
        let links = CountingLinks {
            calls: AtomicUsize::new(0),
        };

        cache.stock_source_codes(Some(&links), StockId::new(1)).unwrap();
        cache.stock_source_codes(Some(&links), StockId::new(1)).unwrap();
        assert_eq!(links.calls.load(Ordering::SeqCst), 1);

        cache.reset();
        let codes = cache.stock_source_codes(Some(&links), StockId::new(1)).unwrap();
        assert_eq!(codes.len(), 1);
        assert_eq!(links.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn missing_link_lookup_means_no_sources() {
        let cache = TopologyCache::new();
        assert!(cache.stock_source_codes(None, StockId::new(1)).unwrap().is_empty());
    }
}

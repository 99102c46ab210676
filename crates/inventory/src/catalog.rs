//! Catalog-side inputs of a resolution: the product and the store it is resolved for.

use stockfeed_core::{ProductId, StoreId, WebsiteId};

use crate::snapshot_cache::SourceSnapshotCache;

/// A catalog product, together with the source snapshots computed for it.
///
/// The snapshot cache lives exactly as long as the product instance: build a new
/// `Product` (or call [`SourceSnapshotCache::clear`]) to observe fresh source data.
#[derive(Debug)]
pub struct Product {
    id: ProductId,
    sku: String,
    sources: SourceSnapshotCache,
}

impl Product {
    pub fn new(id: ProductId, sku: impl Into<String>) -> Self {
        Self {
            id,
            sku: sku.into(),
            sources: SourceSnapshotCache::new(),
        }
    }

    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn source_cache(&self) -> &SourceSnapshotCache {
        &self.sources
    }
}

/// Website a store belongs to. Stocks are linked to websites by code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Website {
    pub id: WebsiteId,
    pub code: String,
}

impl Website {
    pub fn new(id: WebsiteId, code: impl Into<String>) -> Self {
        Self {
            id,
            code: code.into(),
        }
    }
}

/// A sales channel resolved against one website.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    id: StoreId,
    website: Website,
    base_store_id: StoreId,
}

impl Store {
    pub fn new(id: StoreId, website: Website, base_store_id: StoreId) -> Self {
        Self {
            id,
            website,
            base_store_id,
        }
    }

    pub fn id(&self) -> StoreId {
        self.id
    }

    pub fn website(&self) -> &Website {
        &self.website
    }

    pub fn website_id(&self) -> WebsiteId {
        self.website.id
    }

    /// Default store view of the store's website; scope of store-level configuration values.
    pub fn base_store_id(&self) -> StoreId {
        self.base_store_id
    }
}

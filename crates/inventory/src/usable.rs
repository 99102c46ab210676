use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

use stockfeed_core::{SourceCode, StoreId};

/// Which sources of a stock count toward a store's main quantity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SourceSelection {
    #[default]
    All,
    Only(Arc<HashSet<SourceCode>>),
}

impl SourceSelection {
    pub fn only<I>(codes: I) -> Self
    where
        I: IntoIterator<Item = SourceCode>,
    {
        Self::Only(Arc::new(codes.into_iter().collect()))
    }

    pub fn contains(&self, code: &str) -> bool {
        match self {
            SourceSelection::All => true,
            SourceSelection::Only(codes) => codes.contains(code),
        }
    }
}

/// Per-store usable-source restrictions.
///
/// Stores that were never configured use every source of their stock.
#[derive(Debug, Default)]
pub struct UsableSourceFilter {
    by_store: RwLock<HashMap<StoreId, SourceSelection>>,
}

impl UsableSourceFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the restriction of `store_id`. `None` lifts any restriction.
    pub fn set<I>(&self, store_id: StoreId, codes: Option<I>)
    where
        I: IntoIterator<Item = SourceCode>,
    {
        let selection = codes.map_or(SourceSelection::All, SourceSelection::only);
        self.by_store
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(store_id, selection);
    }

    pub fn selection(&self, store_id: StoreId) -> SourceSelection {
        self.by_store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&store_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_usable(&self, store_id: StoreId, code: &str) -> bool {
        self.selection(store_id).contains(code)
    }
}

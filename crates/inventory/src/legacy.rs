//! Legacy single-source stock items, the universal fallback.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockfeed_core::{ProductId, StoreId, WebsiteId};

/// Backorder policy of a legacy stock item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backorders {
    #[default]
    No,
    YesNoNotify,
    YesNotify,
}

impl Backorders {
    pub fn allows_backorders(self) -> bool {
        matches!(self, Backorders::YesNoNotify | Backorders::YesNotify)
    }
}

/// Single-source stock record of a product on a website.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyStockItem {
    pub product_id: ProductId,
    pub website_id: WebsiteId,
    pub qty: Decimal,
    pub is_in_stock: bool,
    /// `None` inherits the store-scoped default from the registry.
    pub manage_stock: Option<bool>,
    pub backorders: Backorders,
    #[serde(default)]
    store_id: Option<StoreId>,
}

impl LegacyStockItem {
    pub fn new(product_id: ProductId, website_id: WebsiteId) -> Self {
        Self {
            product_id,
            website_id,
            qty: Decimal::ZERO,
            is_in_stock: false,
            manage_stock: None,
            backorders: Backorders::No,
            store_id: None,
        }
    }

    pub fn with_qty(mut self, qty: Decimal, is_in_stock: bool) -> Self {
        self.qty = qty;
        self.is_in_stock = is_in_stock;
        self
    }

    pub fn with_manage_stock(mut self, manage_stock: bool) -> Self {
        self.manage_stock = Some(manage_stock);
        self
    }

    pub fn with_backorders(mut self, backorders: Backorders) -> Self {
        self.backorders = backorders;
        self
    }

    /// Store whose configuration scope applies to inherited values.
    pub fn store_id(&self) -> Option<StoreId> {
        self.store_id
    }

    pub fn set_store_id(&mut self, store_id: StoreId) {
        self.store_id = Some(store_id);
    }

    pub fn manages_stock(&self, registry: &dyn LegacyStockRegistry) -> bool {
        self.manage_stock
            .unwrap_or_else(|| registry.default_manage_stock(self.store_id))
    }
}

/// Source of legacy stock items. Always available.
pub trait LegacyStockRegistry: Send + Sync {
    fn stock_item(&self, product_id: ProductId, website_id: WebsiteId) -> LegacyStockItem;

    /// Manage-stock setting inherited by items without their own, for a store scope
    /// (`None` is the global scope).
    fn default_manage_stock(&self, store_id: Option<StoreId>) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Defaults;

    impl LegacyStockRegistry for Defaults {
        fn stock_item(&self, product_id: ProductId, website_id: WebsiteId) -> LegacyStockItem {
            LegacyStockItem::new(product_id, website_id)
        }

        fn default_manage_stock(&self, store_id: Option<StoreId>) -> bool {
            store_id != Some(StoreId::new(2))
        }
    }

    #[test]
    fn backorder_policies() {
        assert!(!Backorders::No.allows_backorders());
        assert!(Backorders::YesNoNotify.allows_backorders());
        assert!(Backorders::YesNotify.allows_backorders());
    }

    #[test]
    fn explicit_manage_stock_wins() {
        let item = LegacyStockItem::new(ProductId::new(1), WebsiteId::new(1)).with_manage_stock(false);
        assert!(!item.manages_stock(&Defaults));
    }

    #[test]
    fn inherited_manage_stock_follows_store_scope() {
        let mut item = LegacyStockItem::new(ProductId::new(1), WebsiteId::new(1));
        assert!(item.manages_stock(&Defaults));

        item.set_store_id(StoreId::new(2));
        assert_eq!(item.store_id(), Some(StoreId::new(2)));
        assert!(!item.manages_stock(&Defaults));
    }
}

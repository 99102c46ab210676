//! In-memory inventory collaborators for tests/dev.
//!
//! Every lookup can be made to fail through [`InMemoryInventory::fail`], and
//! every call is counted so callers can assert on caching behaviour.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use rust_decimal::Decimal;

use stockfeed_core::{LookupError, LookupResult, ProductId, SourceCode, StockId, StoreId, WebsiteId};

use crate::capability::{CapabilityProbe, REQUIRED_MODULES};
use crate::catalog::Website;
use crate::legacy::{LegacyStockItem, LegacyStockRegistry};
use crate::lookup::{
    ReservationsQuantity, SourceItemsBySku, StockItemConfiguration, StockItemConfigurationLookup, StockResolver,
    StockSourceLinks,
};
use crate::source::{SourceItem, SourceItemStatus};

/// Multi-source services, by name.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Service {
    StockResolver,
    StockItemConfiguration,
    StockSourceLinks,
    SourceItems,
    Reservations,
}

type SkuStockKey = (String, StockId);

/// In-memory multi-source inventory.
///
/// SKUs without a configuration for a stock are reported as not assigned to it.
#[derive(Debug, Default)]
pub struct InMemoryInventory {
    website_stocks: RwLock<HashMap<String, StockId>>,
    stock_sources: RwLock<HashMap<StockId, Vec<SourceCode>>>,
    source_items: RwLock<HashMap<String, Vec<SourceItem>>>,
    configurations: RwLock<HashMap<SkuStockKey, StockItemConfiguration>>,
    reservations: RwLock<HashMap<SkuStockKey, Decimal>>,
    failures: RwLock<HashMap<Service, LookupError>>,
    calls: Mutex<HashMap<Service, usize>>,
}

impl InMemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn link_website(&self, website_code: &str, stock_id: StockId) -> &Self {
        write(&self.website_stocks).insert(website_code.to_string(), stock_id);
        self
    }

    pub fn link_source(&self, stock_id: StockId, code: SourceCode) -> &Self {
        write(&self.stock_sources).entry(stock_id).or_default().push(code);
        self
    }

    /// Insert or replace the item of `sku` on `code`.
    pub fn set_source_item(&self, sku: &str, code: SourceCode, status: SourceItemStatus, quantity: Decimal) -> &Self {
        let mut items = write(&self.source_items);
        let sku_items = items.entry(sku.to_string()).or_default();
        sku_items.retain(|item| item.source_code != code);
        sku_items.push(SourceItem::new(code, status, quantity));
        self
    }

    pub fn configure(&self, sku: &str, stock_id: StockId, configuration: StockItemConfiguration) -> &Self {
        write(&self.configurations).insert((sku.to_string(), stock_id), configuration);
        self
    }

    pub fn reserve(&self, sku: &str, stock_id: StockId, quantity: Decimal) -> &Self {
        *write(&self.reservations)
            .entry((sku.to_string(), stock_id))
            .or_insert(Decimal::ZERO) += quantity;
        self
    }

    /// Make every call to `service` fail with `error`.
    pub fn fail(&self, service: Service, error: LookupError) -> &Self {
        write(&self.failures).insert(service, error);
        self
    }

    pub fn recover(&self, service: Service) -> &Self {
        write(&self.failures).remove(&service);
        self
    }

    /// Number of calls made to `service` so far.
    pub fn calls(&self, service: Service) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&service)
            .copied()
            .unwrap_or(0)
    }

    fn enter(&self, service: Service) -> LookupResult<()> {
        *self
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(service)
            .or_insert(0) += 1;

        match read(&self.failures).get(&service) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl StockResolver for InMemoryInventory {
    fn stock_for_website(&self, website: &Website) -> LookupResult<StockId> {
        self.enter(Service::StockResolver)?;
        read(&self.website_stocks)
            .get(&website.code)
            .copied()
            .ok_or_else(|| LookupError::not_found(format!("no stock linked to website '{}'", website.code)))
    }
}

impl StockSourceLinks for InMemoryInventory {
    fn source_codes(&self, stock_id: StockId) -> LookupResult<Vec<SourceCode>> {
        self.enter(Service::StockSourceLinks)?;
        Ok(read(&self.stock_sources).get(&stock_id).cloned().unwrap_or_default())
    }
}

impl SourceItemsBySku for InMemoryInventory {
    fn source_items(&self, sku: &str) -> LookupResult<Vec<SourceItem>> {
        self.enter(Service::SourceItems)?;
        Ok(read(&self.source_items).get(sku).cloned().unwrap_or_default())
    }
}

impl StockItemConfigurationLookup for InMemoryInventory {
    fn configuration(&self, sku: &str, stock_id: StockId) -> LookupResult<StockItemConfiguration> {
        self.enter(Service::StockItemConfiguration)?;
        read(&self.configurations)
            .get(&(sku.to_string(), stock_id))
            .copied()
            .ok_or_else(|| LookupError::sku_not_assigned(sku, stock_id))
    }
}

impl ReservationsQuantity for InMemoryInventory {
    fn reserved_quantity(&self, sku: &str, stock_id: StockId) -> LookupResult<Decimal> {
        self.enter(Service::Reservations)?;
        Ok(read(&self.reservations)
            .get(&(sku.to_string(), stock_id))
            .copied()
            .unwrap_or(Decimal::ZERO))
    }
}

/// Capability probe over an [`InMemoryInventory`].
#[derive(Debug)]
pub struct StaticProbe {
    inventory: Arc<InMemoryInventory>,
    enabled: bool,
    missing: HashSet<Service>,
}

impl StaticProbe {
    /// All modules enabled, every service backed by `inventory`.
    pub fn enabled(inventory: Arc<InMemoryInventory>) -> Self {
        Self {
            inventory,
            enabled: true,
            missing: HashSet::new(),
        }
    }

    /// Required modules disabled.
    pub fn disabled() -> Self {
        Self {
            inventory: Arc::new(InMemoryInventory::new()),
            enabled: false,
            missing: HashSet::new(),
        }
    }

    /// Report `service` as not installed.
    pub fn without(mut self, service: Service) -> Self {
        self.missing.insert(service);
        self
    }

    fn handle(&self, service: Service) -> LookupResult<Arc<InMemoryInventory>> {
        if self.missing.contains(&service) {
            return Err(LookupError::unavailable(format!("{service:?} not installed")));
        }
        Ok(self.inventory.clone())
    }
}

impl CapabilityProbe for StaticProbe {
    fn is_module_enabled(&self, module: &str) -> bool {
        self.enabled && REQUIRED_MODULES.iter().any(|required| *required == module)
    }

    fn stock_resolver(&self) -> LookupResult<Arc<dyn StockResolver>> {
        Ok(self.handle(Service::StockResolver)?)
    }

    fn stock_item_configuration(&self) -> LookupResult<Arc<dyn StockItemConfigurationLookup>> {
        Ok(self.handle(Service::StockItemConfiguration)?)
    }

    fn stock_source_links(&self) -> LookupResult<Arc<dyn StockSourceLinks>> {
        Ok(self.handle(Service::StockSourceLinks)?)
    }

    fn source_items(&self) -> LookupResult<Arc<dyn SourceItemsBySku>> {
        Ok(self.handle(Service::SourceItems)?)
    }

    fn reservations(&self) -> LookupResult<Arc<dyn ReservationsQuantity>> {
        Ok(self.handle(Service::Reservations)?)
    }
}

/// In-memory legacy stock registry.
///
/// Products without a stored item get a blank, out-of-stock item that inherits
/// manage-stock from configuration.
#[derive(Debug)]
pub struct InMemoryLegacyRegistry {
    items: RwLock<HashMap<(ProductId, WebsiteId), LegacyStockItem>>,
    default_manage_stock: bool,
    store_manage_stock: RwLock<HashMap<StoreId, bool>>,
    lookups: Mutex<usize>,
}

impl InMemoryLegacyRegistry {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            default_manage_stock: true,
            store_manage_stock: RwLock::new(HashMap::new()),
            lookups: Mutex::new(0),
        }
    }

    pub fn insert(&self, item: LegacyStockItem) -> &Self {
        write(&self.items).insert((item.product_id, item.website_id), item);
        self
    }

    /// Store-scoped manage-stock default.
    pub fn set_store_manage_stock(&self, store_id: StoreId, manage_stock: bool) -> &Self {
        write(&self.store_manage_stock).insert(store_id, manage_stock);
        self
    }

    pub fn lookups(&self) -> usize {
        *self.lookups.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryLegacyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LegacyStockRegistry for InMemoryLegacyRegistry {
    fn stock_item(&self, product_id: ProductId, website_id: WebsiteId) -> LegacyStockItem {
        *self.lookups.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        read(&self.items)
            .get(&(product_id, website_id))
            .cloned()
            .unwrap_or_else(|| LegacyStockItem::new(product_id, website_id))
    }

    fn default_manage_stock(&self, store_id: Option<StoreId>) -> bool {
        store_id
            .and_then(|id| read(&self.store_manage_stock).get(&id).copied())
            .unwrap_or(self.default_manage_stock)
    }
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

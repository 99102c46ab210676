use std::sync::Arc;

use serde_json::{Map, Value};

use stockfeed_inventory::{Product, QtyResolver, Store};

use crate::config::{StockSectionConfig, StoreConfigRegistry};
use crate::fields;

/// Builds the stock section of a product's feed data.
#[derive(Debug)]
pub struct StockSectionAdapter {
    resolver: Arc<QtyResolver>,
    configs: StoreConfigRegistry,
}

impl StockSectionAdapter {
    pub fn new(resolver: Arc<QtyResolver>, configs: StoreConfigRegistry) -> Self {
        Self { resolver, configs }
    }

    pub fn resolver(&self) -> &QtyResolver {
        &self.resolver
    }

    pub fn config(&self, store: &Store) -> &StockSectionConfig {
        self.configs.get(store.id())
    }

    /// Stock fields of `product` for `store`.
    ///
    /// - `quantity` / `is-in-stock` from the store's main sources and quantity type
    /// - `<code>-quantity` / `<code>-is-in-stock` for each additional source linked
    ///   to the store's stock, in configured order; other codes are skipped
    pub fn product_data(&self, store: &Store, product: &Product) -> Map<String, Value> {
        let config = self.config(store);
        self.resolver
            .set_usable_sources(store, config.main_sources.clone());

        let resolved = self.resolver.resolve(product, store, config.quantity_type);

        let mut data = Map::new();
        data.insert(fields::QUANTITY.to_string(), fields::optional_quantity_value(resolved.quantity));
        data.insert(fields::IS_IN_STOCK.to_string(), fields::flag_value(resolved.in_stock));

        if config.additional_sources.is_empty() {
            return data;
        }

        let statuses = self.resolver.source_statuses(product, store);
        for code in &config.additional_sources {
            match statuses.get(code.as_str()) {
                Some(status) => {
                    data.insert(fields::source_quantity_key(code), fields::quantity_value(status.quantity));
                    data.insert(fields::source_is_in_stock_key(code), fields::flag_value(status.in_stock));
                }
                None => {
                    tracing::debug!(
                        sku = product.sku(),
                        store_id = %store.id(),
                        source = %code,
                        "additional source not reported"
                    );
                }
            }
        }

        data
    }
}

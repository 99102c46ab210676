//! Multi-source quantity aggregation.

use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockfeed_core::{DomainError, LookupError, LookupResult};

use crate::capability::AggregationServices;
use crate::catalog::{Product, Store};
use crate::snapshot_cache::fetch_source_snapshot;
use crate::source::SourceSnapshot;
use crate::topology::TopologyCache;
use crate::usable::{SourceSelection, UsableSourceFilter};

/// Which quantity is reported for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantityType {
    /// Physical quantity of the usable sources.
    #[default]
    Stock,
    /// Stock quantity minus the minimum threshold and reservations.
    Salable,
    /// Lower of the stock and salable quantities.
    Minimum,
    /// Higher of the stock and salable quantities.
    Maximum,
}

impl QuantityType {
    pub fn as_str(self) -> &'static str {
        match self {
            QuantityType::Stock => "stock",
            QuantityType::Salable => "salable",
            QuantityType::Minimum => "minimum",
            QuantityType::Maximum => "maximum",
        }
    }

    /// Pick the reported quantity. Neither input is clamped.
    pub fn select(self, stock_quantity: Decimal, salable_quantity: Decimal) -> Decimal {
        match self {
            QuantityType::Stock => stock_quantity,
            QuantityType::Salable => salable_quantity,
            QuantityType::Minimum => salable_quantity.min(stock_quantity),
            QuantityType::Maximum => salable_quantity.max(stock_quantity),
        }
    }
}

impl core::fmt::Display for QuantityType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuantityType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "stock" => Ok(QuantityType::Stock),
            "salable" => Ok(QuantityType::Salable),
            "minimum" => Ok(QuantityType::Minimum),
            "maximum" => Ok(QuantityType::Maximum),
            other => Err(DomainError::validation(format!("unknown quantity type '{other}'"))),
        }
    }
}

/// Outcome of the multi-source path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockData {
    /// Multi-source data gave a definitive answer.
    Definite { in_stock: bool, quantity: Decimal },
    /// Stock is not managed for the SKU: unlimited and always in stock.
    Unmanaged,
    /// Multi-source data cannot be used; the legacy stock item must be consulted.
    Unavailable,
}

impl StockData {
    pub fn definite(quantity: Decimal) -> Self {
        StockData::Definite {
            in_stock: quantity > Decimal::ZERO,
            quantity,
        }
    }

    pub fn out_of_stock() -> Self {
        StockData::Definite {
            in_stock: false,
            quantity: Decimal::ZERO,
        }
    }
}

/// Sum of the quantities of the selected sources, `None` on overflow.
pub fn stock_quantity(snapshot: &SourceSnapshot, selection: &SourceSelection) -> Option<Decimal> {
    snapshot
        .iter()
        .filter(|(code, _)| selection.contains(code.as_str()))
        .try_fold(Decimal::ZERO, |total, (_, status)| total.checked_add(status.quantity))
}

/// Stock quantity minus the minimum threshold and the (signed) reserved quantity.
///
/// `None` on overflow.
pub fn salable_quantity(stock_quantity: Decimal, min_qty: Decimal, reserved: Decimal) -> Option<Decimal> {
    stock_quantity.checked_sub(min_qty)?.checked_sub(reserved)
}

fn quantity_overflow() -> LookupError {
    LookupError::backend("quantity overflow")
}

pub(crate) struct MultiSourceAggregator<'a> {
    pub services: AggregationServices<'a>,
    pub topology: &'a TopologyCache,
    pub usable_sources: &'a UsableSourceFilter,
}

impl MultiSourceAggregator<'_> {
    /// Compute the multi-source stock data of `product` for `store`.
    ///
    /// A SKU that is not assigned to the store's stock is definitively out of stock.
    /// Any other lookup failure makes the data unavailable.
    pub fn compute(&self, product: &Product, store: &Store, quantity_type: QuantityType) -> StockData {
        match self.try_compute(product, store, quantity_type) {
            Ok(data) => data,
            Err(e) if e.is_sku_not_assigned() => {
                tracing::debug!(sku = product.sku(), store_id = %store.id(), "sku not assigned to stock");
                StockData::out_of_stock()
            }
            Err(e) => {
                tracing::warn!(
                    sku = product.sku(),
                    store_id = %store.id(),
                    error = %e,
                    "multi-source lookup failed"
                );
                StockData::Unavailable
            }
        }
    }

    fn try_compute(&self, product: &Product, store: &Store, quantity_type: QuantityType) -> LookupResult<StockData> {
        let sku = product.sku();
        let stock_id = self
            .topology
            .stock_id(self.services.stock_resolver, store.website())?;

        let configuration = self.services.stock_item_configuration.configuration(sku, stock_id)?;
        if !configuration.manage_stock {
            return Ok(StockData::Unmanaged);
        }

        let snapshot = fetch_source_snapshot(
            product,
            stock_id,
            self.topology,
            self.services.stock_source_links,
            self.services.source_items,
        )?;
        let selection = self.usable_sources.selection(store.id());
        let stock_quantity = stock_quantity(&snapshot, &selection).ok_or_else(quantity_overflow)?;

        let salable_quantity = match quantity_type {
            QuantityType::Stock => stock_quantity,
            _ => {
                let reserved = self.services.reservations.reserved_quantity(sku, stock_id)?;
                salable_quantity(stock_quantity, configuration.min_qty, reserved).ok_or_else(quantity_overflow)?
            }
        };

        Ok(StockData::definite(quantity_type.select(stock_quantity, salable_quantity)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockfeed_core::SourceCode;

    use crate::source::SourceStatus;

    fn snapshot(entries: &[(&str, bool, i64)]) -> SourceSnapshot {
        entries
            .iter()
            .map(|(code, in_stock, qty)| {
                (
                    SourceCode::new(*code).unwrap(),
                    SourceStatus {
                        in_stock: *in_stock,
                        quantity: Decimal::from(*qty),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn quantity_type_parses_and_displays() {
        assert_eq!("salable".parse::<QuantityType>().unwrap(), QuantityType::Salable);
        assert_eq!(QuantityType::Maximum.to_string(), "maximum");
        assert!("reserved".parse::<QuantityType>().is_err());
    }

    #[test]
    fn quantity_type_serializes_lowercase() {
        assert_eq!(QuantityType::Minimum.as_str(), "minimum");
        assert_eq!(QuantityType::default(), QuantityType::Stock);
    }

    #[test]
    fn selection_policies() {
        let stock = Decimal::from(5);
        let salable = Decimal::from(-2);

        assert_eq!(QuantityType::Stock.select(stock, salable), stock);
        assert_eq!(QuantityType::Salable.select(stock, salable), salable);
        assert_eq!(QuantityType::Minimum.select(stock, salable), salable);
        assert_eq!(QuantityType::Maximum.select(stock, salable), stock);
    }

    #[test]
    fn salable_quantity_is_not_clamped() {
        let salable = salable_quantity(Decimal::from(1), Decimal::from(2), Decimal::from(3));
        assert_eq!(salable, Some(Decimal::from(-4)));
    }

    #[test]
    fn negative_reservations_raise_salable_quantity() {
        let salable = salable_quantity(Decimal::from(5), Decimal::ZERO, Decimal::from(-2));
        assert_eq!(salable, Some(Decimal::from(7)));
    }

    #[test]
    fn overflowing_quantities_are_none() {
        let snap = snapshot(&[("x", true, 1), ("y", true, 1)]);
        let huge: SourceSnapshot = snap
            .iter()
            .map(|(code, status)| {
                (
                    code.clone(),
                    SourceStatus {
                        quantity: Decimal::MAX,
                        ..*status
                    },
                )
            })
            .collect();

        assert_eq!(stock_quantity(&huge, &SourceSelection::All), None);
        assert_eq!(salable_quantity(Decimal::MIN, Decimal::ONE, Decimal::ZERO), None);
        assert_eq!(salable_quantity(Decimal::MAX, Decimal::ZERO, Decimal::from(-1)), None);
    }

    #[test]
    fn stock_quantity_sums_selected_sources() {
        let snap = snapshot(&[("x", true, 5), ("y", false, 0), ("z", true, 2)]);

        assert_eq!(stock_quantity(&snap, &SourceSelection::All), Some(Decimal::from(7)));

        let only_x = SourceSelection::only([SourceCode::new("x").unwrap()]);
        assert_eq!(stock_quantity(&snap, &only_x), Some(Decimal::from(5)));
    }

    #[test]
    fn definite_stock_data_derives_status_from_sign() {
        assert_eq!(
            StockData::definite(Decimal::from(2)),
            StockData::Definite {
                in_stock: true,
                quantity: Decimal::from(2)
            }
        );
        assert_eq!(
            StockData::definite(Decimal::ZERO),
            StockData::Definite {
                in_stock: false,
                quantity: Decimal::ZERO
            }
        );
        assert_eq!(
            StockData::definite(Decimal::from(-1)),
            StockData::Definite {
                in_stock: false,
                quantity: Decimal::from(-1)
            }
        );
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn qty() -> impl Strategy<Value = Decimal> {
            (-100_000i64..100_000).prop_map(|n| Decimal::new(n, 2))
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: maximum is never below minimum, negatives included.
            #[test]
            fn maximum_is_at_least_minimum(stock in qty(), salable in qty()) {
                let max = QuantityType::Maximum.select(stock, salable);
                let min = QuantityType::Minimum.select(stock, salable);
                prop_assert!(max >= min);
            }

            /// Property: the aggregate is the sum over the selected sources only.
            #[test]
            fn aggregate_sums_selected_sources(
                sources in proptest::collection::btree_map("[a-e]", (any::<bool>(), 0i64..1_000), 0..5),
                selected in proptest::collection::btree_set("[a-e]", 0..5),
                restricted in any::<bool>(),
            ) {
                let snap: SourceSnapshot = sources
                    .iter()
                    .map(|(code, (in_stock, qty))| {
                        let quantity = if *in_stock { Decimal::from(*qty) } else { Decimal::ZERO };
                        (SourceCode::new(code.as_str()).unwrap(), SourceStatus { in_stock: *in_stock, quantity })
                    })
                    .collect();

                let selection = if restricted {
                    SourceSelection::only(selected.iter().map(|c| SourceCode::new(c.as_str()).unwrap()))
                } else {
                    SourceSelection::All
                };

                let expected: Decimal = sources
                    .iter()
                    .filter(|(code, _)| !restricted || selected.contains(*code))
                    .filter(|(_, (in_stock, _))| *in_stock)
                    .map(|(_, (_, qty))| Decimal::from(*qty))
                    .sum();

                prop_assert_eq!(stock_quantity(&snap, &selection), Some(expected));
            }

            /// Property: salable quantity is exact subtraction, never floored.
            #[test]
            fn salable_is_exact_subtraction(stock in qty(), min_qty in qty(), reserved in qty()) {
                let salable = salable_quantity(stock, min_qty, reserved).unwrap();
                prop_assert_eq!(salable + min_qty + reserved, stock);
            }
        }
    }
}

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockfeed_core::SourceCode;

/// Stock status of a source item, as stored by the source-item lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceItemStatus {
    InStock,
    OutOfStock,
}

/// Raw per-(SKU, source) inventory record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceItem {
    pub source_code: SourceCode,
    pub status: SourceItemStatus,
    pub quantity: Decimal,
}

impl SourceItem {
    pub fn new(source_code: SourceCode, status: SourceItemStatus, quantity: Decimal) -> Self {
        Self {
            source_code,
            status,
            quantity,
        }
    }
}

/// Normalized status of one source: out-of-stock sources always carry a zero quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStatus {
    pub in_stock: bool,
    pub quantity: Decimal,
}

impl SourceStatus {
    pub fn from_item(item: &SourceItem) -> Self {
        let in_stock = item.status == SourceItemStatus::InStock;
        Self {
            in_stock,
            quantity: if in_stock { item.quantity } else { Decimal::ZERO },
        }
    }
}

/// Source code -> normalized status, for the sources of one stock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSnapshot {
    entries: BTreeMap<SourceCode, SourceStatus>,
}

impl SourceSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from the items of a SKU, keeping only the sources linked to the stock.
    pub fn from_items<I>(items: I, stock_sources: &[SourceCode]) -> Self
    where
        I: IntoIterator<Item = SourceItem>,
    {
        let entries = items
            .into_iter()
            .filter(|item| stock_sources.contains(&item.source_code))
            .map(|item| {
                let status = SourceStatus::from_item(&item);
                (item.source_code, status)
            })
            .collect();

        Self { entries }
    }

    pub fn get(&self, code: &str) -> Option<&SourceStatus> {
        self.entries.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains_key(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SourceCode, &SourceStatus)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(SourceCode, SourceStatus)> for SourceSnapshot {
    fn from_iter<T: IntoIterator<Item = (SourceCode, SourceStatus)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

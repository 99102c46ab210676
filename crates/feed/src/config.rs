//! Per-store configuration of the stock section.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockfeed_core::{SourceCode, StoreId};
use stockfeed_inventory::QuantityType;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Stock section settings of one store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawStockSectionConfig")]
pub struct StockSectionConfig {
    pub quantity_type: QuantityType,
    /// Sources counted in the main quantity. `None` counts every source.
    pub main_sources: Option<Vec<SourceCode>>,
    /// Sources reported individually, in feed order.
    pub additional_sources: Vec<SourceCode>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStockSectionConfig {
    #[serde(default)]
    quantity_type: QuantityType,
    #[serde(default)]
    main_sources: Option<Vec<String>>,
    #[serde(default)]
    additional_sources: Option<Vec<String>>,
}

impl TryFrom<RawStockSectionConfig> for StockSectionConfig {
    type Error = ConfigError;

    fn try_from(raw: RawStockSectionConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            quantity_type: raw.quantity_type,
            main_sources: raw
                .main_sources
                .map(|codes| source_codes("main_sources", codes))
                .transpose()?,
            additional_sources: source_codes("additional_sources", raw.additional_sources.unwrap_or_default())?,
        })
    }
}

/// Trimmed, non-empty codes, first occurrence kept.
fn source_codes(field: &str, codes: Vec<String>) -> Result<Vec<SourceCode>, ConfigError> {
    let mut seen = HashSet::new();
    let mut result = Vec::with_capacity(codes.len());

    for (idx, code) in codes.into_iter().enumerate() {
        let code = SourceCode::new(code).map_err(|e| ConfigError::Invalid(format!("{field}[{idx}]: {e}")))?;
        if seen.insert(code.clone()) {
            result.push(code);
        }
    }

    Ok(result)
}

impl StockSectionConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawStockSectionConfig = serde_json::from_str(json)?;
        raw.try_into()
    }
}

/// Stock section settings of every configured store.
///
/// Stores without an entry use [`StockSectionConfig::default`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct StoreConfigRegistry {
    stores: HashMap<StoreId, StockSectionConfig>,
    #[serde(skip)]
    fallback: StockSectionConfig,
}

impl StoreConfigRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object keyed by store id.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn insert(&mut self, store_id: StoreId, config: StockSectionConfig) {
        self.stores.insert(store_id, config);
    }

    pub fn get(&self, store_id: StoreId) -> &StockSectionConfig {
        self.stores.get(&store_id).unwrap_or(&self.fallback)
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

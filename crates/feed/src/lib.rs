//! Stock section of the product feed.
//!
//! Turns resolved stock data into feed fields: the main quantity and status,
//! plus a quantity/status pair for every additional source a store reports.

pub mod adapter;
pub mod config;
pub mod fields;

pub use adapter::StockSectionAdapter;
pub use config::{ConfigError, StockSectionConfig, StoreConfigRegistry};

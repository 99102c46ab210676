//! `stockfeed-core`: shared identifiers and error types.
//!
//! This crate contains **pure domain** primitives (no lookups, no caching).

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult, LookupError, LookupResult};
pub use id::{ProductId, SourceCode, StockId, StoreId, WebsiteId};

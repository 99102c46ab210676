//! Error model shared by the stock resolution crates.

use thiserror::Error;

use crate::id::StockId;

/// Result type used for domain value construction.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Covers deterministic failures when building domain values (identifiers,
/// source codes). Failures of external lookups are [`LookupError`]s.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. an empty source code).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}

/// Result type returned by inventory collaborators.
pub type LookupResult<T> = Result<T, LookupError>;

/// Failure reported by an external inventory lookup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The requested record does not exist (e.g. no stock linked to a website).
    #[error("not found: {0}")]
    NotFound(String),

    /// The SKU exists but is not assigned to the requested stock.
    #[error("sku '{sku}' is not assigned to stock {stock_id}")]
    SkuNotAssignedToStock { sku: String, stock_id: StockId },

    /// The service backing the lookup is not installed or not enabled.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// Any other failure raised by the backing store.
    #[error("backend failure: {0}")]
    Backend(String),
}

impl LookupError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    pub fn sku_not_assigned(sku: impl Into<String>, stock_id: StockId) -> Self {
        Self::SkuNotAssignedToStock {
            sku: sku.into(),
            stock_id,
        }
    }

    /// Whether this is the expected "SKU not assigned to stock" condition.
    pub fn is_sku_not_assigned(&self) -> bool {
        matches!(self, Self::SkuNotAssignedToStock { .. })
    }
}

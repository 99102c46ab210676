//! Tracing and logging setup shared by the stockfeed crates.

/// Initialize process-wide logging with the default [`LogFormat`].
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init_with(LogFormat::default());
}

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use crate::tracing::{LogFormat, UnknownLogFormat, init_with};

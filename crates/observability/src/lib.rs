//! Tracing/logging setup shared by FirstShift binaries.

/// Initialize process-wide tracing/logging.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Initialize with an explicit default filter (used when `RUST_LOG` is unset).
pub fn init_with_default(directives: &str) {
    tracing::init_with_default(directives);
}

/// Subscriber configuration (filters, formatting).
pub mod tracing;

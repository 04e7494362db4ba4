//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVES: &str = "info";

pub fn init() {
    init_with_default(DEFAULT_DIRECTIVES);
}

/// JSON logs with timestamps, filtered by `RUST_LOG` or `directives`.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init_with_default(directives: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directives));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(true)
        .try_init();
}

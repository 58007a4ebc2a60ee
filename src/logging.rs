//! Logging setup based on `tracing` and `tracing-subscriber`.
//!
//! Log output goes to stderr so the CLI report on stdout stays clean.

use tracing_subscriber::{EnvFilter, fmt};

/// Initializes the global subscriber.
///
/// The level is read from `RUST_LOG` (default: `info`), e.g.
/// `RUST_LOG=pallet_calc=debug` to trace every planned product and packed layer.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .init();
}

/// Initializes verbose logging for tests; repeated calls are ignored.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

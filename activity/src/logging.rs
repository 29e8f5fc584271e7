//! Tracing setup for the updater.
//!
//! Diagnostics go to stderr and are filtered by `RUST_LOG`. Run status lines
//! meant for the workflow log are printed to stdout by the CLI instead.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`. Defaults to `info` for this crate and `warn` elsewhere.
/// Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=activity=debug activity run --dry-run
/// ```
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,activity=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

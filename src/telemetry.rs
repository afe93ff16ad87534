//! Tracing setup for the desktop binary.

use tracing_subscriber::EnvFilter;

/// Installs a compact `tracing` subscriber filtered by `RUST_LOG`
/// (default `info`).
///
/// Returns `false` if a global subscriber was already set.
#[must_use]
pub fn init_tracing() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .try_init()
        .is_ok()
}

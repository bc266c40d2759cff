//! Tracing subscriber setup for hosts embedding the directory.
//!
//! The library itself only emits `tracing` events; installing a subscriber
//! is left to the binary. This helper wires the common case.

use tracing_subscriber::EnvFilter;

use crate::config::GeneralConfig;

/// Build the filter: `RUST_LOG` wins, otherwise `config.log_level`.
#[must_use]
pub fn env_filter(config: &GeneralConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
}

/// Install a global fmt subscriber.
///
/// Returns `false` if a global subscriber was already set, which is not an error.
pub fn init(config: &GeneralConfig) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_target(false)
        .try_init()
        .is_ok()
}

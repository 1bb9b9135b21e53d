//! Augury - Firmware update engine for gateway and sensor fleets
//!
//! Nodes receive firmware over OTA channels, their endpoints over DFU
//! channels. See `engine::fleet` for the update rules.

pub mod engine;

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber on stderr. `RUST_LOG` wins over `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

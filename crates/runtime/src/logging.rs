//! Log subscriber setup
//!
//! The runtime emits `tracing` events; nothing is printed until a subscriber
//! is installed. Host programs call `init()` (or `strata_runtime_init` from
//! generated code) once at startup. If the host already installed its own
//! subscriber, that one is kept.

use crate::config::{DEFAULT_LOG_FILTER, runtime_config};
use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install a stderr subscriber filtered by `STRATA_LOG`; idempotent
pub fn init() {
    INIT.call_once(|| {
        let config = runtime_config();
        let filter = EnvFilter::try_new(&config.log_filter)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

        let installed = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok();

        if !installed {
            tracing::debug!("global subscriber already set, keeping it");
        }
        for warning in &config.warnings {
            tracing::warn!("{}", warning);
        }
    });
}

/// Initialise runtime logging (FFI-safe)
#[unsafe(no_mangle)]
pub extern "C" fn strata_runtime_init() {
    init();
}

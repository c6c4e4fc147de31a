//! Tracing initialization.
//!
//! Uses `ObservabilityConfig` for PYVENV_QUIET, PYVENV_LOG_LEVEL and
//! PYVENV_LOG_JSON. `RUST_LOG` takes precedence when set. Logs always go to
//! stderr so proxied command output on stdout stays clean.

use pyvenv_core::config::ObservabilityConfig;
use tracing_subscriber::{prelude::*, EnvFilter};

/// Initialize tracing. Call at process startup.
pub fn init_tracing() {
    let cfg = ObservabilityConfig::from_env();
    let level = if cfg.quiet {
        "pyvenv=warn".to_string()
    } else {
        cfg.log_level.clone()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    };
}

//! Tracing setup: structured logging for applications embedding keel.
//!
//! The library itself only emits events; installing a subscriber is the
//! application's choice.

pub mod spans;

use std::sync::Once;

use keel_core::config::ObservabilityConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding the filter directive.
pub const LOG_ENV: &str = "KEEL_LOG";

/// Install a global fmt subscriber.
///
/// `KEEL_LOG` wins over `config.log_level`. Idempotent: later calls, or a
/// subscriber installed by someone else, leave the existing one in place.
pub fn init_tracing(config: &ObservabilityConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

        let registry = tracing_subscriber::registry().with(filter);
        let installed = if config.json {
            registry
                .with(fmt::layer().json().with_target(true).with_thread_ids(true))
                .try_init()
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .try_init()
        };
        if installed.is_err() {
            tracing::debug!("tracing: subscriber already installed, keeping it");
        }
    });
}

/// Initialize tracing with an explicit filter string (for tests and tools).
pub fn init_tracing_with_filter(filter: &str) {
    init_tracing(&ObservabilityConfig {
        log_level: filter.to_string(),
        json: false,
    });
}

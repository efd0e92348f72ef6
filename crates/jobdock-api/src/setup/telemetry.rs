//! Tracing subscriber setup

use jobdock_core::Config;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// Respects `RUST_LOG` when set; production environments log JSON lines,
/// everything else gets the human-readable formatter. `try_init` keeps
/// repeated calls (tests, embedded use) from panicking.
pub fn init_telemetry(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    if config.is_production() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(false)
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    }
}

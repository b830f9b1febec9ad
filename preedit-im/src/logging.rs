//! Logging setup
//!
//! The library only emits `tracing` events. Binaries call [`init_logging`]
//! once to install a stderr subscriber.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Install the global subscriber. `RUST_LOG` wins over `default_filter`.
///
/// Later calls are ignored.
pub fn init_logging(default_filter: &str) {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(default_filter)),
            )
            .with_writer(std::io::stderr)
            .try_init();
    });
}

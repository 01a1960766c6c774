//! Logging initialization for the `verho` binary.
//!
//! Restriction events are emitted through `tracing`; this installs a stderr
//! subscriber filtered by `RUST_LOG` (defaulting to the given level). Kept
//! out of the library path: embedding applications own their own
//! subscriber.

use std::io::stderr;
use std::sync::Once;

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt::layer, prelude::*};

static INIT: Once = Once::new();

/// Installs the global stderr subscriber. Safe to call more than once; only
/// the first call takes effect.
pub fn init_logging(log_level: &str) -> Result<()> {
    INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("{log_level},verho=debug")));

        tracing_subscriber::registry()
            .with(env_filter)
            .with(layer().with_writer(stderr).with_ansi(true))
            .init();
    });
    Ok(())
}

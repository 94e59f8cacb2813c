//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding the log filter, e.g. `POWIATY_LOG=powiaty=debug`.
pub const LOG_ENV: &str = "POWIATY_LOG";

/// Initialize logging to stderr. Falls back to `powiaty=info` when
/// `POWIATY_LOG` is unset or invalid; `verbose` raises the default to debug.
pub fn init_tracing(verbose: bool) {
    INIT.call_once(|| {
        let default = if verbose { "powiaty=debug" } else { "powiaty=info" };
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .with(filter)
            .init();
    });
}

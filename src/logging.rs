//! Logging setup.
//!
//! Logs go to stderr so stdout stays free for event output. The level is
//! taken from `RUST_LOG`, falling back to `cadenza=info,warn`, or
//! `cadenza=debug,warn` when verbose.

use {
    anyhow::{Result, anyhow},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

/// Default filter directive.
const DEFAULT_FILTER: &str = "cadenza=info,warn";

/// Default filter directive when verbose output was requested.
const VERBOSE_FILTER: &str = "cadenza=debug,warn";

/// Initializes the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER })
    });

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {e}"))
}

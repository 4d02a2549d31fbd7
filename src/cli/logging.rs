//! cli::logging
//!
//! Tracing subscriber setup for the binary.
//!
//! Events go to stderr. `RUST_LOG` selects the filter; without it the level
//! follows the verbosity flags. `--debug` always enables debug events.

use anyhow::{Context as _, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::ui::output::Verbosity;

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if a subscriber is already installed.
pub fn init(verbosity: Verbosity) -> Result<()> {
    let filter = if verbosity == Verbosity::Debug {
        EnvFilter::new(verbosity.log_filter())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .try_init()
        .context("failed to install tracing subscriber")
}

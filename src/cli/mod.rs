//! cli
//!
//! Command-line interface layer for seedline.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install logging and load configuration
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap, builds the sample
//! library registry from [`crate::demo`] and hands lines to the
//! [`crate::engine`].

pub mod args;
pub mod commands;
pub mod logging;

pub use args::{Cli, Shell};

use anyhow::{anyhow, Result};

use crate::core::config::Config;
use crate::engine::GenerateOptions;
use crate::ui::output::Verbosity;

/// Settings shared by every command handler.
#[derive(Debug, Clone, Copy)]
pub struct Context {
    pub verbosity: Verbosity,
    pub options: GenerateOptions,
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);
    logging::init(verbosity)?;

    let config = Config::load(cli.config.as_deref()).map_err(|err| anyhow!("{err}"))?;
    if let Some(path) = config.loaded_from() {
        tracing::debug!(path = %path.display(), "loaded config");
    }

    let ctx = Context {
        verbosity,
        options: cli.generate_options(&config),
    };

    commands::dispatch(cli.command, &ctx)
}

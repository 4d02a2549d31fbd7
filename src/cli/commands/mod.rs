//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Builds the library registry
//! 2. Hands lines or names to the engine
//! 3. Formats and displays output
//!
//! Every run starts from an empty library; nothing is persisted.

mod completion;
mod run;
mod usage;

pub use completion::completion;
pub use run::{exec, run};
pub use usage::usage;

use super::args::Command;
use super::Context;
use anyhow::Result;

/// Dispatch a parsed command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Run { files, emit } => run(ctx, &files, emit),
        Command::Exec { lines, emit } => exec(ctx, &lines, emit),
        Command::Usage { name, detailed } => usage(ctx, name.as_deref(), detailed),
        Command::Completion { shell } => completion(shell),
    }
}

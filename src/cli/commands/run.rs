//! run and exec commands - Execute scripts or single lines against a fresh library

use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context as _, Result};

use crate::cli::Context;
use crate::demo::{self, Library};
use crate::engine::Registry;
use crate::ui::output;

/// Run script files in order, stopping at the first failure.
pub fn run(ctx: &Context, files: &[PathBuf], emit: bool) -> Result<()> {
    let registry = demo::registry().context("failed to build the library registry")?;
    let mut library = Library::default();

    let mut executed = 0;
    for path in files {
        let script = fs::read_to_string(path)
            .with_context(|| format!("failed to read script '{}'", path.display()))?;
        let count = registry
            .run_many(&mut library, &script)
            .map_err(|err| anyhow!("{}: {err}", path.display()))?;
        tracing::debug!(path = %path.display(), count, "ran script");
        executed += count;
    }

    finish(ctx, &registry, &library, executed, emit)
}

/// Run individual command lines, stopping at the first failure.
pub fn exec(ctx: &Context, lines: &[String], emit: bool) -> Result<()> {
    let registry = demo::registry().context("failed to build the library registry")?;
    let mut library = Library::default();

    for (index, line) in lines.iter().enumerate() {
        registry
            .run(&mut library, line)
            .map_err(|err| anyhow!("command {}: {err}", index + 1))?;
    }

    finish(ctx, &registry, &library, lines.len(), emit)
}

fn finish(
    ctx: &Context,
    registry: &Registry<Library>,
    library: &Library,
    executed: usize,
    emit: bool,
) -> Result<()> {
    for entry in &library.journal {
        output::status(entry, ctx.verbosity);
    }

    if emit {
        let text = demo::dump(registry, library, &ctx.options)?;
        if !text.is_empty() {
            println!("{text}");
        }
    }

    let records = library.languages.len() + library.authors.len() + library.books.len();
    output::status(
        format!(
            "ran {}, library holds {}",
            output::count(executed, "command"),
            output::count(records, "record")
        ),
        ctx.verbosity,
    );
    Ok(())
}

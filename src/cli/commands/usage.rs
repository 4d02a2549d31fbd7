//! usage command - Show how to write commands for the library

use anyhow::{bail, Context as _, Result};

use crate::cli::Context;
use crate::demo;
use crate::ui::output;

/// Print usage for `name` (a record type or custom command), or help for
/// everything when no name is given.
pub fn usage(ctx: &Context, name: Option<&str>, detailed: bool) -> Result<()> {
    let registry = demo::registry().context("failed to build the library registry")?;

    let text = match name {
        None => registry.help_text(),
        Some(name) if registry.record(name).is_some() => {
            if detailed {
                registry.detailed_usage_example(name)?
            } else {
                registry.usage_example(name)?
            }
        }
        Some(name) if registry.command(name).is_some() => {
            let prompt = registry.custom_command_prompt(name)?;
            match registry.command(name).and_then(|c| c.description()) {
                Some(description) if detailed => format!("{prompt}\n  {description}"),
                _ => prompt,
            }
        }
        Some(name) => bail!("no record type or command named '{name}'"),
    };

    output::print(text, ctx.verbosity);
    Ok(())
}

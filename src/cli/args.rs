//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Use this config file instead of searching
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--aliases`, `--named`, `--keep-defaults`: Override generation defaults

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::config::Config;
use crate::engine::GenerateOptions;

/// seedline - Seed data from plain-text command scripts
#[derive(Parser, Debug)]
#[command(name = "seedline")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file to use instead of the standard locations
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit the first alias of record types and fields
    #[arg(long, global = true)]
    pub aliases: bool,

    /// Emit every field as --Field=value
    #[arg(long, global = true)]
    pub named: bool,

    /// Emit fields that hold their default value
    #[arg(long, global = true)]
    pub keep_defaults: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Generation options: config file values, overridden by flags.
    pub fn generate_options(&self, config: &Config) -> GenerateOptions {
        let mut options = GenerateOptions::from(config);
        if self.aliases {
            options.prefer_aliases = true;
        }
        if self.named {
            options.positional = false;
        }
        if self.keep_defaults {
            options.skip_defaults = false;
        }
        options
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run command scripts against a fresh library
    #[command(
        name = "run",
        long_about = "Run command scripts against a fresh library.\n\n\
            Each file holds one command per line. Blank lines and lines starting \
            with '#' are skipped. Files run in order into the same library and \
            execution stops at the first failing line.",
        after_help = "\
EXAMPLES:
    # Load a catalogue
    seedline run catalogue.seed

    # Load and print every record back as commands
    seedline run catalogue.seed --emit"
    )]
    Run {
        /// Script files to run, in order
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,

        /// Print every record regenerated as commands
        #[arg(long)]
        emit: bool,
    },

    /// Run individual command lines
    #[command(
        name = "exec",
        after_help = "\
EXAMPLES:
    seedline exec 'add language en English' 'add book b1 Dune --lang=en' --emit"
    )]
    Exec {
        /// Command lines to run, in order
        #[arg(required = true, value_name = "LINE")]
        lines: Vec<String>,

        /// Print every record regenerated as commands
        #[arg(long)]
        emit: bool,
    },

    /// Show usage for record types and custom commands
    Usage {
        /// Record type or custom command name
        #[arg(value_name = "NAME")]
        name: Option<String>,

        /// Show every field with its type and aliases
        #[arg(long)]
        detailed: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from(["seedline", "--named", "--keep-defaults", "usage"]);
        let options = cli.generate_options(&Config::default());
        assert!(!options.prefer_aliases);
        assert!(!options.positional);
        assert!(!options.skip_defaults);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["seedline", "run", "a.seed", "--emit", "--aliases"]);
        assert!(cli.aliases);
        assert!(matches!(cli.command, Command::Run { emit: true, .. }));
    }
}

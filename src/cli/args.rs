//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Cairn - module-based build tool with pluggable dependency resolution.
#[derive(Debug, Parser)]
#[command(name = "cairn")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve dependencies, then compile and test (default)
    Build(BuildArgs),

    /// Resolve missing module dependencies only
    Resolve(ResolveArgs),

    /// Run a single tool through the execution engine
    Run(RunArgs),

    /// List every discoverable tool and its origin
    Tools(ToolsArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `build` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct BuildArgs {
    /// Abort the build sequence at the first failing tool
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the `resolve` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ResolveArgs {}

/// Arguments for the `run` command.
#[derive(Debug, Clone, clap::Args)]
pub struct RunArgs {
    /// Name of the tool to run
    pub tool: String,

    /// Arguments passed through to the tool
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Arguments for the `tools` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ToolsArgs {}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_build_with_strict() {
        let cli = Cli::parse_from(["cairn", "build", "--strict"]);
        match cli.command {
            Some(Commands::Build(args)) => assert!(args.strict),
            _ => panic!("expected build command"),
        }
    }

    #[test]
    fn parses_run_with_tool_arguments() {
        let cli = Cli::parse_from(["cairn", "run", "compiler", "--module", "app"]);
        match cli.command {
            Some(Commands::Run(args)) => {
                assert_eq!(args.tool, "compiler");
                assert_eq!(args.args, ["--module", "app"]);
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn global_flags_apply_after_subcommand() {
        let cli = Cli::parse_from(["cairn", "resolve", "--debug"]);
        assert!(cli.debug);
    }
}

//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use semver::Version;

use gantry::core::target_context::Configuration;

/// Gantry - a build orchestrator for engine-style module trees
#[derive(Parser)]
#[command(name = "gantry")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new Gantry project (or add a module with --module)
    New(NewArgs),

    /// Compile the project's modules in dependency order
    Build(BuildArgs),

    /// Resolve the module graph without compiling
    Check(CheckArgs),

    /// Display the module dependency tree
    Tree(TreeArgs),

    /// Show what a module exports and what it can see
    Exports(ExportsArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Target selection shared by build-like commands.
#[derive(Args)]
pub struct TargetArgs {
    /// Build configuration
    #[arg(
        short,
        long,
        default_value = "development",
        value_parser = parse_configuration
    )]
    pub configuration: Configuration,

    /// Engine version to build against
    #[arg(long, default_value = "5.3.0")]
    pub engine: Version,
}

fn parse_configuration(s: &str) -> Result<Configuration, String> {
    match s {
        "debug" => Ok(Configuration::Debug),
        "development" => Ok(Configuration::Development),
        "shipping" => Ok(Configuration::Shipping),
        other => Err(format!(
            "unknown configuration `{}` (expected debug, development, or shipping)",
            other
        )),
    }
}

#[derive(Args)]
pub struct NewArgs {
    /// Project (or module) name
    pub name: String,

    /// Add a module to the current project instead of creating a project
    #[arg(long)]
    pub module: bool,

    /// Directory to create the project in (defaults to name)
    #[arg(long)]
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Emit the build plan as JSON (no build)
    #[arg(long)]
    pub plan: bool,

    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Args)]
pub struct TreeArgs {
    /// Module to show the tree for (defaults to all root modules)
    pub module: Option<String>,

    /// Maximum depth to display
    #[arg(short, long)]
    pub depth: Option<usize>,

    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Args)]
pub struct ExportsArgs {
    /// Module to inspect
    pub module: String,

    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

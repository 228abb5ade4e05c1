//! Gantry CLI - a build orchestrator for engine-style module trees

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gantry::util::diagnostic::ConfigurationError;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        // Manifest errors carry source spans; render them through miette
        match e.downcast::<ConfigurationError>() {
            Ok(config_err) => eprintln!("{:?}", miette::Report::new(config_err)),
            Err(e) => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("gantry=debug")
    } else {
        EnvFilter::new("gantry=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let color = !cli.no_color;

    match cli.command {
        Commands::New(args) => commands::new::execute(args),
        Commands::Build(args) => commands::build::execute(args, cli.verbose, color),
        Commands::Check(args) => commands::check::execute(args, color),
        Commands::Tree(args) => commands::tree::execute(args, color),
        Commands::Exports(args) => commands::exports::execute(args, color),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

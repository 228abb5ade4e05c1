//! `gantry build` command

use anyhow::{bail, Result};

use gantry::builder::executor::ModuleState;
use gantry::ops::gantry_build::{build_project, BuildOptions, BuildOutcome};
use gantry::util::diagnostic::emit;
use gantry::util::GlobalContext;

use crate::cli::BuildArgs;
use crate::commands::{diagnose_resolve, load_project, target_context};

pub fn execute(args: BuildArgs, verbose: bool, color: bool) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let project = load_project(&ctx)?;

    let opts = BuildOptions {
        target: target_context(&args.target),
        jobs: args.jobs,
        plan_only: args.plan,
        verbose,
    };

    let outcome =
        build_project(&project, &opts).map_err(|e| diagnose_resolve(e, color))?;

    match outcome {
        BuildOutcome::Planned(json) => {
            println!("{}", json);
        }
        BuildOutcome::Executed(report) => {
            if !report.up_to_date.is_empty() {
                println!("  Up to date {} module(s)", report.up_to_date.len());
            }

            if !report.success() {
                for error in &report.errors {
                    emit(&error.to_diagnostic(), color);
                }
                let blocked = report.blocked();
                if !blocked.is_empty() {
                    let names: Vec<_> = blocked.iter().map(|id| id.as_str()).collect();
                    eprintln!("blocked: {}", names.join(", "));
                }
                bail!("build failed for {} module(s)", report.errors.len());
            }

            let compiled = report
                .states
                .values()
                .filter(|&&s| s == ModuleState::Compiled)
                .count();
            println!("    Compiled {} module(s)", compiled);
        }
    }

    Ok(())
}

//! `gantry check` command

use anyhow::Result;

use gantry::ops::gantry_build::check_project;
use gantry::util::GlobalContext;

use crate::cli::CheckArgs;
use crate::commands::{diagnose_resolve, load_project, target_context};

pub fn execute(args: CheckArgs, color: bool) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let project = load_project(&ctx)?;
    let target = target_context(&args.target);

    let resolved =
        check_project(&project, &target).map_err(|e| diagnose_resolve(e, color))?;

    let order = resolved.graph.topological_order();
    println!(
        "ok: {} module(s), build order: {}",
        resolved.graph.len(),
        order
            .iter()
            .map(|id| id.as_str())
            .collect::<Vec<_>>()
            .join(" -> ")
    );

    Ok(())
}

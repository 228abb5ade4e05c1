//! CLI command implementations.

pub mod build;
pub mod check;
pub mod completions;
pub mod exports;
pub mod new;
pub mod tree;

use anyhow::Result;

use gantry::core::project::Project;
use gantry::core::target_context::TargetContext;
use gantry::resolver::errors::ResolveError;
use gantry::util::diagnostic::{emit, suggestions};
use gantry::util::GlobalContext;

use crate::cli::TargetArgs;

/// Load the project containing the current directory.
pub fn load_project(ctx: &GlobalContext) -> Result<Project> {
    let manifest_path = ctx.find_manifest().ok_or_else(|| {
        anyhow::anyhow!(
            "could not find Gantry.toml in {} or any parent directory\n{}",
            ctx.cwd().display(),
            suggestions::NO_PROJECT
        )
    })?;
    Ok(Project::load(&manifest_path)?)
}

/// Build the target context from shared CLI args.
pub fn target_context(args: &TargetArgs) -> TargetContext {
    TargetContext::host(args.engine.clone()).with_configuration(args.configuration)
}

/// Emit a rich diagnostic for resolution failures, then pass the error on.
pub fn diagnose_resolve(err: anyhow::Error, color: bool) -> anyhow::Error {
    if let Some(resolve_err) = err.downcast_ref::<ResolveError>() {
        emit(&resolve_err.to_diagnostic(), color);
        return anyhow::anyhow!("module resolution failed");
    }
    err
}

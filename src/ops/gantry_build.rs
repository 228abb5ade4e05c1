//! Implementation of `gantry build` and `gantry check`.

use anyhow::{Context, Result};

use crate::builder::context::BuildContext;
use crate::builder::executor::{BuildExecutor, BuildReport};
use crate::builder::plan::BuildPlan;
use crate::core::project::Project;
use crate::core::target_context::TargetContext;
use crate::ops::resolve::{resolve_project, ResolvedProject};

/// Options for a build invocation.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Target context to build for
    pub target: TargetContext,

    /// Parallel jobs (None = rayon default)
    pub jobs: Option<usize>,

    /// Print the plan as JSON and exit without compiling
    pub plan_only: bool,

    /// Verbose per-step output
    pub verbose: bool,
}

/// Outcome of `gantry build`.
pub enum BuildOutcome {
    /// Plan was printed, nothing compiled
    Planned(String),

    /// Plan was executed
    Executed(BuildReport),
}

/// Resolve, plan, and (unless `plan_only`) execute a project build.
pub fn build_project(project: &Project, opts: &BuildOptions) -> Result<BuildOutcome> {
    let ResolvedProject { graph, visibility } = resolve_project(project, &opts.target)?;

    let ctx = BuildContext::new(
        project.root(),
        opts.target.clone(),
        project.manifest().unity_batch_size,
    )?;
    let plan = BuildPlan::new(&ctx, &graph, &visibility)?;

    if opts.plan_only {
        return Ok(BuildOutcome::Planned(plan.to_json()?));
    }

    if let Some(jobs) = opts.jobs {
        // Ignore the error when a pool already exists (tests, repeat calls)
        let _ = rayon::ThreadPoolBuilder::new().num_threads(jobs).build_global();
    }

    let report = BuildExecutor::new(&ctx)
        .verbose(opts.verbose)
        .execute(&plan, &graph)
        .context("build execution failed")?;

    Ok(BuildOutcome::Executed(report))
}

/// Resolve only: validates manifests, the graph, and visibility.
pub fn check_project(project: &Project, target: &TargetContext) -> Result<ResolvedProject> {
    resolve_project(project, target)
}

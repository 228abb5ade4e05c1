//! Plan execution with wave parallelism.
//!
//! Modules advance through a state machine:
//! `Unresolved -> DependenciesResolved -> Compiling -> Compiled | Failed`.
//! A failed module marks all of its transitive dependents `Blocked`;
//! modules that do not depend on the failure keep compiling. Within a
//! wave (modules whose dependencies are all compiled) modules build in
//! parallel on the rayon pool.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Command;
use std::time::Instant;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;

use crate::builder::context::BuildContext;
use crate::builder::errors::BuildError;
use crate::builder::fingerprint::{module_fingerprint, FingerprintCache};
use crate::builder::plan::{BuildPlan, ModulePlan};
use crate::builder::toolchain::{ArchiveInput, CommandSpec, CompileInput, PchInclude};
use crate::core::module_id::ModuleId;
use crate::resolver::graph::ModuleGraph;
use crate::util::fs::ensure_dir;

/// Lifecycle state of one module during a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleState {
    /// Not yet part of a resolved graph
    Unresolved,
    /// Dependencies resolved, waiting for them to compile
    DependenciesResolved,
    /// Currently compiling
    Compiling,
    /// Compiled successfully (or up to date, or precompiled)
    Compiled,
    /// Compilation failed
    Failed,
    /// A transitive dependency failed; never attempted
    Blocked,
}

/// Outcome of a full plan execution.
#[derive(Debug)]
pub struct BuildReport {
    /// Final state of every module
    pub states: HashMap<ModuleId, ModuleState>,

    /// Modules skipped because their fingerprint was unchanged
    pub up_to_date: Vec<ModuleId>,

    /// Archives produced (or reused) by this build
    pub artifacts: Vec<PathBuf>,

    /// Per-module failures, in the order they were observed
    pub errors: Vec<BuildError>,
}

impl BuildReport {
    /// Whether every module compiled (or was skipped as up to date).
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Final state of one module.
    pub fn state(&self, id: ModuleId) -> ModuleState {
        self.states.get(&id).copied().unwrap_or(ModuleState::Unresolved)
    }

    /// Modules blocked by upstream failures.
    pub fn blocked(&self) -> Vec<ModuleId> {
        let mut blocked: Vec<ModuleId> = self
            .states
            .iter()
            .filter(|(_, &s)| s == ModuleState::Blocked)
            .map(|(&id, _)| id)
            .collect();
        blocked.sort();
        blocked
    }
}

/// Executes a build plan against a resolved graph.
pub struct BuildExecutor<'a> {
    ctx: &'a BuildContext,
    verbose: bool,
}

impl<'a> BuildExecutor<'a> {
    pub fn new(ctx: &'a BuildContext) -> Self {
        BuildExecutor {
            ctx,
            verbose: false,
        }
    }

    /// Enable verbose output.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Execute the plan. Build failures land in the report, not in the
    /// returned `Err`; the latter is reserved for infrastructure problems
    /// such as an unwritable output directory.
    pub fn execute(&self, plan: &BuildPlan, graph: &ModuleGraph) -> Result<BuildReport> {
        let start = Instant::now();

        ensure_dir(&self.ctx.output_dir)?;
        ensure_dir(&self.ctx.lib_dir())?;

        let mut cache = FingerprintCache::load(&self.ctx.fingerprint_path())?;
        let mut states: HashMap<ModuleId, ModuleState> = HashMap::new();
        let mut up_to_date = Vec::new();
        let mut artifacts = Vec::new();
        let mut errors: Vec<BuildError> = Vec::new();
        let mut fingerprints: HashMap<ModuleId, String> = HashMap::new();

        for module in &plan.modules {
            let id = module.module;

            let desc = graph
                .get(id)
                .ok_or_else(|| anyhow::anyhow!("plan references unknown module `{}`", id))?;

            let mut inputs = Vec::with_capacity(module.sources.len() + module.headers.len());
            inputs.extend_from_slice(&module.sources);
            inputs.extend_from_slice(&module.headers);

            // Dependencies precede their dependents in the plan, so every
            // dependency fingerprint is already computed here. A header
            // edit anywhere downstream invalidates the whole chain above.
            let mut dep_ids = graph.deps(id);
            dep_ids.sort();
            let dep_fps: Vec<&str> = dep_ids
                .iter()
                .filter_map(|dep| fingerprints.get(dep).map(String::as_str))
                .collect();

            let fp = module_fingerprint(desc, &self.ctx.target, &inputs, &dep_fps)?;

            if module.precompiled {
                tracing::debug!("module `{}` is precompiled, skipping", id);
                states.insert(id, ModuleState::Compiled);
                fingerprints.insert(id, fp);
                continue;
            }

            let artifact_present = module
                .archive
                .as_ref()
                .map(|a| a.output.exists())
                .unwrap_or(true);

            if cache.is_up_to_date(id.as_str(), &fp) && artifact_present {
                tracing::debug!("module `{}` is up to date", id);
                states.insert(id, ModuleState::Compiled);
                up_to_date.push(id);
                if let Some(ref archive) = module.archive {
                    artifacts.push(archive.output.clone());
                }
            } else {
                states.insert(id, ModuleState::DependenciesResolved);
            }
            fingerprints.insert(id, fp);
        }

        let pending = states
            .values()
            .filter(|&&s| s == ModuleState::DependenciesResolved)
            .count();
        let pb = if !self.verbose && pending > 1 {
            let pb = ProgressBar::new(pending as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap()
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        loop {
            let wave: Vec<&ModulePlan> = plan
                .modules
                .iter()
                .filter(|m| {
                    states.get(&m.module) == Some(&ModuleState::DependenciesResolved)
                        && graph
                            .deps(m.module)
                            .iter()
                            .all(|dep| states.get(dep) == Some(&ModuleState::Compiled))
                })
                .collect();

            if wave.is_empty() {
                break;
            }

            for module in &wave {
                states.insert(module.module, ModuleState::Compiling);
                if let Some(ref pb) = pb {
                    pb.set_message(module.module.to_string());
                }
            }

            let results: Vec<(ModuleId, Result<Option<PathBuf>, BuildError>)> = wave
                .par_iter()
                .map(|module| (module.module, self.build_module(module)))
                .collect();

            for (id, result) in results {
                if let Some(ref pb) = pb {
                    pb.inc(1);
                }
                match result {
                    Ok(artifact) => {
                        states.insert(id, ModuleState::Compiled);
                        if let Some(fp) = fingerprints.remove(&id) {
                            cache.update(id.as_str(), fp);
                        }
                        artifacts.extend(artifact);
                        tracing::info!("compiled `{}`", id);
                    }
                    Err(err) => {
                        states.insert(id, ModuleState::Failed);
                        for dependent in graph.transitive_dependents(id) {
                            if states.get(&dependent) != Some(&ModuleState::Compiled) {
                                states.insert(dependent, ModuleState::Blocked);
                            }
                        }
                        tracing::warn!("module `{}` failed: {}", id, err);
                        errors.push(err);
                    }
                }
            }
        }

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        cache.save(&self.ctx.fingerprint_path())?;

        let compiled = states
            .values()
            .filter(|&&s| s == ModuleState::Compiled)
            .count();
        eprintln!(
            "    Finished {} module(s) in {:.2}s",
            compiled,
            start.elapsed().as_secs_f64()
        );

        Ok(BuildReport {
            states,
            up_to_date,
            artifacts,
            errors,
        })
    }

    /// Build one module: PCH, translation units, archive.
    fn build_module(&self, module: &ModulePlan) -> Result<Option<PathBuf>, BuildError> {
        let id = module.module;
        let intermediate = self.ctx.module_intermediate_dir(id);
        ensure_dir(&intermediate).map_err(|e| BuildError::CompileFailed {
            module: id.to_string(),
            file: intermediate.clone(),
            detail: e.to_string(),
        })?;

        if let Some(ref pch) = module.pch {
            if !pch.source_header.exists() {
                return Err(BuildError::MissingPchHeader {
                    module: id.to_string(),
                    path: pch.source_header.clone(),
                });
            }
            // Mirror the header into the intermediate dir; the artifact is
            // produced next to the mirror, which is what compiles include
            std::fs::copy(&pch.source_header, &pch.header).map_err(|e| {
                BuildError::CompileFailed {
                    module: id.to_string(),
                    file: pch.header.clone(),
                    detail: e.to_string(),
                }
            })?;
            let cmd =
                self.ctx
                    .toolchain()
                    .pch_command(&pch.header, &pch.output, &module.include_dirs);
            self.run(id, &pch.header, &cmd)?;
        }

        for step in &module.compiles {
            let input = CompileInput {
                source: step.source.clone(),
                output: step.output.clone(),
                include_dirs: module.include_dirs.clone(),
                pch: module.pch.as_ref().map(|p| PchInclude {
                    header: p.header.clone(),
                    artifact: p.output.clone(),
                }),
                cflags: step.cflags.clone(),
            };
            let cmd = self.ctx.toolchain().compile_command(&input);
            if self.verbose {
                eprintln!("   Compiling {}", step.source.display());
            }
            self.run(id, &step.source, &cmd)?;
        }

        match module.archive {
            Some(ref archive) => {
                let cmd = self.ctx.toolchain().archive_command(&ArchiveInput {
                    objects: archive.objects.clone(),
                    output: archive.output.clone(),
                });
                self.run(id, &archive.output, &cmd)?;
                Ok(Some(archive.output.clone()))
            }
            None => Ok(None),
        }
    }

    /// Run one toolchain command, mapping failure to a per-module error.
    fn run(&self, id: ModuleId, file: &std::path::Path, cmd: &CommandSpec) -> Result<(), BuildError> {
        tracing::trace!("running {:?} {:?}", cmd.program, cmd.args);

        let output = Command::new(&cmd.program)
            .args(&cmd.args)
            .output()
            .map_err(|e| BuildError::ToolchainUnavailable {
                module: id.to_string(),
                program: cmd.program.clone(),
                detail: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BuildError::CompileFailed {
                module: id.to_string(),
                file: file.to_path_buf(),
                detail: stderr.trim().to_string(),
            });
        }

        Ok(())
    }
}

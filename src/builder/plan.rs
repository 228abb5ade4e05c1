//! Build plan generation.
//!
//! A BuildPlan is the fully expanded list of per-module steps: PCH
//! compilation, translation-unit compilation (unity-batched or per file),
//! and archiving. Plans are deterministic for a given project tree and
//! target context, and serialize to JSON for `gantry build --plan`.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use crate::builder::context::BuildContext;
use crate::builder::unity::{unity_batches, write_unity_file};
use crate::core::descriptor::{ModuleDescriptor, PchMode};
use crate::core::module_id::ModuleId;
use crate::resolver::graph::ModuleGraph;
use crate::resolver::visibility::VisibilityMap;
use crate::util::fs::glob_files;

/// Header trees hashed into a module's fingerprint.
const HEADER_GLOBS: &[&str] = &[
    "Public/**/*.h",
    "Public/**/*.hpp",
    "Public/**/*.inl",
    "Private/**/*.h",
    "Private/**/*.hpp",
    "Private/**/*.inl",
];

/// A complete build plan.
#[derive(Debug, Clone, Serialize)]
pub struct BuildPlan {
    /// Per-module plans, dependencies first
    pub modules: Vec<ModulePlan>,

    /// Module names in compilation order
    pub build_order: Vec<ModuleId>,
}

/// All steps for one module.
#[derive(Debug, Clone, Serialize)]
pub struct ModulePlan {
    /// Module being built
    pub module: ModuleId,

    /// Linked from a prebuilt artifact; no steps are emitted
    pub precompiled: bool,

    /// PCH step, when the module declares one
    pub pch: Option<PchStep>,

    /// Translation units to compile
    pub compiles: Vec<CompileStep>,

    /// Archive step producing the module's static library
    pub archive: Option<ArchiveStep>,

    /// Include directories derived from compile visibility
    pub include_dirs: Vec<PathBuf>,

    /// The module's real source files; fingerprints hash these, not the
    /// generated unity batches
    pub sources: Vec<PathBuf>,

    /// The module's own headers (Public and Private trees); fingerprints
    /// hash these too, so interface edits rebuild the module
    pub headers: Vec<PathBuf>,
}

/// Precompile a header before the module's translation units.
///
/// The declared header is mirrored into the intermediate tree and the
/// artifact is produced next to the mirror: gcc resolves `-include
/// <mirror>` to the adjacent `.gch`, while clang consumes the artifact
/// directly via `-include-pch`.
#[derive(Debug, Clone, Serialize)]
pub struct PchStep {
    /// Declared header inside the module tree (absolute)
    pub source_header: PathBuf,

    /// Mirror of the header in the intermediate dir; what compiles include
    pub header: PathBuf,

    /// Precompiled artifact, adjacent to the mirror
    pub output: PathBuf,
}

/// Compile one translation unit to an object file.
#[derive(Debug, Clone, Serialize)]
pub struct CompileStep {
    /// Source file (a generated unity file when `unity` is set)
    pub source: PathBuf,

    /// Output object file
    pub output: PathBuf,

    /// Whether the source is a generated unity batch
    pub unity: bool,

    /// Compiler flags
    pub cflags: Vec<String>,
}

/// Archive objects into a static library.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveStep {
    /// Object files, in compile order
    pub objects: Vec<PathBuf>,

    /// Output archive
    pub output: PathBuf,
}

impl BuildPlan {
    /// Generate a plan for every module in the graph.
    ///
    /// Unity batch files are written to the intermediate tree as a side
    /// effect, so the emitted compile steps reference real paths.
    pub fn new(ctx: &BuildContext, graph: &ModuleGraph, vis: &VisibilityMap) -> Result<Self> {
        let build_order = graph.topological_order();
        let mut modules = Vec::with_capacity(build_order.len());

        for &id in &build_order {
            let desc = match graph.get(id) {
                Some(d) => d,
                None => continue,
            };
            modules.push(plan_module(ctx, graph, vis, desc)?);
        }

        Ok(BuildPlan {
            modules,
            build_order,
        })
    }

    /// Get the plan for one module.
    pub fn module(&self, id: ModuleId) -> Option<&ModulePlan> {
        self.modules.iter().find(|m| m.module == id)
    }

    /// Total number of compile steps across all modules.
    pub fn compile_count(&self) -> usize {
        self.modules.iter().map(|m| m.compiles.len()).sum()
    }

    /// Render the plan as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn plan_module(
    ctx: &BuildContext,
    graph: &ModuleGraph,
    vis: &VisibilityMap,
    desc: &ModuleDescriptor,
) -> Result<ModulePlan> {
    let id = desc.name();

    if desc.precompiled() {
        return Ok(ModulePlan {
            module: id,
            precompiled: true,
            pch: None,
            compiles: Vec::new(),
            archive: None,
            include_dirs: Vec::new(),
            sources: Vec::new(),
            headers: Vec::new(),
        });
    }

    let intermediate = ctx.module_intermediate_dir(id);
    let include_dirs = include_dirs_for(graph, vis, desc);

    // PCH step only when the policy allows one and a header is declared
    let pch = match (desc.pch_mode(), desc.pch_header()) {
        (PchMode::ExplicitOrShared, Some(header)) => {
            let file_name = header
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "pch.h".to_string());
            let mirror = intermediate.join(&file_name);
            let artifact = intermediate.join(format!(
                "{}.{}",
                file_name,
                ctx.toolchain().pch_extension()
            ));
            Some(PchStep {
                source_header: desc.root().join(header),
                header: mirror,
                output: artifact,
            })
        }
        _ => None,
    };

    let sources = glob_files(desc.root(), desc.sources())?;
    let headers = glob_files(desc.root(), HEADER_GLOBS)?;
    let cflags: Vec<String> = ctx
        .target
        .configuration
        .cflags()
        .iter()
        .map(|f| f.to_string())
        .collect();

    let mut compiles = Vec::new();
    if desc.unity() && sources.len() > 1 {
        for (i, batch) in unity_batches(&sources, ctx.unity_batch_size).iter().enumerate() {
            let unity_file = write_unity_file(id, i, batch, &intermediate)?;
            compiles.push(CompileStep {
                output: intermediate.join(format!("Unity_{}_{}.o", id, i)),
                source: unity_file,
                unity: true,
                cflags: cflags.clone(),
            });
        }
    } else {
        for (i, source) in sources.iter().enumerate() {
            let stem = source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "unit".to_string());
            compiles.push(CompileStep {
                source: source.clone(),
                // Index keeps same-stem sources from colliding
                output: intermediate.join(format!("{}_{}.o", stem, i)),
                unity: false,
                cflags: cflags.clone(),
            });
        }
    }

    let archive = if compiles.is_empty() {
        None
    } else {
        Some(ArchiveStep {
            objects: compiles.iter().map(|c| c.output.clone()).collect(),
            output: ctx.lib_dir().join(format!("lib{}.a", id)),
        })
    };

    Ok(ModulePlan {
        module: id,
        precompiled: false,
        pch,
        compiles,
        archive,
        include_dirs,
        sources,
        headers,
    })
}

/// Include paths a module compiles against: its own Private and Public
/// trees, plus the Public tree of every module in its compile visibility.
fn include_dirs_for(
    graph: &ModuleGraph,
    vis: &VisibilityMap,
    desc: &ModuleDescriptor,
) -> Vec<PathBuf> {
    let mut dirs = vec![desc.private_include_dir(), desc.public_include_dir()];

    if let Some(visible) = vis.compile_visibility(desc.name()) {
        for &id in visible {
            if id == desc.name() {
                continue;
            }
            if let Some(dep) = graph.get(id) {
                dirs.push(dep.public_include_dir());
            }
        }
    }

    dirs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Arc;

    use semver::Version;
    use tempfile::TempDir;

    use crate::builder::toolchain::{GnuToolchain, ToolchainFamily};
    use crate::core::target_context::{Configuration, Platform, TargetContext};
    use crate::resolver::visibility::VisibilityMap;

    fn ctx(root: &Path, batch: usize) -> BuildContext {
        let toolchain = Arc::new(GnuToolchain::new(
            PathBuf::from("clang++"),
            PathBuf::from("ar"),
            ToolchainFamily::Clang,
        ));
        let target = TargetContext {
            platform: Platform::Linux,
            configuration: Configuration::Development,
            engine_version: Version::new(5, 3, 0),
        };
        BuildContext::with_toolchain(root, target, batch, toolchain)
    }

    fn write_sources(root: &Path, module: &str, names: &[&str]) -> PathBuf {
        let module_root = root.join(module);
        let private = module_root.join("Private");
        std::fs::create_dir_all(&private).unwrap();
        std::fs::create_dir_all(module_root.join("Public")).unwrap();
        for name in names {
            std::fs::write(private.join(name), "// source").unwrap();
        }
        module_root
    }

    fn descriptor(name: &str, root: &Path, unity: bool) -> ModuleDescriptor {
        ModuleDescriptor::builder(name)
            .root(root)
            .unity(unity)
            .sources(vec!["Private/**/*.cpp".to_string()])
            .finish()
            .unwrap()
    }

    #[test]
    fn test_unity_batching_honors_batch_size() {
        let tmp = TempDir::new().unwrap();
        let root = write_sources(tmp.path(), "CameraCore", &["A.cpp", "B.cpp", "C.cpp"]);

        let graph =
            ModuleGraph::resolve(vec![descriptor("CameraCore", &root, true)]).unwrap();
        let vis = VisibilityMap::compute(&graph);

        let plan = BuildPlan::new(&ctx(tmp.path(), 2), &graph, &vis).unwrap();
        let module = plan.module(ModuleId::new("CameraCore")).unwrap();

        assert_eq!(module.compiles.len(), 2);
        assert!(module.compiles.iter().all(|c| c.unity));
        // Generated unity files exist and include the real sources
        let first = std::fs::read_to_string(&module.compiles[0].source).unwrap();
        assert!(first.contains("A.cpp"));
    }

    #[test]
    fn test_unity_disabled_compiles_per_file() {
        let tmp = TempDir::new().unwrap();
        let root = write_sources(tmp.path(), "CameraCore", &["A.cpp", "B.cpp"]);

        let graph =
            ModuleGraph::resolve(vec![descriptor("CameraCore", &root, false)]).unwrap();
        let vis = VisibilityMap::compute(&graph);

        let plan = BuildPlan::new(&ctx(tmp.path(), 8), &graph, &vis).unwrap();
        let module = plan.module(ModuleId::new("CameraCore")).unwrap();

        assert_eq!(module.compiles.len(), 2);
        assert!(module.compiles.iter().all(|c| !c.unity));
    }

    #[test]
    fn test_precompiled_module_has_no_steps() {
        let tmp = TempDir::new().unwrap();
        let root = write_sources(tmp.path(), "Slate", &["Widget.cpp"]);

        let desc = ModuleDescriptor::builder("Slate")
            .root(&root)
            .precompiled(true)
            .sources(vec!["Private/**/*.cpp".to_string()])
            .finish()
            .unwrap();
        let graph = ModuleGraph::resolve(vec![desc]).unwrap();
        let vis = VisibilityMap::compute(&graph);

        let plan = BuildPlan::new(&ctx(tmp.path(), 8), &graph, &vis).unwrap();
        let module = plan.module(ModuleId::new("Slate")).unwrap();

        assert!(module.precompiled);
        assert!(module.compiles.is_empty());
        assert!(module.pch.is_none());
        assert!(module.archive.is_none());
    }

    #[test]
    fn test_include_dirs_follow_compile_visibility() {
        let tmp = TempDir::new().unwrap();
        let core_root = write_sources(tmp.path(), "Core", &["Obj.cpp"]);
        let camera_root = write_sources(tmp.path(), "CameraCore", &["Rig.cpp"]);
        let editor_root = write_sources(tmp.path(), "CameraEditor", &["Panel.cpp"]);

        let core = descriptor("Core", &core_root, true);
        let camera = ModuleDescriptor::builder("CameraCore")
            .root(&camera_root)
            .public_dep("Core")
            .sources(vec!["Private/**/*.cpp".to_string()])
            .finish()
            .unwrap();
        let editor = ModuleDescriptor::builder("CameraEditor")
            .root(&editor_root)
            .private_dep("CameraCore")
            .sources(vec!["Private/**/*.cpp".to_string()])
            .finish()
            .unwrap();

        let graph = ModuleGraph::resolve(vec![core, camera, editor]).unwrap();
        let vis = VisibilityMap::compute(&graph);
        let plan = BuildPlan::new(&ctx(tmp.path(), 8), &graph, &vis).unwrap();

        // CameraEditor sees CameraCore's exports, which pull in Core
        let editor_plan = plan.module(ModuleId::new("CameraEditor")).unwrap();
        assert!(editor_plan
            .include_dirs
            .contains(&camera_root.join("Public")));
        assert!(editor_plan.include_dirs.contains(&core_root.join("Public")));

        // Core must not see CameraCore
        let core_plan = plan.module(ModuleId::new("Core")).unwrap();
        assert!(!core_plan
            .include_dirs
            .contains(&camera_root.join("Public")));
    }

    #[test]
    fn test_pch_step_emitted_for_declared_header() {
        let tmp = TempDir::new().unwrap();
        let root = write_sources(tmp.path(), "CameraCore", &["Rig.cpp"]);
        std::fs::write(root.join("Public/CameraCore.h"), "#pragma once\n").unwrap();

        let desc = ModuleDescriptor::builder("CameraCore")
            .root(&root)
            .pch_header("Public/CameraCore.h")
            .sources(vec!["Private/**/*.cpp".to_string()])
            .finish()
            .unwrap();
        let graph = ModuleGraph::resolve(vec![desc]).unwrap();
        let vis = VisibilityMap::compute(&graph);

        let plan = BuildPlan::new(&ctx(tmp.path(), 8), &graph, &vis).unwrap();
        let module = plan.module(ModuleId::new("CameraCore")).unwrap();

        let pch = module.pch.as_ref().unwrap();
        assert_eq!(pch.source_header, root.join("Public/CameraCore.h"));
        // The mirror sits in the intermediate dir with the artifact next
        // to it, so `-include <mirror>` resolves the adjacent .gch
        assert_eq!(
            pch.header.file_name().unwrap().to_string_lossy(),
            "CameraCore.h"
        );
        assert_eq!(pch.output, pch.header.with_extension("h.pch"));
        assert_eq!(pch.header.parent(), pch.output.parent());
    }

    #[test]
    fn test_plan_collects_module_headers() {
        let tmp = TempDir::new().unwrap();
        let root = write_sources(tmp.path(), "CameraCore", &["Rig.cpp"]);
        std::fs::write(root.join("Public/CameraCore.h"), "#pragma once\n").unwrap();
        std::fs::write(root.join("Private/RigImpl.h"), "#pragma once\n").unwrap();

        let graph =
            ModuleGraph::resolve(vec![descriptor("CameraCore", &root, false)]).unwrap();
        let vis = VisibilityMap::compute(&graph);

        let plan = BuildPlan::new(&ctx(tmp.path(), 8), &graph, &vis).unwrap();
        let module = plan.module(ModuleId::new("CameraCore")).unwrap();

        assert!(module.headers.contains(&root.join("Public/CameraCore.h")));
        assert!(module.headers.contains(&root.join("Private/RigImpl.h")));
        assert!(!module.headers.contains(&root.join("Private/Rig.cpp")));
    }

    #[test]
    fn test_pch_none_emits_no_step() {
        let tmp = TempDir::new().unwrap();
        let root = write_sources(tmp.path(), "CameraCore", &["Rig.cpp"]);

        let desc = ModuleDescriptor::builder("CameraCore")
            .root(&root)
            .pch_mode(PchMode::Disabled)
            .pch_header("Public/CameraCore.h")
            .sources(vec!["Private/**/*.cpp".to_string()])
            .finish()
            .unwrap();
        let graph = ModuleGraph::resolve(vec![desc]).unwrap();
        let vis = VisibilityMap::compute(&graph);

        let plan = BuildPlan::new(&ctx(tmp.path(), 8), &graph, &vis).unwrap();
        assert!(plan.module(ModuleId::new("CameraCore")).unwrap().pch.is_none());
    }

    #[test]
    fn test_plan_serializes_to_json() {
        let tmp = TempDir::new().unwrap();
        let root = write_sources(tmp.path(), "CameraCore", &["Rig.cpp"]);

        let graph =
            ModuleGraph::resolve(vec![descriptor("CameraCore", &root, true)]).unwrap();
        let vis = VisibilityMap::compute(&graph);
        let plan = BuildPlan::new(&ctx(tmp.path(), 8), &graph, &vis).unwrap();

        let json = plan.to_json().unwrap();
        assert!(json.contains("\"build_order\""));
        assert!(json.contains("CameraCore"));
    }
}

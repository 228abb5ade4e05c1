//! Project resolution: discovery through visibility.

use anyhow::Result;

use crate::core::descriptor::ModuleDescriptor;
use crate::core::project::Project;
use crate::core::target_context::TargetContext;
use crate::discovery::{FsDiscovery, ModuleDiscovery};
use crate::resolver::graph::ModuleGraph;
use crate::resolver::visibility::VisibilityMap;

/// A fully resolved project: validated graph plus visibility sets.
#[derive(Debug)]
pub struct ResolvedProject {
    pub graph: ModuleGraph,
    pub visibility: VisibilityMap,
}

/// Discover, construct, and resolve all modules of a project.
///
/// Fails with `ConfigurationError` on malformed manifests, and with
/// `ResolveError` on unknown dependencies, duplicates, or cycles. Either
/// way nothing has been compiled yet.
pub fn resolve_project(project: &Project, target: &TargetContext) -> Result<ResolvedProject> {
    project.check_engine(target)?;

    let discovery = FsDiscovery::new(project.root(), project.manifest().module_dirs.clone());
    resolve_with(&discovery, target)
}

/// Resolve from an arbitrary discovery source.
pub fn resolve_with(
    discovery: &dyn ModuleDiscovery,
    target: &TargetContext,
) -> Result<ResolvedProject> {
    let discovered = discovery.discover()?;
    tracing::info!("discovered {} module(s)", discovered.len());

    let descriptors = discovered
        .iter()
        .map(|m| ModuleDescriptor::from_manifest(&m.manifest, &m.root, target))
        .collect::<Result<Vec<_>, _>>()?;

    let graph = ModuleGraph::resolve(descriptors)?;
    let visibility = VisibilityMap::compute(&graph);

    Ok(ResolvedProject { graph, visibility })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use semver::Version;
    use tempfile::TempDir;

    use crate::core::module_id::ModuleId;
    use crate::resolver::errors::ResolveError;

    fn write_module(root: &Path, name: &str, manifest: &str) {
        let dir = root.join("Source").join(name);
        std::fs::create_dir_all(dir.join("Private")).unwrap();
        std::fs::create_dir_all(dir.join("Public")).unwrap();
        std::fs::write(dir.join("Module.toml"), manifest).unwrap();
    }

    fn write_project(root: &Path) -> Project {
        let path = root.join("Gantry.toml");
        std::fs::write(&path, "[project]\nname = \"demo\"\n").unwrap();
        Project::load(&path).unwrap()
    }

    fn target() -> TargetContext {
        TargetContext::host(Version::new(5, 3, 0))
    }

    #[test]
    fn test_resolve_project_end_to_end() {
        let tmp = TempDir::new().unwrap();
        write_module(
            tmp.path(),
            "CameraCore",
            "[module]\nname = \"CameraCore\"\n",
        );
        write_module(
            tmp.path(),
            "CameraEditor",
            "[module]\nname = \"CameraEditor\"\n\n[dependencies]\nprivate = [\"CameraCore\"]\n",
        );
        let project = write_project(tmp.path());

        let resolved = resolve_project(&project, &target()).unwrap();
        assert_eq!(resolved.graph.len(), 2);

        let order = resolved.graph.topological_order();
        let pos = |n: &str| order.iter().position(|&m| m == ModuleId::new(n)).unwrap();
        assert!(pos("CameraCore") < pos("CameraEditor"));
    }

    #[test]
    fn test_resolve_with_static_discovery() {
        use crate::core::manifest::ModuleManifest;
        use crate::discovery::{DiscoveredModule, StaticDiscovery};

        let mut discovery = StaticDiscovery::new();
        discovery.add(DiscoveredModule {
            root: Path::new("/mem/CameraCore").to_path_buf(),
            manifest: ModuleManifest::parse(
                "[module]\nname = \"CameraCore\"\n",
                Path::new("Module.toml"),
            )
            .unwrap(),
        });

        let resolved = resolve_with(&discovery, &target()).unwrap();
        assert!(resolved.graph.contains(ModuleId::new("CameraCore")));
    }

    #[test]
    fn test_unknown_dependency_surfaces_resolve_error() {
        let tmp = TempDir::new().unwrap();
        write_module(
            tmp.path(),
            "A",
            "[module]\nname = \"A\"\n\n[dependencies]\nprivate = [\"Zeta\"]\n",
        );
        let project = write_project(tmp.path());

        let err = resolve_project(&project, &target()).unwrap_err();
        let resolve_err = err.downcast_ref::<ResolveError>().unwrap();
        assert!(matches!(
            resolve_err,
            ResolveError::UnresolvedDependency { .. }
        ));
    }
}

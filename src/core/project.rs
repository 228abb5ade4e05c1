//! Project - the root of a module tree.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::manifest::ProjectManifest;
use crate::core::target_context::TargetContext;
use crate::util::diagnostic::ConfigurationError;

pub use crate::core::manifest::PROJECT_MANIFEST;

/// A loaded project: the Gantry.toml manifest plus its root directory.
#[derive(Debug, Clone)]
pub struct Project {
    /// Project root directory
    root: PathBuf,

    /// Parsed project manifest
    manifest: ProjectManifest,

    /// Path to Gantry.toml
    manifest_path: PathBuf,
}

impl Project {
    /// Load a project from its manifest path.
    pub fn load(manifest_path: &Path) -> Result<Self> {
        let manifest = ProjectManifest::from_path(manifest_path)?;
        let root = manifest_path
            .parent()
            .context("project manifest has no parent directory")?
            .to_path_buf();

        Ok(Project {
            root,
            manifest,
            manifest_path: manifest_path.to_path_buf(),
        })
    }

    /// Get the project root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the project manifest.
    pub fn manifest(&self) -> &ProjectManifest {
        &self.manifest
    }

    /// Get the manifest path.
    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Get the project name.
    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    /// Check the project's engine requirement against the target context.
    pub fn check_engine(&self, target: &TargetContext) -> Result<(), ConfigurationError> {
        if let Some(ref req) = self.manifest.engine {
            if !req.matches(&target.engine_version) {
                return Err(ConfigurationError::new(format!(
                    "project `{}` requires engine {} but the target context provides {}",
                    self.manifest.name, req, target.engine_version
                ))
                .with_help("adjust `engine` in Gantry.toml or build against a matching engine"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::target_context::TargetContext;
    use semver::Version;
    use tempfile::TempDir;

    fn write_project(dir: &Path, engine: &str) -> PathBuf {
        let path = dir.join(PROJECT_MANIFEST);
        std::fs::write(
            &path,
            format!("[project]\nname = \"demo\"\nengine = \"{}\"\n", engine),
        )
        .unwrap();
        path
    }

    #[test]
    fn test_load_project() {
        let tmp = TempDir::new().unwrap();
        let path = write_project(tmp.path(), ">=5.0");

        let project = Project::load(&path).unwrap();
        assert_eq!(project.name(), "demo");
        assert_eq!(project.root(), tmp.path());
    }

    #[test]
    fn test_engine_requirement_satisfied() {
        let tmp = TempDir::new().unwrap();
        let path = write_project(tmp.path(), ">=5.0");
        let project = Project::load(&path).unwrap();

        let target = TargetContext::host(Version::new(5, 3, 0));
        assert!(project.check_engine(&target).is_ok());
    }

    #[test]
    fn test_engine_requirement_violated() {
        let tmp = TempDir::new().unwrap();
        let path = write_project(tmp.path(), ">=5.4");
        let project = Project::load(&path).unwrap();

        let target = TargetContext::host(Version::new(5, 3, 0));
        let err = project.check_engine(&target).unwrap_err();
        assert!(err.to_string().contains("requires engine"));
    }
}

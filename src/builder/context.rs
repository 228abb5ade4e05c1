//! Build context - toolchain, target, and output layout.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::builder::toolchain::{detect_toolchain, Toolchain};
use crate::core::module_id::ModuleId;
use crate::core::target_context::TargetContext;

/// Everything a build needs besides the module graph itself.
#[derive(Clone)]
pub struct BuildContext {
    /// Toolchain implementation
    pub toolchain: Arc<dyn Toolchain>,

    /// Target being built for
    pub target: TargetContext,

    /// Project root
    pub project_root: PathBuf,

    /// Root of all build output (.gantry/target/<triple>)
    pub output_dir: PathBuf,

    /// Unity batch size from the project manifest
    pub unity_batch_size: usize,
}

impl fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext")
            .field("toolchain", &self.toolchain.family())
            .field("target", &self.target)
            .field("project_root", &self.project_root)
            .field("output_dir", &self.output_dir)
            .field("unity_batch_size", &self.unity_batch_size)
            .finish()
    }
}

impl BuildContext {
    /// Create a build context with an auto-detected toolchain.
    pub fn new(
        project_root: &Path,
        target: TargetContext,
        unity_batch_size: usize,
    ) -> Result<Self> {
        let toolchain: Arc<dyn Toolchain> = Arc::from(detect_toolchain()?);
        Ok(Self::with_toolchain(
            project_root,
            target,
            unity_batch_size,
            toolchain,
        ))
    }

    /// Create a build context with an explicit toolchain.
    pub fn with_toolchain(
        project_root: &Path,
        target: TargetContext,
        unity_batch_size: usize,
        toolchain: Arc<dyn Toolchain>,
    ) -> Self {
        let output_dir = project_root.join(".gantry").join("target").join(target.triple());

        BuildContext {
            toolchain,
            target,
            project_root: project_root.to_path_buf(),
            output_dir,
            unity_batch_size,
        }
    }

    /// Intermediate directory for one module (objects, unity files, PCH).
    pub fn module_intermediate_dir(&self, module: ModuleId) -> PathBuf {
        self.output_dir.join("intermediate").join(module.as_str())
    }

    /// Directory receiving finished module archives.
    pub fn lib_dir(&self) -> PathBuf {
        self.output_dir.join("lib")
    }

    /// Path of the fingerprint cache for this target.
    pub fn fingerprint_path(&self) -> PathBuf {
        self.output_dir.join("fingerprints.json")
    }

    /// The toolchain in use.
    pub fn toolchain(&self) -> &dyn Toolchain {
        self.toolchain.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::toolchain::{GnuToolchain, ToolchainFamily};
    use crate::core::target_context::{Configuration, Platform};
    use semver::Version;

    fn test_context() -> BuildContext {
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
        BuildContext::with_toolchain(Path::new("/proj"), target, 8, toolchain)
    }

    #[test]
    fn test_output_layout_is_per_target() {
        let ctx = test_context();
        assert_eq!(
            ctx.output_dir,
            PathBuf::from("/proj/.gantry/target/linux-development")
        );
        assert_eq!(
            ctx.module_intermediate_dir(ModuleId::new("CameraCore")),
            PathBuf::from("/proj/.gantry/target/linux-development/intermediate/CameraCore")
        );
    }
}

//! Module.toml and Gantry.toml parsing.
//!
//! A module root holds a `Module.toml` declaring its precompiled-header
//! policy, unity-build setting, and public/private dependency module
//! names. The project root holds a `Gantry.toml` naming the project and
//! the directories to scan for modules.

use std::path::{Path, PathBuf};

use semver::VersionReq;
use serde::{Deserialize, Serialize};

use crate::core::descriptor::PchMode;
use crate::core::target_context::{Configuration, Platform};
use crate::util::diagnostic::ConfigurationError;

/// File name of a module manifest.
pub const MODULE_MANIFEST: &str = "Module.toml";

/// Default source globs for a module with no explicit `sources` key.
pub const DEFAULT_SOURCES: &[&str] = &["Private/**/*.cpp", "Private/**/*.c"];

/// The parsed Module.toml manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleManifest {
    /// Module name
    pub name: String,

    /// Precompiled-header policy
    pub pch: PchMode,

    /// Whether the orchestrator may batch this module's sources into
    /// unity translation units
    pub unity: bool,

    /// Whether the module links from a prebuilt artifact instead of
    /// compiling from source
    pub precompiled: bool,

    /// Header seeding the private PCH unit, relative to the module root
    pub pch_header: Option<PathBuf>,

    /// Source globs relative to the module root
    pub sources: Vec<String>,

    /// Dependencies re-exported to this module's dependents
    pub public_deps: Vec<String>,

    /// Dependencies linked but not re-exported
    pub private_deps: Vec<String>,

    /// Platform/configuration-conditional extra dependencies
    pub conditionals: Vec<ConditionalDeps>,

    /// Path of the manifest this was parsed from
    pub manifest_path: PathBuf,
}

/// Extra dependencies applied when the target context matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalDeps {
    /// Required platform, if any
    #[serde(default)]
    pub platform: Option<Platform>,

    /// Required configuration, if any
    #[serde(default)]
    pub configuration: Option<Configuration>,

    /// Additional public dependencies
    #[serde(default)]
    pub public: Vec<String>,

    /// Additional private dependencies
    #[serde(default)]
    pub private: Vec<String>,
}

impl ConditionalDeps {
    /// Check whether this section applies to the given platform and
    /// configuration.
    pub fn matches(&self, platform: Platform, configuration: Configuration) -> bool {
        if let Some(p) = self.platform {
            if p != platform {
                return false;
            }
        }
        if let Some(c) = self.configuration {
            if c != configuration {
                return false;
            }
        }
        true
    }
}

/// Raw TOML schema for Module.toml.
#[derive(Debug, Deserialize)]
struct ModuleManifestToml {
    module: ModuleSectionToml,

    #[serde(default)]
    dependencies: DependenciesToml,

    #[serde(default, rename = "when")]
    conditionals: Vec<ConditionalDeps>,
}

#[derive(Debug, Deserialize)]
struct ModuleSectionToml {
    name: String,

    #[serde(default)]
    pch: PchMode,

    #[serde(default = "default_unity")]
    unity: bool,

    #[serde(default)]
    precompiled: bool,

    #[serde(default)]
    pch_header: Option<PathBuf>,

    #[serde(default)]
    sources: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct DependenciesToml {
    #[serde(default)]
    public: Vec<String>,

    #[serde(default)]
    private: Vec<String>,
}

fn default_unity() -> bool {
    true
}

impl ModuleManifest {
    /// Parse a Module.toml file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigurationError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ConfigurationError::new(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&text, path)
    }

    /// Parse manifest text. `path` is used for error attribution only.
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigurationError> {
        let raw: ModuleManifestToml = toml::from_str(text).map_err(|e| {
            let mut err = ConfigurationError::new(e.message().to_string())
                .with_source(path.display().to_string(), text.to_string());
            if let Some(span) = e.span() {
                err = err.with_span(span);
            }
            err
        })?;

        Ok(ModuleManifest {
            name: raw.module.name,
            pch: raw.module.pch,
            unity: raw.module.unity,
            precompiled: raw.module.precompiled,
            pch_header: raw.module.pch_header,
            sources: raw
                .module
                .sources
                .unwrap_or_else(|| DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect()),
            public_deps: raw.dependencies.public,
            private_deps: raw.dependencies.private,
            conditionals: raw.conditionals,
            manifest_path: path.to_path_buf(),
        })
    }
}

/// File name of the project manifest.
/// (Kept here next to MODULE_MANIFEST; re-exported by `core::project`.)
pub const PROJECT_MANIFEST: &str = "Gantry.toml";

/// The parsed Gantry.toml project manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectManifest {
    /// Project name
    pub name: String,

    /// Engine version requirement, checked against the target context
    pub engine: Option<VersionReq>,

    /// Glob patterns for directories to scan for modules
    pub module_dirs: Vec<String>,

    /// Number of source files per unity batch
    pub unity_batch_size: usize,
}

/// Raw TOML schema for Gantry.toml.
#[derive(Debug, Deserialize)]
struct ProjectManifestToml {
    project: ProjectSectionToml,
}

#[derive(Debug, Deserialize)]
struct ProjectSectionToml {
    name: String,

    #[serde(default)]
    engine: Option<VersionReq>,

    #[serde(default = "default_module_dirs")]
    module_dirs: Vec<String>,

    #[serde(default = "default_unity_batch_size")]
    unity_batch_size: usize,
}

fn default_module_dirs() -> Vec<String> {
    vec!["Source".to_string(), "Plugins/*/Source".to_string()]
}

fn default_unity_batch_size() -> usize {
    8
}

impl ProjectManifest {
    /// Parse a Gantry.toml file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigurationError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ConfigurationError::new(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&text, path)
    }

    /// Parse project manifest text. `path` is used for error attribution only.
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigurationError> {
        let raw: ProjectManifestToml = toml::from_str(text).map_err(|e| {
            let mut err = ConfigurationError::new(e.message().to_string())
                .with_source(path.display().to_string(), text.to_string());
            if let Some(span) = e.span() {
                err = err.with_span(span);
            }
            err
        })?;

        if raw.project.unity_batch_size == 0 {
            return Err(ConfigurationError::new(
                "unity_batch_size must be at least 1",
            )
            .with_source(path.display().to_string(), text.to_string()));
        }

        Ok(ProjectManifest {
            name: raw.project.name,
            engine: raw.project.engine,
            module_dirs: raw.project.module_dirs,
            unity_batch_size: raw.project.unity_batch_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_module_manifest() {
        let text = r#"
[module]
name = "CameraCore"
"#;
        let m = ModuleManifest::parse(text, Path::new("Module.toml")).unwrap();
        assert_eq!(m.name, "CameraCore");
        assert_eq!(m.pch, PchMode::ExplicitOrShared);
        assert!(m.unity);
        assert!(!m.precompiled);
        assert_eq!(m.sources, DEFAULT_SOURCES);
        assert!(m.public_deps.is_empty());
    }

    #[test]
    fn test_parse_full_module_manifest() {
        let text = r#"
[module]
name = "CameraEditor"
pch = "explicit_or_shared"
unity = false
precompiled = false
pch_header = "Public/CameraEditor.h"

[dependencies]
public = ["Core", "PropertyEditor"]
private = ["CoreUObject", "Engine", "Slate", "CameraCore"]
"#;
        let m = ModuleManifest::parse(text, Path::new("Module.toml")).unwrap();
        assert_eq!(m.name, "CameraEditor");
        assert!(!m.unity);
        assert_eq!(m.pch_header.as_deref(), Some(Path::new("Public/CameraEditor.h")));
        assert_eq!(m.public_deps, vec!["Core", "PropertyEditor"]);
        assert_eq!(m.private_deps.len(), 4);
    }

    #[test]
    fn test_parse_conditional_deps() {
        let text = r#"
[module]
name = "Render"

[[when]]
platform = "windows"
private = ["D3DBackend"]

[[when]]
configuration = "shipping"
private = ["CrashUploader"]
"#;
        let m = ModuleManifest::parse(text, Path::new("Module.toml")).unwrap();
        assert_eq!(m.conditionals.len(), 2);
        assert!(m.conditionals[0].matches(Platform::Windows, Configuration::Debug));
        assert!(!m.conditionals[0].matches(Platform::Linux, Configuration::Debug));
        assert!(m.conditionals[1].matches(Platform::Linux, Configuration::Shipping));
    }

    #[test]
    fn test_parse_error_carries_source() {
        let text = "[module]\nname = 42\n";
        let err = ModuleManifest::parse(text, Path::new("Bad/Module.toml")).unwrap_err();
        assert!(err.src.is_some());
    }

    #[test]
    fn test_parse_project_manifest() {
        let text = r#"
[project]
name = "CameraSuite"
engine = ">=5.3"
module_dirs = ["Source"]
"#;
        let p = ProjectManifest::parse(text, Path::new("Gantry.toml")).unwrap();
        assert_eq!(p.name, "CameraSuite");
        assert!(p.engine.is_some());
        assert_eq!(p.module_dirs, vec!["Source"]);
        assert_eq!(p.unity_batch_size, 8);
    }

    #[test]
    fn test_project_manifest_rejects_zero_batch() {
        let text = r#"
[project]
name = "P"
unity_batch_size = 0
"#;
        assert!(ProjectManifest::parse(text, Path::new("Gantry.toml")).is_err());
    }
}

//! Module descriptor - the immutable per-module build declaration.
//!
//! A descriptor configures compilation for exactly one module: its
//! precompiled-header strategy, unity-batching eligibility, and the set of
//! modules whose public interface it re-exports (public dependencies)
//! versus links against privately. It is constructed once per module per
//! build invocation from the manifest and an explicit [`TargetContext`],
//! and is read-only afterwards.
//!
//! Construction never fails on dependency existence; whether the named
//! modules exist is checked later, at graph resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::manifest::ModuleManifest;
use crate::core::module_id::{is_valid_module_name, ModuleId};
use crate::core::target_context::TargetContext;
use crate::util::diagnostic::ConfigurationError;

/// Precompiled-header policy for a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PchMode {
    /// Use the module's own PCH header if declared, otherwise a shared one
    #[default]
    ExplicitOrShared,

    /// No precompiled headers for this module
    #[serde(rename = "none")]
    Disabled,
}

/// The immutable build declaration for one module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleDescriptor {
    name: ModuleId,
    pch_mode: PchMode,
    unity: bool,
    precompiled: bool,
    pch_header: Option<PathBuf>,
    sources: Vec<String>,
    public_deps: Vec<ModuleId>,
    private_deps: Vec<ModuleId>,
    root: PathBuf,
}

impl ModuleDescriptor {
    /// Start building a descriptor.
    pub fn builder(name: impl Into<ModuleId>) -> ModuleDescriptorBuilder {
        ModuleDescriptorBuilder::new(name)
    }

    /// Construct a descriptor from a parsed manifest and target context.
    ///
    /// Deterministic and side-effect-free: the same manifest, root, and
    /// context always yield an equal descriptor. Conditional dependency
    /// sections are applied in declaration order when they match the
    /// context.
    pub fn from_manifest(
        manifest: &ModuleManifest,
        root: &Path,
        target: &TargetContext,
    ) -> Result<Self, ConfigurationError> {
        let mut builder = ModuleDescriptor::builder(manifest.name.as_str())
            .pch_mode(manifest.pch)
            .unity(manifest.unity)
            .precompiled(manifest.precompiled)
            .sources(manifest.sources.clone())
            .root(root);

        if let Some(ref header) = manifest.pch_header {
            builder = builder.pch_header(header);
        }

        for dep in &manifest.public_deps {
            builder = builder.public_dep(dep.as_str());
        }
        for dep in &manifest.private_deps {
            builder = builder.private_dep(dep.as_str());
        }

        for cond in &manifest.conditionals {
            if cond.matches(target.platform, target.configuration) {
                for dep in &cond.public {
                    builder = builder.public_dep(dep.as_str());
                }
                for dep in &cond.private {
                    builder = builder.private_dep(dep.as_str());
                }
            }
        }

        builder.finish().map_err(|e| {
            // Point the error at the manifest it came from
            if let Ok(text) = std::fs::read_to_string(&manifest.manifest_path) {
                e.with_source(manifest.manifest_path.display().to_string(), text)
            } else {
                e
            }
        })
    }

    /// Get the module name.
    pub fn name(&self) -> ModuleId {
        self.name
    }

    /// Get the PCH policy.
    pub fn pch_mode(&self) -> PchMode {
        self.pch_mode
    }

    /// Whether unity batching is enabled for this module.
    pub fn unity(&self) -> bool {
        self.unity
    }

    /// Whether this module links from a prebuilt artifact.
    pub fn precompiled(&self) -> bool {
        self.precompiled
    }

    /// The header seeding the private PCH unit, relative to the root.
    pub fn pch_header(&self) -> Option<&Path> {
        self.pch_header.as_deref()
    }

    /// Source globs relative to the module root.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Dependencies re-exported to this module's dependents, in
    /// declaration order.
    pub fn public_deps(&self) -> &[ModuleId] {
        &self.public_deps
    }

    /// Dependencies linked but not re-exported, in declaration order.
    pub fn private_deps(&self) -> &[ModuleId] {
        &self.private_deps
    }

    /// All direct dependencies, public first.
    pub fn all_deps(&self) -> impl Iterator<Item = ModuleId> + '_ {
        self.public_deps
            .iter()
            .chain(self.private_deps.iter())
            .copied()
    }

    /// The module's source root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The module's public include directory.
    pub fn public_include_dir(&self) -> PathBuf {
        self.root.join("Public")
    }

    /// The module's private include directory.
    pub fn private_include_dir(&self) -> PathBuf {
        self.root.join("Private")
    }
}

/// Builder for [`ModuleDescriptor`].
///
/// The descriptor is finalized by [`finish`](Self::finish); until then no
/// validation has happened and nothing has been handed to the resolver.
#[derive(Debug, Clone)]
pub struct ModuleDescriptorBuilder {
    name: ModuleId,
    pch_mode: PchMode,
    unity: bool,
    precompiled: bool,
    pch_header: Option<PathBuf>,
    sources: Vec<String>,
    public_deps: Vec<ModuleId>,
    private_deps: Vec<ModuleId>,
    root: PathBuf,
}

impl ModuleDescriptorBuilder {
    /// Create a builder with engine defaults: explicit-or-shared PCH,
    /// unity batching on, compiled from source.
    pub fn new(name: impl Into<ModuleId>) -> Self {
        ModuleDescriptorBuilder {
            name: name.into(),
            pch_mode: PchMode::default(),
            unity: true,
            precompiled: false,
            pch_header: None,
            sources: Vec::new(),
            public_deps: Vec::new(),
            private_deps: Vec::new(),
            root: PathBuf::new(),
        }
    }

    /// Set the PCH policy.
    pub fn pch_mode(mut self, mode: PchMode) -> Self {
        self.pch_mode = mode;
        self
    }

    /// Enable or disable unity batching.
    pub fn unity(mut self, unity: bool) -> Self {
        self.unity = unity;
        self
    }

    /// Mark the module as linked from a prebuilt artifact.
    pub fn precompiled(mut self, precompiled: bool) -> Self {
        self.precompiled = precompiled;
        self
    }

    /// Set the private PCH header path (relative to the module root).
    pub fn pch_header(mut self, header: impl Into<PathBuf>) -> Self {
        self.pch_header = Some(header.into());
        self
    }

    /// Set the source globs.
    pub fn sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    /// Set the module source root.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Append a public dependency. Repeated names are kept once, in
    /// first-declaration order.
    pub fn public_dep(mut self, dep: impl Into<ModuleId>) -> Self {
        let dep = dep.into();
        if !self.public_deps.contains(&dep) {
            self.public_deps.push(dep);
        }
        self
    }

    /// Append a private dependency. Repeated names are kept once, in
    /// first-declaration order.
    pub fn private_dep(mut self, dep: impl Into<ModuleId>) -> Self {
        let dep = dep.into();
        if !self.private_deps.contains(&dep) {
            self.private_deps.push(dep);
        }
        self
    }

    /// Validate and finalize the descriptor.
    pub fn finish(self) -> Result<ModuleDescriptor, ConfigurationError> {
        if !is_valid_module_name(self.name.as_str()) {
            return Err(ConfigurationError::new(format!(
                "`{}` is not a valid module name",
                self.name
            ))
            .with_help("module names are non-empty and contain only [A-Za-z0-9_-]"));
        }

        if let Some(ref header) = self.pch_header {
            if header.is_absolute() {
                return Err(ConfigurationError::new(format!(
                    "module `{}`: pch_header must be relative to the module root",
                    self.name
                )));
            }
        }

        if let Some(dup) = self
            .public_deps
            .iter()
            .find(|d| self.private_deps.contains(d))
        {
            return Err(ConfigurationError::new(format!(
                "module `{}` declares `{}` as both a public and a private dependency",
                self.name, dup
            ))
            .with_help("a dependency is either re-exported or internal, not both"));
        }

        Ok(ModuleDescriptor {
            name: self.name,
            pch_mode: self.pch_mode,
            unity: self.unity,
            precompiled: self.precompiled,
            pch_header: self.pch_header,
            sources: self.sources,
            public_deps: self.public_deps,
            private_deps: self.private_deps,
            root: self.root,
        })
    }
}

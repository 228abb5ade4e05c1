//! Filesystem module discovery.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::core::manifest::{ModuleManifest, MODULE_MANIFEST};
use crate::discovery::{DiscoveredModule, ModuleDiscovery};

/// Directory names never descended into while scanning.
const SKIP_DIRS: &[&str] = &[".git", ".gantry", "Binaries", "Intermediate"];

/// Scans configured project directories for Module.toml files.
#[derive(Debug)]
pub struct FsDiscovery {
    /// Project root
    root: PathBuf,

    /// Glob patterns (relative to the root) naming directories to scan
    module_dirs: Vec<String>,
}

impl FsDiscovery {
    /// Create a scanner for the given project root and directory globs.
    pub fn new(root: impl Into<PathBuf>, module_dirs: Vec<String>) -> Self {
        FsDiscovery {
            root: root.into(),
            module_dirs,
        }
    }

    /// Expand the configured directory globs into existing scan roots.
    fn scan_roots(&self) -> Result<Vec<PathBuf>> {
        let mut roots = Vec::new();

        for pattern in &self.module_dirs {
            let full = self.root.join(pattern);
            let pattern_str = full.to_string_lossy();

            for entry in glob::glob(&pattern_str)
                .with_context(|| format!("invalid module_dirs pattern: {}", pattern))?
            {
                match entry {
                    Ok(path) if path.is_dir() => roots.push(path),
                    Ok(_) => {}
                    Err(e) => tracing::warn!("module_dirs glob error: {}", e),
                }
            }
        }

        roots.sort();
        roots.dedup();
        Ok(roots)
    }
}

impl ModuleDiscovery for FsDiscovery {
    fn discover(&self) -> Result<Vec<DiscoveredModule>> {
        let mut modules = Vec::new();

        for scan_root in self.scan_roots()? {
            for entry in WalkDir::new(&scan_root)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| !is_skipped(e.path()))
            {
                let entry = entry
                    .with_context(|| format!("failed to scan {}", scan_root.display()))?;

                if entry.file_type().is_file() && entry.file_name() == MODULE_MANIFEST {
                    let manifest_path = entry.path();
                    let manifest = ModuleManifest::from_path(manifest_path)?;
                    let root = manifest_path
                        .parent()
                        .context("module manifest has no parent directory")?
                        .to_path_buf();

                    tracing::debug!("discovered module `{}` at {}", manifest.name, root.display());
                    modules.push(DiscoveredModule { root, manifest });
                }
            }
        }

        Ok(modules)
    }
}

fn is_skipped(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| SKIP_DIRS.contains(&n))
}

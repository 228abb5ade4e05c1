//! Global context for Gantry operations.
//!
//! Provides centralized access to paths and environment. Target-specific
//! configuration lives in [`crate::core::target_context::TargetContext`],
//! which is threaded explicitly through graph construction and planning
//! rather than held as ambient state here.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::project::PROJECT_MANIFEST;

/// Global context containing paths and output settings.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;

        Ok(GlobalContext { cwd })
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        GlobalContext { cwd }
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Find the project manifest (Gantry.toml), searching from cwd upward.
    pub fn find_manifest(&self) -> Option<PathBuf> {
        let mut current = self.cwd.clone();
        loop {
            let candidate = current.join(PROJECT_MANIFEST);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Find the project root (directory containing Gantry.toml).
    pub fn find_project_root(&self) -> Option<PathBuf> {
        self.find_manifest()
            .and_then(|p| p.parent().map(|d| d.to_path_buf()))
    }
}

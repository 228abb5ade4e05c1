//! Filesystem helpers for build outputs and source discovery.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Create a directory and its parents if missing.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))
}

/// Write a file, creating parent directories as needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write file: {}", path.display()))
}

/// Collect files matching glob patterns relative to `base`.
///
/// The result is sorted and deduplicated so plans come out identical
/// regardless of filesystem iteration order.
pub fn glob_files<S: AsRef<str>>(base: &Path, patterns: &[S]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for pattern in patterns {
        let pattern = pattern.as_ref();
        let full = base.join(pattern).to_string_lossy().into_owned();
        let matches =
            glob::glob(&full).with_context(|| format!("invalid glob pattern: {}", pattern))?;

        for entry in matches {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => tracing::warn!("skipping unreadable path: {}", e),
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

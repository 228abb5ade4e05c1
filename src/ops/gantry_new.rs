//! Implementation of `gantry new`.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::core::manifest::{MODULE_MANIFEST, PROJECT_MANIFEST};
use crate::core::module_id::is_valid_module_name;

/// Create a new Gantry project with one starter module.
pub fn new_project(path: &Path, name: &str) -> Result<()> {
    if !is_valid_module_name(name) {
        bail!("`{}` is not a valid project name (use [A-Za-z0-9_-])", name);
    }

    if path.exists() {
        bail!("destination `{}` already exists", path.display());
    }
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))?;

    let manifest = format!(
        r#"[project]
name = "{name}"
engine = ">=5.0"

# module_dirs = ["Source", "Plugins/*/Source"]
# unity_batch_size = 8
"#,
        name = name
    );
    fs::write(path.join(PROJECT_MANIFEST), manifest)
        .with_context(|| format!("failed to write {}", PROJECT_MANIFEST))?;

    new_module(path, name)?;

    let gitignore = "# Gantry build artifacts\n.gantry/\n";
    fs::write(path.join(".gitignore"), gitignore)?;

    Ok(())
}

/// Add a module skeleton under `Source/<name>` of an existing project.
pub fn new_module(project_root: &Path, name: &str) -> Result<()> {
    if !is_valid_module_name(name) {
        bail!("`{}` is not a valid module name (use [A-Za-z0-9_-])", name);
    }

    let module_root = project_root.join("Source").join(name);
    if module_root.join(MODULE_MANIFEST).exists() {
        bail!("module `{}` already exists at {}", name, module_root.display());
    }

    let public = module_root.join("Public");
    let private = module_root.join("Private");
    fs::create_dir_all(&public).context("failed to create Public directory")?;
    fs::create_dir_all(&private).context("failed to create Private directory")?;

    let manifest = format!(
        r#"[module]
name = "{name}"
pch_header = "Public/{name}.h"

[dependencies]
public = []
private = []
"#,
        name = name
    );
    fs::write(module_root.join(MODULE_MANIFEST), manifest)
        .with_context(|| format!("failed to write {}", MODULE_MANIFEST))?;

    let header = format!(
        r#"#pragma once

// Shared includes for the {name} module. Everything here is precompiled.
"#,
        name = name
    );
    fs::write(public.join(format!("{}.h", name)), header)?;

    let source = format!(
        r#"#include "{name}.h"
"#,
        name = name
    );
    fs::write(private.join(format!("{}.cpp", name)), source)?;

    Ok(())
}

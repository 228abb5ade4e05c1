//! Unity-batch generation.
//!
//! Unity batching concatenates several translation units into one generated
//! file so the compiler front-end runs once per batch instead of once per
//! source. Batches are formed from the sorted source list, so the same
//! module always produces the same batch files.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::module_id::ModuleId;
use crate::util::fs::write_string;

/// Split sorted sources into batches of at most `batch_size` files.
pub fn unity_batches(sources: &[PathBuf], batch_size: usize) -> Vec<Vec<PathBuf>> {
    if batch_size == 0 {
        return vec![sources.to_vec()];
    }
    sources.chunks(batch_size).map(<[PathBuf]>::to_vec).collect()
}

/// Write the generated unity file for one batch and return its path.
///
/// Included paths are absolute, so the generated file can live anywhere in
/// the intermediate tree.
pub fn write_unity_file(
    module: ModuleId,
    batch_index: usize,
    batch: &[PathBuf],
    out_dir: &Path,
) -> Result<PathBuf> {
    let mut content = String::new();
    content.push_str(&format!(
        "// Generated unity batch {} for module {}. Do not edit.\n",
        batch_index, module
    ));
    for source in batch {
        content.push_str(&format!("#include \"{}\"\n", source.display()));
    }

    let path = out_dir.join(format!("Unity_{}_{}.cpp", module, batch_index));
    write_string(&path, &content)?;
    Ok(path)
}

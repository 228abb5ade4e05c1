//! Build fingerprinting.
//!
//! A module's fingerprint covers its descriptor, the target context, the
//! contents of its source and header files, and the fingerprints of its
//! direct dependencies. The dependency chain means a header edit anywhere
//! below a module changes its fingerprint too. When the fingerprint
//! matches the cached one from the previous build and the artifact still
//! exists, the module is reported up to date and skipped.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::core::descriptor::{ModuleDescriptor, PchMode};
use crate::core::target_context::TargetContext;
use crate::util::hash::{sha256_file, Fingerprint};

/// Compute the fingerprint of one module for one target.
///
/// `inputs` is the module's own files (sources and headers);
/// `dep_fingerprints` chains in direct dependencies, in a stable order.
pub fn module_fingerprint(
    desc: &ModuleDescriptor,
    target: &TargetContext,
    inputs: &[PathBuf],
    dep_fingerprints: &[&str],
) -> Result<String> {
    let mut fp = Fingerprint::new();

    fp.update_str(desc.name().as_str());
    fp.update_bool(desc.unity());
    fp.update_bool(desc.precompiled());
    fp.update_bool(matches!(desc.pch_mode(), PchMode::ExplicitOrShared));
    fp.update_opt(desc.pch_header().map(|p| p.to_str().unwrap_or_default()));
    fp.update_strs(desc.public_deps().iter().map(|d| d.as_str()));
    fp.update_strs(desc.private_deps().iter().map(|d| d.as_str()));

    fp.update_str(&target.triple());
    fp.update_str(&target.engine_version.to_string());

    for input in inputs {
        fp.update_str(&input.display().to_string());
        fp.update_str(&sha256_file(input)?);
    }

    fp.update_strs(dep_fingerprints.iter().copied());

    Ok(fp.finish())
}

/// Persisted fingerprints from the previous build of one target.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FingerprintCache {
    /// Module fingerprints by module name
    pub modules: BTreeMap<String, String>,
}

impl FingerprintCache {
    /// Load the cache, or start empty if none exists yet.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(FingerprintCache::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save the cache.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        crate::util::fs::write_string(path, &content)
    }

    /// Check whether a module's fingerprint is unchanged.
    pub fn is_up_to_date(&self, module: &str, current: &str) -> bool {
        self.modules.get(module).is_some_and(|cached| cached == current)
    }

    /// Record a module's fingerprint after a successful build.
    pub fn update(&mut self, module: &str, fingerprint: String) {
        self.modules.insert(module.to_string(), fingerprint);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use semver::Version;
    use tempfile::TempDir;

    use crate::core::target_context::Configuration;

    fn target() -> TargetContext {
        TargetContext::host(Version::new(5, 3, 0))
    }

    fn descriptor(unity: bool) -> ModuleDescriptor {
        ModuleDescriptor::builder("CameraCore")
            .unity(unity)
            .root("/proj/CameraCore")
            .finish()
            .unwrap()
    }

    #[test]
    fn test_fingerprint_changes_with_descriptor() {
        let fp_unity = module_fingerprint(&descriptor(true), &target(), &[], &[]).unwrap();
        let fp_plain = module_fingerprint(&descriptor(false), &target(), &[], &[]).unwrap();
        assert_ne!(fp_unity, fp_plain);
    }

    #[test]
    fn test_fingerprint_changes_with_configuration() {
        let desc = descriptor(true);
        let dev = module_fingerprint(&desc, &target(), &[], &[]).unwrap();
        let ship = module_fingerprint(
            &desc,
            &target().with_configuration(Configuration::Shipping),
            &[],
            &[],
        )
        .unwrap();
        assert_ne!(dev, ship);
    }

    #[test]
    fn test_fingerprint_changes_with_input_content() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("Rig.cpp");
        let desc = descriptor(true);

        std::fs::write(&source, "int a;").unwrap();
        let before = module_fingerprint(&desc, &target(), &[source.clone()], &[]).unwrap();

        std::fs::write(&source, "int b;").unwrap();
        let after = module_fingerprint(&desc, &target(), &[source], &[]).unwrap();

        assert_ne!(before, after);
    }

    #[test]
    fn test_fingerprint_changes_with_dependency_fingerprint() {
        let desc = descriptor(true);
        let before = module_fingerprint(&desc, &target(), &[], &["aaa"]).unwrap();
        let after = module_fingerprint(&desc, &target(), &[], &["bbb"]).unwrap();

        assert_ne!(before, after);
    }

    #[test]
    fn test_cache_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("fingerprints.json");

        let mut cache = FingerprintCache::default();
        cache.update("CameraCore", "abc123".to_string());
        cache.save(&path).unwrap();

        let loaded = FingerprintCache::load(&path).unwrap();
        assert!(loaded.is_up_to_date("CameraCore", "abc123"));
        assert!(!loaded.is_up_to_date("CameraCore", "different"));
        assert!(!loaded.is_up_to_date("Unknown", "abc123"));
    }
}

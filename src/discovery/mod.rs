//! Module discovery.
//!
//! How a module name maps to a file-system location is owned by the
//! discovery layer, not by descriptors or the resolver. The default
//! implementation scans the project tree for Module.toml files; tests and
//! embedders can substitute their own source of modules.

mod fs;

use std::path::PathBuf;

use anyhow::Result;

use crate::core::manifest::ModuleManifest;

pub use fs::FsDiscovery;

/// A module found by a discovery source: its root directory and parsed
/// manifest. Descriptor construction happens later, once a target context
/// is known.
#[derive(Debug, Clone)]
pub struct DiscoveredModule {
    /// Directory containing Module.toml
    pub root: PathBuf,

    /// Parsed module manifest
    pub manifest: ModuleManifest,
}

/// A source of modules for graph construction.
pub trait ModuleDiscovery {
    /// Enumerate all modules this source knows about.
    ///
    /// Order must be deterministic so build plans are reproducible.
    fn discover(&self) -> Result<Vec<DiscoveredModule>>;
}

/// An in-memory discovery source, mainly for tests and embedding.
#[derive(Debug, Default)]
pub struct StaticDiscovery {
    modules: Vec<DiscoveredModule>,
}

impl StaticDiscovery {
    /// Create an empty static source.
    pub fn new() -> Self {
        StaticDiscovery {
            modules: Vec::new(),
        }
    }

    /// Add a module.
    pub fn add(&mut self, module: DiscoveredModule) {
        self.modules.push(module);
    }
}

impl ModuleDiscovery for StaticDiscovery {
    fn discover(&self) -> Result<Vec<DiscoveredModule>> {
        Ok(self.modules.clone())
    }
}

//! Symbol-visibility propagation over the module graph.
//!
//! Each module exports its own interface plus, transitively, the exports
//! of its public dependencies. Private dependencies are visible to the
//! module itself but stop there: they never leak to dependents.

use std::collections::{BTreeSet, HashMap};

use crate::core::module_id::ModuleId;
use crate::resolver::graph::{DepKind, ModuleGraph};

/// Per-module export and compile-visibility sets.
///
/// Computed once per resolved graph, dependencies first, so every lookup
/// afterwards is a map access. Sets are ordered so plan output is stable.
#[derive(Debug)]
pub struct VisibilityMap {
    /// What each module re-exports to its dependents (itself included)
    exports: HashMap<ModuleId, BTreeSet<ModuleId>>,

    /// What each module can see while compiling (itself included)
    visible: HashMap<ModuleId, BTreeSet<ModuleId>>,
}

impl VisibilityMap {
    /// Compute visibility for every module in the graph.
    ///
    /// Walks in topological order, so a module's public dependencies
    /// always have their export sets ready when the module is reached.
    pub fn compute(graph: &ModuleGraph) -> Self {
        let mut exports: HashMap<ModuleId, BTreeSet<ModuleId>> = HashMap::new();
        let mut visible: HashMap<ModuleId, BTreeSet<ModuleId>> = HashMap::new();

        for id in graph.topological_order() {
            let mut own_exports = BTreeSet::new();
            own_exports.insert(id);

            // Private edges pull the dependency's exports into compile
            // visibility only; they are never forwarded
            let mut private_visible = BTreeSet::new();

            for (dep, kind) in graph.deps_with_kind(id) {
                if let Some(dep_exports) = exports.get(&dep) {
                    match kind {
                        DepKind::Public => own_exports.extend(dep_exports.iter().copied()),
                        DepKind::Private => {
                            private_visible.extend(dep_exports.iter().copied())
                        }
                    }
                }
            }

            let mut own_visible = own_exports.clone();
            own_visible.extend(private_visible);

            exports.insert(id, own_exports);
            visible.insert(id, own_visible);
        }

        VisibilityMap { exports, visible }
    }

    /// Modules whose interface the given module re-exports, itself
    /// included.
    pub fn exports(&self, id: ModuleId) -> Option<&BTreeSet<ModuleId>> {
        self.exports.get(&id)
    }

    /// Modules visible while compiling the given module, itself included.
    pub fn compile_visibility(&self, id: ModuleId) -> Option<&BTreeSet<ModuleId>> {
        self.visible.get(&id)
    }
}

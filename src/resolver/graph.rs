//! The resolved module graph.
//!
//! Once created, a ModuleGraph is read-only. Descriptors live in an arena
//! and all graph work runs on integer node indices; module names are only
//! looked up once, while the graph is being built.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{EdgeRef, Topo};

use crate::core::descriptor::ModuleDescriptor;
use crate::core::module_id::ModuleId;
use crate::resolver::errors::ResolveError;

/// Whether an edge re-exports the dependency's interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepKind {
    /// Interface propagates to the dependent's own dependents
    Public,
    /// Linked internally, not re-exported
    Private,
}

/// The resolved, validated module dependency graph.
///
/// Construction fails if any declared dependency does not resolve to a
/// known module, or if the graph (public and private edges alike)
/// contains a cycle. A successfully constructed graph therefore always
/// has a topological order.
#[derive(Debug)]
pub struct ModuleGraph {
    /// Descriptor arena, in discovery order
    descriptors: Vec<ModuleDescriptor>,

    /// Dependency graph; node weights index into the arena
    graph: DiGraph<usize, DepKind>,

    /// Map from module ID to graph node
    nodes: HashMap<ModuleId, NodeIndex>,
}

impl ModuleGraph {
    /// Build and validate the graph from a set of descriptors.
    pub fn resolve(descriptors: Vec<ModuleDescriptor>) -> Result<Self, ResolveError> {
        let mut graph = DiGraph::new();
        let mut nodes: HashMap<ModuleId, NodeIndex> = HashMap::new();

        // Nodes first, so forward references resolve
        for (ix, desc) in descriptors.iter().enumerate() {
            if let Some(&existing) = nodes.get(&desc.name()) {
                let first: &ModuleDescriptor = &descriptors[graph[existing]];
                return Err(ResolveError::DuplicateModule {
                    name: desc.name().to_string(),
                    first: first.root().to_path_buf(),
                    second: desc.root().to_path_buf(),
                });
            }
            let node = graph.add_node(ix);
            nodes.insert(desc.name(), node);
        }

        // Edges: module -> dependency
        for desc in &descriptors {
            let from = nodes[&desc.name()];

            for (deps, kind) in [
                (desc.public_deps(), DepKind::Public),
                (desc.private_deps(), DepKind::Private),
            ] {
                for dep in deps {
                    let to = *nodes.get(dep).ok_or_else(|| {
                        ResolveError::UnresolvedDependency {
                            module: desc.name().to_string(),
                            dependency: dep.to_string(),
                        }
                    })?;
                    graph.add_edge(from, to, kind);
                }
            }
        }

        let resolved = ModuleGraph {
            descriptors,
            graph,
            nodes,
        };

        // Cycles fail the whole build before any compilation starts
        if let Some(cycle) = resolved.find_cycle() {
            return Err(ResolveError::CycleDetected { modules: cycle });
        }

        Ok(resolved)
    }

    /// Find a dependency cycle, if any, as a closed path of module names.
    fn find_cycle(&self) -> Option<Vec<String>> {
        // Self-edges are the degenerate case tarjan_scc does not flag
        for edge in self.graph.edge_indices() {
            let (a, b) = self.graph.edge_endpoints(edge)?;
            if a == b {
                let name = self.descriptors[self.graph[a]].name().to_string();
                return Some(vec![name.clone(), name]);
            }
        }

        for scc in petgraph::algo::tarjan_scc(&self.graph) {
            if scc.len() > 1 {
                let mut names: Vec<String> = scc
                    .iter()
                    .map(|&n| self.descriptors[self.graph[n]].name().to_string())
                    .collect();
                // Close the path for readable reporting
                names.push(names[0].clone());
                return Some(names);
            }
        }

        None
    }

    /// Get a descriptor by module ID.
    pub fn get(&self, id: ModuleId) -> Option<&ModuleDescriptor> {
        self.nodes.get(&id).map(|&n| &self.descriptors[self.graph[n]])
    }

    /// Check if a module is in the graph.
    pub fn contains(&self, id: ModuleId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Iterate over all descriptors in discovery order.
    pub fn descriptors(&self) -> impl Iterator<Item = &ModuleDescriptor> {
        self.descriptors.iter()
    }

    /// Get the number of modules.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Check if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Get direct dependencies of a module (public and private).
    pub fn deps(&self, id: ModuleId) -> Vec<ModuleId> {
        match self.nodes.get(&id) {
            Some(&node) => self
                .graph
                .neighbors(node)
                .map(|n| self.descriptors[self.graph[n]].name())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Get modules that directly depend on the given module.
    pub fn dependents(&self, id: ModuleId) -> Vec<ModuleId> {
        match self.nodes.get(&id) {
            Some(&node) => self
                .graph
                .neighbors_directed(node, petgraph::Direction::Incoming)
                .map(|n| self.descriptors[self.graph[n]].name())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Get all modules that transitively depend on the given module.
    ///
    /// Used for failure propagation: when a module fails to compile,
    /// exactly this set becomes unbuildable.
    pub fn transitive_dependents(&self, id: ModuleId) -> Vec<ModuleId> {
        let mut visited = std::collections::HashSet::new();
        let mut stack = vec![id];

        while let Some(current) = stack.pop() {
            if visited.insert(current) {
                for dep in self.dependents(current) {
                    stack.push(dep);
                }
            }
        }

        visited.remove(&id);
        let mut result: Vec<ModuleId> = visited.into_iter().collect();
        result.sort();
        result
    }

    /// Get modules in compilation order (dependencies before dependents).
    pub fn topological_order(&self) -> Vec<ModuleId> {
        let mut topo = Topo::new(&self.graph);
        let mut order = Vec::with_capacity(self.descriptors.len());

        while let Some(node) = topo.next(&self.graph) {
            order.push(self.descriptors[self.graph[node]].name());
        }

        // Edges point from dependent to dependency, so Topo emits
        // dependents first. Reverse to compile dependencies first.
        order.reverse();
        order
    }

    /// Get direct dependencies of a module together with their edge kind,
    /// in declaration order (public deps first, then private).
    pub fn deps_with_kind(&self, id: ModuleId) -> Vec<(ModuleId, DepKind)> {
        match self.nodes.get(&id) {
            Some(&node) => {
                let mut deps: Vec<(ModuleId, DepKind)> = self
                    .graph
                    .edges(node)
                    .map(|edge| {
                        let dep = self.descriptors[self.graph[edge.target()]].name();
                        (dep, *edge.weight())
                    })
                    .collect();
                // petgraph yields edges newest-first
                deps.reverse();
                deps
            }
            None => Vec::new(),
        }
    }

    /// Get a module's public dependency edges.
    pub fn public_deps(&self, id: ModuleId) -> Vec<ModuleId> {
        self.deps_with_kind(id)
            .into_iter()
            .filter(|&(_, kind)| kind == DepKind::Public)
            .map(|(dep, _)| dep)
            .collect()
    }
}

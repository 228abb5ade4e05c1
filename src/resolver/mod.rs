//! Module-graph resolution.
//!
//! Turns a flat set of module descriptors into a validated dependency
//! graph with a deterministic compilation order and per-module visibility
//! sets. All structural errors (unknown dependencies, duplicate names,
//! cycles) surface here, before any compilation is attempted.

pub mod errors;
pub mod graph;
pub mod visibility;

pub use errors::ResolveError;
pub use graph::{DepKind, ModuleGraph};
pub use visibility::VisibilityMap;

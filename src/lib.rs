//! Gantry - a build orchestrator for engine-style module trees
//!
//! This crate provides the core library functionality for Gantry,
//! including module discovery, dependency-graph resolution, build
//! planning, and execution.

pub mod builder;
pub mod core;
pub mod discovery;
pub mod ops;
pub mod resolver;
pub mod util;

pub use crate::core::{
    descriptor::ModuleDescriptor, manifest::ModuleManifest, module_id::ModuleId, project::Project,
    target_context::TargetContext,
};

pub use resolver::ModuleGraph;
pub use util::context::GlobalContext;

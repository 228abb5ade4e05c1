//! Core types: module identity, descriptors, manifests, and projects.

pub mod descriptor;
pub mod manifest;
pub mod module_id;
pub mod project;
pub mod target_context;

pub use descriptor::{ModuleDescriptor, PchMode};
pub use manifest::{ModuleManifest, ProjectManifest};
pub use module_id::ModuleId;
pub use project::Project;
pub use target_context::{Configuration, Platform, TargetContext};

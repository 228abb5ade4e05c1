//! High-level operations backing the CLI commands.

pub mod gantry_build;
pub mod gantry_new;
pub mod resolve;

pub use resolve::{resolve_project, ResolvedProject};

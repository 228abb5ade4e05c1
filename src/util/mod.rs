//! Shared utilities.

pub mod context;
pub mod diagnostic;
pub mod fs;
pub mod hash;

pub use context::GlobalContext;

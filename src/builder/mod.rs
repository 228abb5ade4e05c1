//! Build planning and execution.

pub mod context;
pub mod errors;
pub mod executor;
pub mod fingerprint;
pub mod plan;
pub mod toolchain;
pub mod unity;

pub use context::BuildContext;
pub use errors::BuildError;
pub use executor::{BuildExecutor, BuildReport, ModuleState};
pub use plan::BuildPlan;

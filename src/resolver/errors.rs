//! Graph-resolution error types and diagnostics.

use std::path::PathBuf;

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error during module-graph resolution.
///
/// All of these abort the build before any compilation starts.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("module `{module}` depends on unknown module `{dependency}`")]
    UnresolvedDependency { module: String, dependency: String },

    #[error("cycle detected in module graph")]
    CycleDetected { modules: Vec<String> },

    #[error("duplicate module name `{name}`")]
    DuplicateModule {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },
}

impl ResolveError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::UnresolvedDependency { module, dependency } => {
                Diagnostic::error(format!(
                    "module `{}` depends on unknown module `{}`",
                    module, dependency
                ))
                .with_context(format!("`{}` was not found by module discovery", dependency))
                .with_suggestion(format!(
                    "Check the spelling of `{}` in `{}`'s Module.toml",
                    dependency, module
                ))
                .with_suggestion(suggestions::MODULE_NOT_FOUND.trim_start_matches("help: "))
            }

            ResolveError::CycleDetected { modules } => {
                Diagnostic::error("cycle detected in module graph")
                    .with_context(format!("cycle: {}", modules.join(" -> ")))
                    .with_suggestion(
                        "Break the cycle by removing or restructuring dependencies".to_string(),
                    )
                    .with_suggestion(
                        suggestions::BREAK_CYCLE.trim_start_matches("help: ").to_string(),
                    )
            }

            ResolveError::DuplicateModule { name, first, second } => {
                Diagnostic::error(format!("duplicate module name `{}`", name))
                    .with_context(format!("first declared at {}", first.display()))
                    .with_context(format!("declared again at {}", second.display()))
                    .with_suggestion("Rename one of the modules".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_dependency_diagnostic() {
        let err = ResolveError::UnresolvedDependency {
            module: "CameraEditor".to_string(),
            dependency: "Zeta".to_string(),
        };

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("CameraEditor"));
        assert!(output.contains("Zeta"));
        assert!(output.contains("help: consider:"));
    }

    #[test]
    fn test_cycle_diagnostic_lists_members() {
        let err = ResolveError::CycleDetected {
            modules: vec!["A".to_string(), "B".to_string(), "A".to_string()],
        };

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("cycle: A -> B -> A"));
    }
}

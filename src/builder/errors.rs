//! Compile-time error types.
//!
//! Unlike resolution errors, these are scoped to a single module: the
//! executor records them, blocks the module's transitive dependents, and
//! keeps compiling everything else.

use std::path::PathBuf;

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error while building one module.
///
/// Paths are plain data here, never an error cause, so the failing file
/// field is not named `source`.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("module `{module}`: declared PCH header `{}` does not exist", path.display())]
    MissingPchHeader { module: String, path: PathBuf },

    #[error("module `{module}`: failed to compile `{}`", file.display())]
    CompileFailed {
        module: String,
        file: PathBuf,
        detail: String,
    },

    #[error("module `{module}`: failed to launch `{}`: {detail}", program.display())]
    ToolchainUnavailable {
        module: String,
        program: PathBuf,
        detail: String,
    },
}

impl BuildError {
    /// The module this failure belongs to.
    pub fn module(&self) -> &str {
        match self {
            BuildError::MissingPchHeader { module, .. } => module,
            BuildError::CompileFailed { module, .. } => module,
            BuildError::ToolchainUnavailable { module, .. } => module,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            BuildError::MissingPchHeader { module, path } => Diagnostic::error(format!(
                "module `{}`: declared PCH header `{}` does not exist",
                module,
                path.display()
            ))
            .with_suggestion("Fix `pch_header` in Module.toml or set `pch = \"none\"`"),

            BuildError::CompileFailed {
                module,
                file,
                detail,
            } => Diagnostic::error(format!(
                "module `{}`: failed to compile `{}`",
                module,
                file.display()
            ))
            .with_context(detail.clone())
            .with_suggestion(suggestions::BUILD_FAILED.trim_start_matches("help: ")),

            BuildError::ToolchainUnavailable {
                module,
                program,
                detail,
            } => Diagnostic::error(format!(
                "module `{}`: failed to launch `{}`",
                module,
                program.display()
            ))
            .with_context(detail.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_pch_diagnostic() {
        let err = BuildError::MissingPchHeader {
            module: "CameraEditor".to_string(),
            path: PathBuf::from("Public/Missing.h"),
        };

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("CameraEditor"));
        assert!(output.contains("Public/Missing.h"));
        assert!(output.contains("pch = \"none\""));
    }

    #[test]
    fn test_compile_failed_carries_detail() {
        let err = BuildError::CompileFailed {
            module: "CameraCore".to_string(),
            file: PathBuf::from("Private/Rig.cpp"),
            detail: "undefined type FRotator".to_string(),
        };

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("Private/Rig.cpp"));
        assert!(output.contains("undefined type FRotator"));
    }

    #[test]
    fn test_compile_failed_has_no_error_cause() {
        use std::error::Error;

        let err = BuildError::CompileFailed {
            module: "CameraCore".to_string(),
            file: PathBuf::from("Private/Rig.cpp"),
            detail: "syntax error".to_string(),
        };

        // The failing file is data carried in the message, not a cause chain
        assert!(err.source().is_none());
        assert!(err.to_string().contains("Private/Rig.cpp"));
    }
}

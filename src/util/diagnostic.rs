//! User-friendly diagnostic messages.
//!
//! Every error surfaced to the user should carry the root cause, the
//! constraint that was violated, and a suggested fix.

use std::fmt::{self, Write};
use std::path::PathBuf;

use miette::{Diagnostic as MietteDiagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when no project manifest is found.
    pub const NO_PROJECT: &str = "help: Run `gantry new <name>` to create a new project";

    /// Suggestion when a module name is not found in the graph.
    pub const MODULE_NOT_FOUND: &str = "help: Run `gantry tree` to see all discovered modules";

    /// Suggestion when the build fails.
    pub const BUILD_FAILED: &str = "help: Run `gantry build --verbose` for more details";

    /// Suggestion when a dependency cycle is reported.
    pub const BREAK_CYCLE: &str =
        "help: Demote one edge of the cycle to a private dependency of a new shared module";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Note,
    Help,
}

impl Severity {
    fn label(self, color: bool) -> &'static str {
        match (self, color) {
            (Severity::Error, true) => "\x1b[1;31merror\x1b[0m",
            (Severity::Warning, true) => "\x1b[1;33mwarning\x1b[0m",
            (Severity::Note, true) => "\x1b[1;36mnote\x1b[0m",
            (Severity::Help, true) => "\x1b[1;32mhelp\x1b[0m",
            (Severity::Error, false) => "error",
            (Severity::Warning, false) => "warning",
            (Severity::Note, false) => "note",
            (Severity::Help, false) => "help",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label(false))
    }
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related location (file path)
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic::new(Severity::Error, message)
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic::new(Severity::Warning, message)
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add a file location.
    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut out = String::new();

        // Writing to a String cannot fail
        let _ = writeln!(out, "{}: {}", self.severity.label(color), self.message);

        if let Some(ref path) = self.location {
            let _ = writeln!(out, "  --> {}", path.display());
        }

        for ctx in &self.context {
            let _ = writeln!(out, "  -> {}", ctx);
        }

        if !self.suggestions.is_empty() {
            out.push('\n');
            let _ = writeln!(out, "{}: consider:", Severity::Help.label(color));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                let _ = writeln!(out, "  {}. {}", i + 1, suggestion);
            }
        }

        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(false))
    }
}

/// Malformed or missing attribute in a manifest.
///
/// Detected at descriptor-construction time and aborts the whole build
/// with the manifest's source location.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("invalid module configuration: {message}")]
#[diagnostic(code(gantry::config::invalid))]
pub struct ConfigurationError {
    pub message: String,
    #[source_code]
    pub src: Option<NamedSource<String>>,
    #[label("declared here")]
    pub span: Option<SourceSpan>,
    #[help]
    pub help: Option<String>,
}

impl ConfigurationError {
    /// Create a configuration error without source attribution.
    pub fn new(message: impl Into<String>) -> Self {
        ConfigurationError {
            message: message.into(),
            src: None,
            span: None,
            help: None,
        }
    }

    /// Attach the manifest text this error points into.
    pub fn with_source(mut self, name: impl AsRef<str>, text: impl Into<String>) -> Self {
        self.src = Some(NamedSource::new(name, text.into()));
        self
    }

    /// Attach the offending span within the manifest.
    pub fn with_span(mut self, span: impl Into<SourceSpan>) -> Self {
        self.span = Some(span.into());
        self
    }

    /// Attach a help message.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_formatting() {
        let diag = Diagnostic::error("cycle detected in module graph")
            .with_context("cycle: CameraCore -> CameraEditor -> CameraCore")
            .with_suggestion("Break the cycle by removing or restructuring dependencies");

        let output = diag.format(false);
        assert!(output.contains("error: cycle detected"));
        assert!(output.contains("CameraEditor"));
        assert!(output.contains("help: consider:"));
        assert!(output.contains("1. Break the cycle"));
    }

    #[test]
    fn test_diagnostic_location() {
        let diag = Diagnostic::warning("module declares no sources")
            .with_location("/proj/Source/Empty/Module.toml");

        let output = diag.format(false);
        assert!(output.contains("warning: module declares no sources"));
        assert!(output.contains("--> /proj/Source/Empty/Module.toml"));
    }

    #[test]
    fn test_configuration_error_display() {
        let err = ConfigurationError::new("module name may not be empty")
            .with_help("set `name` under [module]");

        assert!(err.to_string().contains("module name may not be empty"));
    }
}

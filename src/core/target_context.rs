//! Target configuration context.
//!
//! The context is an explicit value passed to descriptor construction and
//! build planning. Constructing the same descriptor twice with an equal
//! context yields attribute-for-attribute identical results.

use std::fmt;

use semver::Version;
use serde::{Deserialize, Serialize};

/// Target platform for a build invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    Macos,
    Windows,
}

impl Platform {
    /// Detect the current host platform.
    pub fn host() -> Self {
        match std::env::consts::OS {
            "macos" => Platform::Macos,
            "windows" => Platform::Windows,
            _ => Platform::Linux,
        }
    }

    /// Stable lowercase name, used in manifests and output paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Macos => "macos",
            Platform::Windows => "windows",
        }
    }

    /// Object file extension for this platform's toolchains.
    pub fn object_extension(&self) -> &'static str {
        match self {
            Platform::Windows => "obj",
            _ => "o",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build configuration for a build invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Configuration {
    /// Unoptimized, full debug info
    Debug,
    /// Optimized with debug info (day-to-day default)
    #[default]
    Development,
    /// Fully optimized, no editor-only code
    Shipping,
}

impl Configuration {
    /// Stable lowercase name, used in manifests and output paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            Configuration::Debug => "debug",
            Configuration::Development => "development",
            Configuration::Shipping => "shipping",
        }
    }

    /// Baseline compiler flags for this configuration.
    pub fn cflags(&self) -> &'static [&'static str] {
        match self {
            Configuration::Debug => &["-O0", "-g"],
            Configuration::Development => &["-O2", "-g"],
            Configuration::Shipping => &["-O3", "-DNDEBUG"],
        }
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The target configuration a build graph is constructed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetContext {
    /// Target platform
    pub platform: Platform,

    /// Build configuration
    pub configuration: Configuration,

    /// Engine version the project is built against
    pub engine_version: Version,
}

impl TargetContext {
    /// Create a context for the host platform.
    pub fn host(engine_version: Version) -> Self {
        TargetContext {
            platform: Platform::host(),
            configuration: Configuration::default(),
            engine_version,
        }
    }

    /// Set the configuration.
    pub fn with_configuration(mut self, configuration: Configuration) -> Self {
        self.configuration = configuration;
        self
    }

    /// Set the platform.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Short identifier like `linux-development`, used for output dirs.
    pub fn triple(&self) -> String {
        format!("{}-{}", self.platform, self.configuration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triple() {
        let ctx = TargetContext {
            platform: Platform::Linux,
            configuration: Configuration::Shipping,
            engine_version: Version::new(5, 3, 0),
        };
        assert_eq!(ctx.triple(), "linux-shipping");
    }

    #[test]
    fn test_host_defaults_to_development() {
        let ctx = TargetContext::host(Version::new(5, 0, 0));
        assert_eq!(ctx.configuration, Configuration::Development);
    }

    #[test]
    fn test_configuration_parse_from_manifest_case() {
        let cfg: Configuration = serde_json::from_str("\"shipping\"").unwrap();
        assert_eq!(cfg, Configuration::Shipping);
    }
}

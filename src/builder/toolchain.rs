//! Toolchain abstraction for C/C++ compilers.
//!
//! Plans carry toolchain-neutral step descriptions; this module turns them
//! into concrete compiler invocations. Only GCC/Clang-style drivers are
//! implemented, behind a trait so executor tests can substitute a fake.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

/// A command to execute: program plus arguments.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// The program to run (e.g. "clang++")
    pub program: PathBuf,
    /// Command arguments
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(|a| a.into()));
        self
    }
}

/// Input for compiling one translation unit.
#[derive(Debug, Clone)]
pub struct CompileInput {
    /// Source file to compile
    pub source: PathBuf,
    /// Output object file
    pub output: PathBuf,
    /// Include directories
    pub include_dirs: Vec<PathBuf>,
    /// Precompiled header to consume, if any
    pub pch: Option<PchInclude>,
    /// Additional compiler flags
    pub cflags: Vec<String>,
}

/// A precompiled header available to a compile step.
///
/// Clang consumes the artifact directly; gcc is pointed at the header and
/// picks up the `.gch` sitting next to it.
#[derive(Debug, Clone)]
pub struct PchInclude {
    /// Header the PCH was compiled from (adjacent to the artifact)
    pub header: PathBuf,
    /// The precompiled artifact itself
    pub artifact: PathBuf,
}

/// Input for archiving objects into a static library.
#[derive(Debug, Clone)]
pub struct ArchiveInput {
    /// Object files to archive
    pub objects: Vec<PathBuf>,
    /// Output archive file
    pub output: PathBuf,
}

/// The family of a toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolchainFamily {
    Gcc,
    Clang,
}

impl ToolchainFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolchainFamily::Gcc => "gcc",
            ToolchainFamily::Clang => "clang",
        }
    }
}

/// Command generation for one compiler family.
pub trait Toolchain: Send + Sync {
    /// Get the toolchain family.
    fn family(&self) -> ToolchainFamily;

    /// Get the C++ compiler path.
    fn compiler_path(&self) -> &Path;

    /// Generate a compile command for one translation unit.
    fn compile_command(&self, input: &CompileInput) -> CommandSpec;

    /// Generate a command precompiling a header to `output`.
    fn pch_command(&self, header: &Path, output: &Path, include_dirs: &[PathBuf]) -> CommandSpec;

    /// Generate an archive command (static library).
    fn archive_command(&self, input: &ArchiveInput) -> CommandSpec;

    /// Extension the precompiled-header artifact uses.
    fn pch_extension(&self) -> &'static str;
}

/// GCC/Clang-style driver.
#[derive(Debug)]
pub struct GnuToolchain {
    cxx: PathBuf,
    ar: PathBuf,
    family: ToolchainFamily,
}

impl GnuToolchain {
    pub fn new(cxx: PathBuf, ar: PathBuf, family: ToolchainFamily) -> Self {
        GnuToolchain { cxx, ar, family }
    }
}

impl Toolchain for GnuToolchain {
    fn family(&self) -> ToolchainFamily {
        self.family
    }

    fn compiler_path(&self) -> &Path {
        &self.cxx
    }

    fn compile_command(&self, input: &CompileInput) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.cxx).arg("-c");

        for dir in &input.include_dirs {
            cmd = cmd.arg("-I").arg(dir.display().to_string());
        }

        if let Some(ref pch) = input.pch {
            match self.family {
                // Clang takes the artifact itself
                ToolchainFamily::Clang => {
                    cmd = cmd
                        .arg("-include-pch")
                        .arg(pch.artifact.display().to_string());
                }
                // gcc resolves <header>.gch adjacent to the forced include
                ToolchainFamily::Gcc => {
                    cmd = cmd.arg("-include").arg(pch.header.display().to_string());
                }
            }
        }

        cmd.args(input.cflags.iter().cloned())
            .arg(input.source.display().to_string())
            .arg("-o")
            .arg(input.output.display().to_string())
    }

    fn pch_command(&self, header: &Path, output: &Path, include_dirs: &[PathBuf]) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.cxx).arg("-x").arg("c++-header");

        for dir in include_dirs {
            cmd = cmd.arg("-I").arg(dir.display().to_string());
        }

        cmd.arg(header.display().to_string())
            .arg("-o")
            .arg(output.display().to_string())
    }

    fn archive_command(&self, input: &ArchiveInput) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.ar)
            .arg("rcs")
            .arg(input.output.display().to_string());
        for obj in &input.objects {
            cmd = cmd.arg(obj.display().to_string());
        }
        cmd
    }

    fn pch_extension(&self) -> &'static str {
        match self.family {
            ToolchainFamily::Gcc => "gch",
            ToolchainFamily::Clang => "pch",
        }
    }
}

/// Detect an installed toolchain, preferring clang.
pub fn detect_toolchain() -> Result<Box<dyn Toolchain>> {
    let candidates: &[(&str, ToolchainFamily)] =
        &[("clang++", ToolchainFamily::Clang), ("g++", ToolchainFamily::Gcc)];

    for (name, family) in candidates {
        if let Ok(cxx) = which::which(name) {
            let ar = which::which("ar").unwrap_or_else(|_| PathBuf::from("ar"));
            tracing::debug!("using {} toolchain at {}", family.as_str(), cxx.display());
            return Ok(Box::new(GnuToolchain::new(cxx, ar, *family)));
        }
    }

    bail!("no C++ compiler found (looked for clang++ and g++)")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toolchain() -> GnuToolchain {
        GnuToolchain::new(
            PathBuf::from("clang++"),
            PathBuf::from("ar"),
            ToolchainFamily::Clang,
        )
    }

    #[test]
    fn test_compile_command_shape() {
        let cmd = toolchain().compile_command(&CompileInput {
            source: PathBuf::from("Private/Rig.cpp"),
            output: PathBuf::from("out/Rig.o"),
            include_dirs: vec![PathBuf::from("Public")],
            pch: None,
            cflags: vec!["-O2".to_string()],
        });

        assert_eq!(cmd.program, PathBuf::from("clang++"));
        assert_eq!(cmd.args[0], "-c");
        assert!(cmd.args.contains(&"-I".to_string()));
        assert!(cmd.args.contains(&"Public".to_string()));
        assert!(cmd.args.contains(&"-O2".to_string()));
        assert_eq!(cmd.args.last().map(String::as_str), Some("out/Rig.o"));
    }

    fn pch_include() -> PchInclude {
        PchInclude {
            header: PathBuf::from("out/CameraCore.h"),
            artifact: PathBuf::from("out/CameraCore.h.pch"),
        }
    }

    #[test]
    fn test_clang_compile_consumes_pch_artifact() {
        let cmd = toolchain().compile_command(&CompileInput {
            source: PathBuf::from("Private/Rig.cpp"),
            output: PathBuf::from("out/Rig.o"),
            include_dirs: vec![],
            pch: Some(pch_include()),
            cflags: vec![],
        });

        let pos = cmd.args.iter().position(|a| a == "-include-pch").unwrap();
        assert_eq!(cmd.args[pos + 1], "out/CameraCore.h.pch");
        assert!(!cmd.args.contains(&"-include".to_string()));
    }

    #[test]
    fn test_gcc_compile_includes_header_beside_artifact() {
        let gcc = GnuToolchain::new(
            PathBuf::from("g++"),
            PathBuf::from("ar"),
            ToolchainFamily::Gcc,
        );
        let cmd = gcc.compile_command(&CompileInput {
            source: PathBuf::from("Private/Rig.cpp"),
            output: PathBuf::from("out/Rig.o"),
            include_dirs: vec![],
            pch: Some(pch_include()),
            cflags: vec![],
        });

        let pos = cmd.args.iter().position(|a| a == "-include").unwrap();
        assert_eq!(cmd.args[pos + 1], "out/CameraCore.h");
        assert!(!cmd.args.contains(&"-include-pch".to_string()));
    }

    #[test]
    fn test_pch_command_compiles_as_header() {
        let cmd = toolchain().pch_command(
            Path::new("Public/CameraCore.h"),
            Path::new("out/CameraCore.h.pch"),
            &[PathBuf::from("Public")],
        );

        assert_eq!(cmd.args[0], "-x");
        assert_eq!(cmd.args[1], "c++-header");
    }

    #[test]
    fn test_archive_command() {
        let cmd = toolchain().archive_command(&ArchiveInput {
            objects: vec![PathBuf::from("a.o"), PathBuf::from("b.o")],
            output: PathBuf::from("libCameraCore.a"),
        });

        assert_eq!(cmd.program, PathBuf::from("ar"));
        assert_eq!(cmd.args, vec!["rcs", "libCameraCore.a", "a.o", "b.o"]);
    }
}

//! Build context - the frozen configuration of one generation pass.

use serde::Serialize;

use crate::builder::toolchain::{FlagSets, ToolchainConfig};
use crate::core::manifest::Sources;
use crate::core::platform::Platform;
use crate::util::config::EnvOverrides;

/// How to re-run the generator, and what it reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratorInfo {
    /// Program the regeneration rule invokes
    pub program: String,
    /// Files whose change must trigger regeneration
    pub inputs: Vec<String>,
}

/// Build context containing everything the graph builder consumes.
///
/// Constructed once by the resolver; nothing downstream mutates it or
/// consults the environment again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildContext {
    /// Platform the build produces code for
    pub target: Platform,

    /// Platform that runs the build tools
    pub host: Platform,

    /// Debug build mode
    pub debug: bool,

    /// Captured environment overrides
    pub env: EnvOverrides,

    /// Resolved compiler and archiver
    pub toolchain: ToolchainConfig,

    /// Composed flag sets
    pub flags: FlagSets,

    /// Library and test sources
    pub sources: Sources,

    /// Raw command-line arguments, joined for rerunning
    pub configure_args: String,

    /// Self-regeneration details
    pub generator: GeneratorInfo,

    /// Path of the generated file, relative to the project root
    pub output: String,
}

impl BuildContext {
    /// Build mode name.
    pub fn profile_name(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "release"
        }
    }

    /// Build output root.
    pub fn builddir(&self) -> String {
        format!("build/{}", self.profile_name())
    }
}

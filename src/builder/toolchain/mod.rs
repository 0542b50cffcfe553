//! Toolchain identity and flag composition.
//!
//! Compiler selection priority:
//! 1. MSVC targets always use `cl` / `lib`
//! 2. `CXX` environment override
//! 3. `clang` found on PATH
//! 4. `g++`
//!
//! Flag composition is a pure function of the target platform, the build
//! mode, the toolchain vendor and the environment overrides. The GCC-style
//! and MSVC-style flag tables live in their own modules.

use serde::Serialize;

use crate::core::flags::{FlagSet, QuoteStyle};
use crate::core::platform::Platform;
use crate::util::config::EnvOverrides;

mod detect;
mod gcc;
mod msvc;

pub use detect::{
    detect_archiver, detect_toolchain, DEFAULT_ARCHIVER, DEFAULT_COMPILER, MSVC_ARCHIVER,
};

/// The compiler implementation selected for the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolchainVendor {
    /// Clang/LLVM, the preferred alternate compiler
    Clang,
    /// GCC, or any other GCC-compatible driver
    Gcc,
    /// Microsoft Visual C++
    Msvc,
}

impl ToolchainVendor {
    /// Identify a GCC-style driver from its path.
    pub fn identify(compiler: &str) -> Self {
        let basename = compiler
            .rsplit(|c| c == '/' || c == '\\')
            .next()
            .unwrap_or(compiler);
        if basename.contains("clang") {
            ToolchainVendor::Clang
        } else {
            ToolchainVendor::Gcc
        }
    }

    /// Get the vendor name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolchainVendor::Clang => "clang",
            ToolchainVendor::Gcc => "gcc",
            ToolchainVendor::Msvc => "msvc",
        }
    }
}

/// Resolved tools for the build. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolchainConfig {
    /// Compiler (and link driver) invoked by the build engine
    pub compiler: String,
    /// Archiver invoked by the build engine
    pub archiver: String,
    /// Object file extension, including the dot
    pub object_extension: String,
    /// Which compiler family `compiler` belongs to
    pub vendor: ToolchainVendor,
}

impl ToolchainConfig {
    pub fn is_msvc(&self) -> bool {
        self.vendor == ToolchainVendor::Msvc
    }
}

/// Everything flag composition depends on.
#[derive(Debug, Clone, Copy)]
pub struct FlagInputs<'a> {
    pub target: &'a Platform,
    pub debug: bool,
    pub vendor: ToolchainVendor,
    pub env: &'a EnvOverrides,
}

impl FlagInputs<'_> {
    /// Sanitizers are only injected for debug builds with the alternate
    /// compiler.
    pub fn wants_sanitizer(&self) -> bool {
        self.debug && self.vendor == ToolchainVendor::Clang && !self.target.is_msvc()
    }
}

/// The four frozen flag sets of a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlagSets {
    pub compile: FlagSet,
    pub link: FlagSet,
    pub test_compile: FlagSet,
    pub test_link: FlagSet,
    /// Quoting applied when rendering
    pub quote_style: QuoteStyle,
}

impl FlagSets {
    /// Apply the user's `CFLAGS`/`LDFLAGS`, always last.
    fn with_user_overrides(self, env: &EnvOverrides) -> Self {
        let cflags = env.cflags.as_deref().filter(|s| !s.trim().is_empty());
        let ldflags = env.ldflags.as_deref().filter(|s| !s.trim().is_empty());

        let append = |set: FlagSet, extra: Option<&str>| match extra {
            Some(flag) => set.with(flag),
            None => set,
        };

        FlagSets {
            compile: append(self.compile, cflags),
            link: append(self.link, ldflags),
            test_compile: append(self.test_compile, cflags),
            test_link: append(self.test_link, ldflags),
            quote_style: self.quote_style,
        }
    }
}

/// Compose the compile, link, test-compile and test-link flag sets.
pub fn compose_flags(inputs: &FlagInputs<'_>) -> FlagSets {
    let composed = if inputs.target.is_msvc() {
        msvc::compose(inputs)
    } else {
        gcc::compose(inputs)
    };
    let flags = composed.with_user_overrides(inputs.env);

    tracing::debug!(
        "composed flags: {} compile, {} link, {} test compile, {} test link",
        flags.compile.len(),
        flags.link.len(),
        flags.test_compile.len(),
        flags.test_link.len()
    );
    flags
}

//! Toolchain detection.

use crate::core::platform::Platform;
use crate::util::config::EnvOverrides;
use crate::util::process::ToolProbe;

use super::{ToolchainConfig, ToolchainVendor};

/// Compiler used when no override is set and `clang` is not on PATH.
pub const DEFAULT_COMPILER: &str = "g++";

/// Archiver used when no override is set.
pub const DEFAULT_ARCHIVER: &str = "ar";

/// The alternate compiler preferred over the default when present.
const ALTERNATE_COMPILER: &str = "clang";

/// Librarian run by MSVC hosts.
pub const MSVC_ARCHIVER: &str = "lib";

/// Detect the toolchain for `target`, archiving on `host`.
///
/// Nothing is validated here: a compiler that does not exist is passed
/// through and only fails once the build engine runs it.
pub fn detect_toolchain(
    target: &Platform,
    host: &Platform,
    env: &EnvOverrides,
    probe: &dyn ToolProbe,
) -> ToolchainConfig {
    let archiver = detect_archiver(host, env);

    if target.is_msvc() {
        if env.cxx.is_some() {
            tracing::warn!("CXX is ignored for msvc targets");
        }
        return ToolchainConfig {
            compiler: "cl".to_string(),
            archiver,
            object_extension: ".obj".to_string(),
            vendor: ToolchainVendor::Msvc,
        };
    }

    let compiler = match &env.cxx {
        Some(cxx) => cxx.clone(),
        None => probe
            .find_executable(ALTERNATE_COMPILER)
            .map(|path| path.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_COMPILER.to_string()),
    };
    let vendor = ToolchainVendor::identify(&compiler);

    tracing::debug!(
        "using compiler {} ({}), archiver {}",
        compiler,
        vendor.as_str(),
        archiver
    );

    ToolchainConfig {
        compiler,
        archiver,
        object_extension: ".o".to_string(),
        vendor,
    }
}

/// The archive rule runs on the host, so the archiver does too.
pub fn detect_archiver(host: &Platform, env: &EnvOverrides) -> String {
    if host.is_msvc() {
        if env.ar.is_some() {
            tracing::warn!("AR is ignored on msvc hosts");
        }
        return MSVC_ARCHIVER.to_string();
    }
    env.ar
        .clone()
        .unwrap_or_else(|| DEFAULT_ARCHIVER.to_string())
}

//! Ready-made build contexts.

use crate::builder::context::{BuildContext, GeneratorInfo};
use crate::builder::toolchain::{
    compose_flags, detect_archiver, FlagInputs, ToolchainConfig, ToolchainVendor,
};
use crate::core::manifest::Sources;
use crate::core::platform::{Platform, PlatformVariant};
use crate::util::config::EnvOverrides;

/// The default source layout: one library source, two tests.
pub fn fixture_sources() -> Sources {
    Sources {
        library_name: "immutable".to_string(),
        library: vec!["immutable/array".to_string()],
        library_extension: "cc".to_string(),
        tests: vec!["tests/array_test".to_string(), "tests/main".to_string()],
        test_extension: "cc".to_string(),
    }
}

/// A toolchain as detection would produce it, without probing anything.
pub fn fixture_toolchain(target: &Platform, host: &Platform, clang: bool) -> ToolchainConfig {
    let archiver = detect_archiver(host, &EnvOverrides::default());
    if target.is_msvc() {
        return ToolchainConfig {
            compiler: "cl".to_string(),
            archiver,
            object_extension: ".obj".to_string(),
            vendor: ToolchainVendor::Msvc,
        };
    }
    let (compiler, vendor) = if clang {
        ("/usr/bin/clang", ToolchainVendor::Clang)
    } else {
        ("g++", ToolchainVendor::Gcc)
    };
    ToolchainConfig {
        compiler: compiler.to_string(),
        archiver,
        object_extension: ".o".to_string(),
        vendor,
    }
}

/// A context for `variant` with the host equal to the target.
pub fn fixture_context(variant: PlatformVariant, debug: bool, clang: bool) -> BuildContext {
    fixture_context_with(variant, variant, debug, clang, EnvOverrides::default())
}

/// A context with an explicit host and environment.
pub fn fixture_context_with(
    target: PlatformVariant,
    host: PlatformVariant,
    debug: bool,
    clang: bool,
    env: EnvOverrides,
) -> BuildContext {
    let target = Platform::new(target);
    let host = Platform::new(host);
    let toolchain = fixture_toolchain(&target, &host, clang);
    let flags = compose_flags(&FlagInputs {
        target: &target,
        debug,
        vendor: toolchain.vendor,
        env: &env,
    });

    BuildContext {
        target,
        host,
        debug,
        env,
        toolchain,
        flags,
        sources: fixture_sources(),
        configure_args: String::new(),
        generator: GeneratorInfo {
            program: "target/debug/configure".to_string(),
            inputs: vec!["target/debug/configure".to_string()],
        },
        output: "build.ninja".to_string(),
    }
}

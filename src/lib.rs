//! Configure - a ninja build file generator for a small C++ library.
//!
//! This crate resolves the target platform and toolchain, composes the
//! compile and link flags, plans the build graph and renders it as a
//! `build.ninja` file.

pub mod builder;
pub mod core;
pub mod ninja;
pub mod ops;
pub mod util;

/// Test utilities and mocks for unit tests.
///
/// This module is only available when compiling with `--cfg test`. It
/// provides a tool probe that never touches PATH and prebuilt contexts.
#[cfg(test)]
pub mod test_support;

pub use builder::{BuildContext, BuildGraph};
pub use crate::core::{Platform, PlatformVariant};
pub use util::config::EnvOverrides;

//! Implementation of a configure run.
//!
//! `resolve` is the only stage that looks at the outside world (environment,
//! PATH, the manifest, the test directory). Everything after it works on the
//! frozen `BuildContext`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::builder::context::{BuildContext, GeneratorInfo};
use crate::builder::plan::plan_build;
use crate::builder::toolchain::{compose_flags, detect_toolchain, FlagInputs};
use crate::core::manifest::Manifest;
use crate::core::platform::{Platform, PlatformVariant};
use crate::ninja::render;
use crate::util::config::EnvOverrides;
use crate::util::fs::{display_relative, write_atomic};
use crate::util::process::ToolProbe;

/// Default name of the generated file.
pub const DEFAULT_OUTPUT: &str = "build.ninja";

/// Usage errors, detected before any output is produced.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigureError {
    #[error("extra unparsed command-line arguments: {}", .0.join(" "))]
    ExtraArguments(Vec<String>),

    #[error("output path `{}` does not name a file", .0.display())]
    InvalidOutput(PathBuf),
}

/// Options for a configure run.
#[derive(Debug, Clone)]
pub struct ConfigureOptions {
    /// Target platform; the running machine when absent
    pub platform: Option<PlatformVariant>,

    /// Host platform; the target when absent
    pub host: Option<PlatformVariant>,

    /// Debug build mode
    pub debug: bool,

    /// Generated file, relative to `root` unless absolute
    pub output: PathBuf,

    /// Project root
    pub root: PathBuf,

    /// Raw command-line arguments after the program name
    pub args: Vec<String>,

    /// Positional arguments left over after option parsing
    pub extra: Vec<String>,

    /// Program re-run by the regeneration rule
    pub generator: PathBuf,
}

impl ConfigureOptions {
    /// Options for `root` with everything else defaulted.
    pub fn new(root: impl Into<PathBuf>, generator: impl Into<PathBuf>) -> Self {
        ConfigureOptions {
            platform: None,
            host: None,
            debug: false,
            output: PathBuf::from(DEFAULT_OUTPUT),
            root: root.into(),
            args: Vec::new(),
            extra: Vec::new(),
            generator: generator.into(),
        }
    }

    /// Reject invocations that cannot produce a file.
    pub fn check_usage(&self) -> Result<(), ConfigureError> {
        if !self.extra.is_empty() {
            return Err(ConfigureError::ExtraArguments(self.extra.clone()));
        }
        if self.output.file_name().is_none() {
            return Err(ConfigureError::InvalidOutput(self.output.clone()));
        }
        Ok(())
    }

    /// Absolute location of the generated file.
    pub fn output_path(&self) -> PathBuf {
        if self.output.is_absolute() {
            self.output.clone()
        } else {
            self.root.join(&self.output)
        }
    }
}

/// Result of a configure run that wrote its output.
#[derive(Debug, Clone)]
pub struct ConfigureOutcome {
    /// Where the file was written
    pub path: PathBuf,
    /// Number of bytes written
    pub len: usize,
    /// Whether the file carries a regeneration edge
    pub regenerates: bool,
}

/// Resolve options, environment and tools into a frozen context.
pub fn resolve(
    options: &ConfigureOptions,
    env: &EnvOverrides,
    probe: &dyn ToolProbe,
) -> Result<BuildContext> {
    options.check_usage()?;

    let target = Platform::resolve(options.platform, probe);
    let host = match options.host {
        Some(host) => Platform::resolve(Some(host), probe),
        None => target,
    };
    tracing::debug!("target platform {}, host platform {}", target, host);

    let toolchain = detect_toolchain(&target, &host, env, probe);
    let flags = compose_flags(&FlagInputs {
        target: &target,
        debug: options.debug,
        vendor: toolchain.vendor,
        env,
    });

    let (manifest, manifest_path) = Manifest::discover(&options.root)?;
    let sources = manifest.resolve_sources(&options.root)?;

    let program = command_path(display_relative(&options.root, &options.generator));
    let mut inputs = vec![program.clone()];
    if let Some(path) = manifest_path {
        inputs.push(display_relative(&options.root, &path));
    }

    Ok(BuildContext {
        target,
        host,
        debug: options.debug,
        env: env.clone(),
        toolchain,
        flags,
        sources,
        configure_args: options.args.join(" "),
        generator: GeneratorInfo { program, inputs },
        output: display_relative(&options.root, &options.output_path()),
    })
}

/// Render the build file for a resolved context.
pub fn generate(ctx: &BuildContext) -> Result<String> {
    let graph = plan_build(ctx).context("failed to plan build graph")?;
    render(&graph)
}

/// Resolve, generate and write the build file.
///
/// The file is only touched once the whole text has been rendered.
pub fn configure(
    options: &ConfigureOptions,
    env: &EnvOverrides,
    probe: &dyn ToolProbe,
) -> Result<ConfigureOutcome> {
    let ctx = resolve(options, env, probe)?;
    let contents = generate(&ctx)?;

    let path = options.output_path();
    write_atomic(&path, &contents)?;
    tracing::debug!("wrote {} bytes to {}", contents.len(), path.display());

    Ok(ConfigureOutcome {
        path,
        len: contents.len(),
        regenerates: !ctx.host.is_mingw(),
    })
}

/// A bare file name would be looked up on PATH by the shell.
fn command_path(program: String) -> String {
    if program.contains('/') || Path::new(&program).is_absolute() {
        program
    } else {
        format!("./{}", program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::toolchain::ToolchainVendor;
    use crate::test_support::MockProbe;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("immutable")).unwrap();
        fs::create_dir_all(tmp.path().join("tests")).unwrap();
        fs::write(tmp.path().join("immutable/array.cc"), "").unwrap();
        fs::write(tmp.path().join("tests/main.cc"), "").unwrap();
        fs::write(tmp.path().join("tests/array_test.cc"), "").unwrap();
        tmp
    }

    fn options(root: &Path) -> ConfigureOptions {
        let mut options = ConfigureOptions::new(root, root.join("configure"));
        options.platform = Some(PlatformVariant::Linux);
        options
    }

    fn clang_probe() -> MockProbe {
        MockProbe::new().with_executable("clang", "/usr/bin/clang")
    }

    #[test]
    fn test_extra_arguments_rejected_before_writing() {
        let tmp = project();
        let mut opts = options(tmp.path());
        opts.extra = vec!["foo".into()];

        let err = configure(&opts, &EnvOverrides::default(), &clang_probe()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigureError>(),
            Some(&ConfigureError::ExtraArguments(vec!["foo".into()]))
        );
        assert_eq!(
            err.to_string(),
            "extra unparsed command-line arguments: foo"
        );
        assert!(!tmp.path().join(DEFAULT_OUTPUT).exists());
    }

    #[test]
    fn test_resolve_freezes_context() {
        let tmp = project();
        let mut opts = options(tmp.path());
        opts.args = vec!["--platform".into(), "linux".into()];

        let ctx = resolve(&opts, &EnvOverrides::default(), &clang_probe()).unwrap();

        assert_eq!(ctx.toolchain.compiler, "/usr/bin/clang");
        assert_eq!(ctx.toolchain.vendor, ToolchainVendor::Clang);
        assert_eq!(ctx.host, ctx.target);
        assert_eq!(ctx.configure_args, "--platform linux");
        assert_eq!(ctx.output, "build.ninja");
        assert_eq!(ctx.generator.program, "./configure");
        assert_eq!(ctx.generator.inputs, vec!["./configure"]);
        assert_eq!(ctx.sources.library, vec!["immutable/array"]);
        assert_eq!(ctx.sources.tests, vec!["tests/array_test", "tests/main"]);
        assert!(ctx.flags.compile.contains("-O3"));
    }

    #[test]
    fn test_manifest_is_regeneration_input() {
        let tmp = project();
        fs::write(
            tmp.path().join("Configure.toml"),
            "[library]\nname = \"vec\"\nsources = [\"array\"]\n",
        )
        .unwrap();

        let ctx = resolve(&options(tmp.path()), &EnvOverrides::default(), &clang_probe()).unwrap();
        assert_eq!(ctx.sources.library_name, "vec");
        assert_eq!(ctx.generator.inputs, vec!["./configure", "Configure.toml"]);
    }

    #[test]
    fn test_invalid_manifest_fails_before_writing() {
        let tmp = project();
        fs::write(
            tmp.path().join("Configure.toml"),
            "[library]\nsources = [\"array\", \"array\"]\n",
        )
        .unwrap();

        let result = configure(&options(tmp.path()), &EnvOverrides::default(), &clang_probe());
        assert!(result.is_err());
        assert!(!tmp.path().join(DEFAULT_OUTPUT).exists());
    }

    #[test]
    fn test_host_resolved_independently() {
        let tmp = project();
        let mut opts = options(tmp.path());
        opts.platform = Some(PlatformVariant::Mingw);
        opts.host = Some(PlatformVariant::Linux);

        let ctx = resolve(&opts, &EnvOverrides::default(), &MockProbe::new()).unwrap();
        assert!(ctx.target.is_mingw());
        assert!(!ctx.host.is_mingw());
    }

    #[test]
    fn test_generation_is_deterministic() {
        let tmp = project();
        let env = EnvOverrides {
            cflags: Some("-DX=\"y\"".into()),
            ..EnvOverrides::default()
        };
        let mut opts = options(tmp.path());
        opts.debug = true;

        let first = generate(&resolve(&opts, &env, &clang_probe()).unwrap()).unwrap();
        let second = generate(&resolve(&opts, &env, &clang_probe()).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_configure_writes_file() {
        let tmp = project();
        let outcome = configure(&options(tmp.path()), &EnvOverrides::default(), &clang_probe()).unwrap();

        let written = fs::read_to_string(&outcome.path).unwrap();
        assert_eq!(written.len(), outcome.len);
        assert!(outcome.regenerates);
        assert!(written.starts_with("# This file is generated by configure.\n"));
        assert!(written.contains("ninja_required_version = 1.3\n"));
        assert!(written.contains("build build.ninja: configure | ./configure\n"));
        assert!(written.contains("default $builddir/bin/test\n"));
        assert!(written.ends_with("build all: phony $builddir/bin/test\n"));
    }

    #[test]
    fn test_custom_output_path() {
        let tmp = project();
        let mut opts = options(tmp.path());
        opts.output = PathBuf::from("out/gen.ninja");
        fs::create_dir_all(tmp.path().join("out")).unwrap();

        let outcome = configure(&opts, &EnvOverrides::default(), &clang_probe()).unwrap();
        assert_eq!(outcome.path, tmp.path().join("out/gen.ninja"));
        let written = fs::read_to_string(&outcome.path).unwrap();
        assert!(written.contains("build out/gen.ninja: configure"));
    }

    #[test]
    fn test_command_path() {
        assert_eq!(command_path("configure".into()), "./configure");
        assert_eq!(command_path("target/debug/configure".into()), "target/debug/configure");
        assert_eq!(command_path("/usr/bin/configure".into()), "/usr/bin/configure");
    }
}

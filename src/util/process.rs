//! Subprocess and PATH probing utilities.
//!
//! Probing only happens while options are being resolved. Everything after
//! that works on the values captured here.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use anyhow::{Context, Result};

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
        }
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Execute the command and wait for completion.
    pub fn exec(&self) -> Result<Output> {
        Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .with_context(|| format!("failed to execute `{}`", self.display_command()))
    }

    /// Display the command for error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Access to the machine's tools during option resolution.
///
/// Tests substitute a fixed implementation so generation is reproducible
/// regardless of what is installed.
pub trait ToolProbe {
    /// Locate an executable on the search path.
    fn find_executable(&self, name: &str) -> Option<PathBuf>;

    /// Run a tool and return its combined stdout, or `None` if it can't run.
    fn help_text(&self, program: &str, args: &[&str]) -> Option<String>;
}

/// Probe backed by the real PATH and real subprocesses.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProbe;

impl ToolProbe for SystemProbe {
    fn find_executable(&self, name: &str) -> Option<PathBuf> {
        find_executable(name)
    }

    fn help_text(&self, program: &str, args: &[&str]) -> Option<String> {
        let path = find_executable(program)?;
        match ProcessBuilder::new(&path).args(args).exec() {
            Ok(output) => Some(String::from_utf8_lossy(&output.stdout).into_owned()),
            Err(e) => {
                tracing::debug!("probe failed: {:#}", e);
                None
            }
        }
    }
}

//! Test utilities and mocks for unit tests.
//!
//! `MockProbe` replaces PATH lookup and tool probing so that tests produce
//! the same output on every machine. `fixtures` builds ready-made contexts.

pub mod fixtures;

use std::collections::HashMap;
use std::path::PathBuf;

use crate::util::process::ToolProbe;

pub use fixtures::*;

/// Probe with a fixed set of executables and help texts.
#[derive(Debug, Clone, Default)]
pub struct MockProbe {
    executables: HashMap<String, PathBuf>,
    help: HashMap<String, String>,
}

impl MockProbe {
    /// A probe that finds nothing.
    pub fn new() -> Self {
        MockProbe::default()
    }

    /// Make `name` resolvable to `path`.
    pub fn with_executable(mut self, name: &str, path: impl Into<PathBuf>) -> Self {
        self.executables.insert(name.to_string(), path.into());
        self
    }

    /// Make `program` answer help probes with `text`.
    pub fn with_help(mut self, program: &str, text: &str) -> Self {
        self.help.insert(program.to_string(), text.to_string());
        self
    }
}

impl ToolProbe for MockProbe {
    fn find_executable(&self, name: &str) -> Option<PathBuf> {
        self.executables.get(name).cloned()
    }

    fn help_text(&self, program: &str, _args: &[&str]) -> Option<String> {
        self.help.get(program).cloned()
    }
}

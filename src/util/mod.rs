//! Shared utilities

pub mod config;
pub mod fs;
pub mod process;
pub mod shell;

pub use config::{EnvKey, EnvOverrides};
pub use process::{SystemProbe, ToolProbe};
pub use shell::Shell;

//! CLI definitions using clap.

use std::path::PathBuf;

use clap::Parser;

use configure::core::PlatformVariant;
use configure::ops::DEFAULT_OUTPUT;

/// Generate a build.ninja for the library and its tests
#[derive(Parser)]
#[command(name = "configure")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Target platform (defaults to this machine)
    #[arg(long, value_enum)]
    pub platform: Option<PlatformVariant>,

    /// Host platform (defaults to the target)
    #[arg(long, value_enum)]
    pub host: Option<PlatformVariant>,

    /// Enable debugging extras
    #[arg(long)]
    pub debug: bool,

    /// File to generate
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Print the generated file instead of writing it
    #[arg(long, conflicts_with = "print_config")]
    pub dry_run: bool,

    /// Print the resolved configuration as JSON and exit
    #[arg(long)]
    pub print_config: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Leftover positional arguments, always rejected
    #[arg(hide = true)]
    pub extra: Vec<String>,
}

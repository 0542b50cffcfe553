//! Configure CLI - generates build.ninja

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::Cli;
use configure::ops::{self, ConfigureOptions};
use configure::util::shell::{Shell, Status};
use configure::util::{EnvOverrides, SystemProbe};

fn main() {
    // Parse CLI; invalid platforms and unknown flags exit here
    let cli = Cli::parse();
    let shell = Shell::from_flags(cli.verbose, cli.no_color);

    // Set up logging
    let filter = if shell.is_verbose() {
        EnvFilter::new("configure=debug")
    } else {
        EnvFilter::new("configure=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    if let Err(e) = run(cli, &shell) {
        shell.error(format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli, shell: &Shell) -> Result<()> {
    let root = std::env::current_dir().context("failed to determine current directory")?;
    let generator = std::env::current_exe().context("failed to locate the configure executable")?;

    let mut options = ConfigureOptions::new(root, generator);
    options.platform = cli.platform;
    options.host = cli.host;
    options.debug = cli.debug;
    options.output = cli.output;
    options.extra = cli.extra;
    options.args = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();

    // Usage errors first, before anything is resolved or written
    options.check_usage()?;

    let env = EnvOverrides::from_env();
    let probe = SystemProbe;

    if cli.print_config {
        let ctx = ops::resolve(&options, &env, &probe)?;
        println!("{}", serde_json::to_string_pretty(&ctx)?);
        return Ok(());
    }

    if cli.dry_run {
        let ctx = ops::resolve(&options, &env, &probe)?;
        print!("{}", ops::generate(&ctx)?);
        return Ok(());
    }

    let outcome = ops::configure(&options, &env, &probe)?;
    if !outcome.regenerates {
        shell.warn("the mingw host has no regeneration rule; rerun configure by hand after changes");
    }
    shell.status(Status::Wrote, outcome.path.display());
    Ok(())
}

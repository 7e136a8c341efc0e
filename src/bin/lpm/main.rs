//! lpm CLI - A package manager for Lua modules

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use lpm::util::Shell;

/// Options shared by every command.
pub struct GlobalOptions {
    pub shell: Shell,

    /// Explicit `--config` / `$LPM_CONFIG` path
    pub config: Option<PathBuf>,

    pub verbose: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("lpm=debug")
    } else if cli.quiet {
        EnvFilter::new("lpm=error")
    } else {
        EnvFilter::new("lpm=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let global_opts = GlobalOptions {
        shell: Shell::from_flags(cli.quiet, cli.verbose, cli.color),
        config: cli.config,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Install(args) => commands::install::execute(args, &global_opts),
        Commands::Remove(args) => commands::remove::execute(args, &global_opts),
        Commands::Update(args) => commands::update::execute(args, &global_opts),
        Commands::Status(args) => commands::status::execute(args, &global_opts),
        Commands::List(args) => commands::list::execute(args, &global_opts),
        Commands::Add(args) => commands::add::execute(args, &global_opts),
    }
}

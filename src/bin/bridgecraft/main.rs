//! Bridgecraft CLI - generate the Swift interface of a bridging header

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bridgecraft::util::Shell;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging; RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("bridgecraft=debug")
        } else {
            EnvFilter::new("bridgecraft=info")
        }
    });

    // stdout is reserved for the generated interface
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let shell = Shell::from_flags(cli.quiet, cli.verbose, cli.color());
    let exit_code = cli.command.failure_code();

    if let Err(e) = run(cli.command, &shell) {
        eprintln!("error: {:#}", e);
        std::process::exit(exit_code);
    }
}

fn run(command: Commands, shell: &Shell) -> Result<()> {
    match command {
        Commands::Generate(args) => commands::generate::execute(args, shell),
        Commands::Patch(args) => commands::patch::execute(args, shell),
    }
}

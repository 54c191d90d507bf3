pub mod commands;
pub mod core;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use crate::commands::Cli;

/// Parse the command line, run it and return the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();

    let default_directive = if cli.verbose {
        "warn,mcm_lib=debug"
    } else {
        "warn,mcm_lib=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("mcm {} starting", env!("CARGO_PKG_VERSION"));

    match commands::execute(cli).await {
        Ok(exit) => exit.code(),
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            1
        }
    }
}

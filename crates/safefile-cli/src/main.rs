//! safefile CLI entry point.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use safefile_cli::cli::Cli;
use safefile_cli::commands;

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config();
    if let Err(e) = commands::execute(cli.command, config) {
        eprintln!("Error: {}", e);
        std::process::exit(commands::exit_code(e.as_ref()));
    }
}

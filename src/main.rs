// Entrypoint for the CLI application.
// - Keeps `main` small: parse arguments, set up logging, dispatch.
// - Handlers print their own hints; the error cause lands here.

use clap::Parser;
use colored::Colorize;
use markpre_cli::cli::Cli;
use markpre_cli::commands::execute_command;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if let Err(err) = execute_command(cli) {
        eprintln!("{}", format!("Error: {err:#}").red());
        std::process::exit(1);
    }
}

/// Log to stderr, level driven by the -v count; RUST_LOG wins when set.
fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

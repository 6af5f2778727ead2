//! tgram CLI - reliable Telegram messages.
//!
//! Provides commands for:
//! - `send`: Format a message and deliver it through the tier cascade
//! - `fmt`: Run the formatting pipeline and print the result
//! - `check`: Load and validate configuration

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CheckArgs, FmtArgs, SendArgs};
use output::Output;

/// tgram - send Telegram messages that always arrive readable.
#[derive(Parser)]
#[command(name = "tgram", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a message.
    Send(SendArgs),
    /// Format a message without sending it.
    Fmt(FmtArgs),
    /// Validate configuration.
    Check(CheckArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let verbose = matches!(&cli.command, Commands::Send(args) if args.verbose);
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Send(args) => args.execute(&output),
        Commands::Fmt(args) => args.execute(&output),
        Commands::Check(args) => args.execute(&output),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

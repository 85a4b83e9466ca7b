//! Lingo CLI - Localized route resolution.
//!
//! Provides commands for:
//! - `switcher`: Print language switcher data for a page
//! - `routes`: Print the route map of one or every language

mod commands;
mod engine;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{RoutesArgs, SwitcherArgs};
use output::Output;

/// Application version from Cargo.toml.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Lingo - Localized route resolution for multi-language sites.
#[derive(Parser)]
#[command(name = "lingo", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print language switcher data for a page as JSON.
    Switcher(SwitcherArgs),
    /// Print localized route maps as JSON.
    Routes(RoutesArgs),
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Self::Switcher(args) => args.site.verbose,
            Self::Routes(args) => args.site.verbose,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.command.verbose() {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Switcher(args) => args.execute(VERSION),
        Commands::Routes(args) => args.execute(VERSION),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

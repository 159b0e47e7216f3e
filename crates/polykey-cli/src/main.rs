//! Polykey CLI - simulator and tools for the polykey controller.

mod commands;
mod script;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "polykey")]
#[command(author, version, about = "Polykey controller simulator", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted input sequence through the engine
    Simulate(commands::simulate::SimulateArgs),

    /// Print the octave table with note names and frequencies
    Table(commands::table::TableArgs),

    /// Validate and print the effective configuration
    Config(commands::config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Simulate(args) => commands::simulate::run(args),
        Commands::Table(args) => commands::table::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}

/// Logs go to stderr so reports on stdout stay machine-readable.
fn init_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

//! AppGlue CLI - host lifecycle driver simulator.
//!
//! This binary plays the role of the host process: it bootstraps a demo
//! activity, then drives its lifecycle from a scripted command sequence,
//! exactly the way a platform lifecycle driver would over the command
//! channel.

mod commands;
mod error;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "appglue",
    version,
    about = "Host lifecycle driver simulator for appglue activities"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch a demo activity and drive it with a lifecycle script
    Run(commands::run::RunArgs),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

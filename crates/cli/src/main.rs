//! TaskMaster CLI - Seeding and inspection tools for the admin backend.
//!
//! # Usage
//!
//! ```bash
//! # Merge fixture collections into the document store
//! tm-cli seed fixtures/dev.yaml
//!
//! # Replace each collection named in the file
//! tm-cli seed fixtures/dev.yaml --replace
//!
//! # Print dashboard statistics
//! tm-cli stats
//!
//! # Validate the admin environment
//! tm-cli config check
//! ```
//!
//! # Commands
//!
//! - `seed` - Write fixture collections from YAML
//! - `stats` - Print dashboard statistics
//! - `config check` - Validate configuration without starting the server

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "tm-cli")]
#[command(author, version, about = "TaskMaster admin CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the document store from a YAML fixture file
    Seed {
        /// Path to the YAML file (collection name -> records)
        file: String,

        /// Replace each named collection instead of merging into it
        #[arg(long)]
        replace: bool,
    },
    /// Print dashboard statistics
    Stats,
    /// Configuration tools
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Load and validate the admin configuration
    Check,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Seed { file, replace } => commands::seed::fixtures(&file, replace).await?,
        Commands::Stats => commands::stats::print().await?,
        Commands::Config { action } => match action {
            ConfigAction::Check => commands::config::check()?,
        },
    }
    Ok(())
}

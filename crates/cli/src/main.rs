//! Dar Koftan CLI - database migrations and maintenance.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! dk-cli migrate
//!
//! # Create the missing online stock rows
//! dk-cli stock aggregate
//!
//! # Insert the standard size labels
//! dk-cli seed sizes
//! ```
//!
//! Every command reads `DATABASE_URL` (a `.env` file is honoured).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "dk-cli")]
#[command(author, version, about = "Dar Koftan CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Stock ledger maintenance
    Stock {
        #[command(subcommand)]
        action: StockAction,
    },
    /// Seed reference data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum StockAction {
    /// Create online stock rows as the sum of the physical locations
    Aggregate,
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert the size labels from the size groups
    Sizes,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await,
        Commands::Stock {
            action: StockAction::Aggregate,
        } => commands::stock::aggregate().await,
        Commands::Seed {
            target: SeedTarget::Sizes,
        } => commands::seed::sizes().await,
    }
}

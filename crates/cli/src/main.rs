//! Wholesale portal CLI - Database migrations and document tools.
//!
//! # Usage
//!
//! ```bash
//! # Run portal database migrations (including the session table)
//! wp-cli migrate
//!
//! # Print an invoice for an order
//! wp-cli document --order 6f1c9c1e-7d3a-4f0e-9d55-2b8e7c4a1f00 --kind invoice
//!
//! # Same, as JSON
//! wp-cli document --order 6f1c9c1e-7d3a-4f0e-9d55-2b8e7c4a1f00 --kind confirmation --json
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use wholesale_core::OrderId;
use wholesale_core::document::DocumentKind;

mod commands;

#[derive(Parser)]
#[command(name = "wp-cli")]
#[command(author, version, about = "Wholesale portal CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Render an order confirmation or invoice
    Document {
        /// Order ID (UUID)
        #[arg(short, long)]
        order: OrderId,

        /// Document kind (`confirmation` or `invoice`)
        #[arg(short, long, default_value = "invoice")]
        kind: DocumentKind,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Document { order, kind, json } => {
            commands::document::render(order, kind, json).await?;
        }
    }
    Ok(())
}

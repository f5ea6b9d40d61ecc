//! # Pricegrid CLI
//!
//! The `pricegrid` binary is the operational interface to the pipeline:
//! schema setup, one-shot ingest runs, history queries, and the HTTP API.
//!
//! ## Usage
//!
//! ```bash
//! pricegrid --config ./config/pricegrid.toml <command>
//! ```
//!
//! | Command | Description |
//! |---------|-------------|
//! | `pricegrid init` | Create the SQLite database and run schema migrations |
//! | `pricegrid stores` | List configured stores and their adapters |
//! | `pricegrid ingest` | Run one fetch-normalize-persist pass over all stores |
//! | `pricegrid compare <gtin>` | Price history for one product, newest first |
//! | `pricegrid search "<query>"` | Latest snapshot per store matching a name |
//! | `pricegrid serve` | Start the HTTP API |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use pricegrid::{config, ingest, migrate, query, server, stores};

/// Pricegrid: multi-retailer grocery price ingestion and comparison.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file listing the database path and the store/adapter map.
#[derive(Parser)]
#[command(
    name = "pricegrid",
    about = "Pricegrid: multi-retailer grocery price ingestion and comparison",
    version,
    long_about = "Pricegrid ingests product pricing from heterogeneous retailer sources \
    (GraphQL catalog APIs, login-protected storefronts, OCR-parsed flyers), normalizes each \
    listing to a per-unit price, deduplicates it into an append-only SQLite history, and \
    answers compare and search queries over that history."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/pricegrid.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file, the prices table, and the dedup
    /// uniqueness index. Idempotent; running it multiple times is safe.
    Init,

    /// List configured stores with their adapter variants.
    Stores,

    /// Run one ingest pass: fetch, normalize, and persist every store.
    ///
    /// Stores are processed sequentially in configuration order with the
    /// configured throttle between them. A failing store is reported in
    /// the summary and never aborts the rest of the run.
    Ingest {
        /// Restrict the run to the given store ids (repeatable).
        #[arg(long = "store")]
        stores: Vec<String>,
    },

    /// Show the price history for one global trade item number.
    Compare {
        /// Exact gtin (EAN/GTIN barcode identifier).
        gtin: String,
    },

    /// Search products by name, latest snapshot per (product, store).
    Search {
        /// Case-insensitive substring of the product name.
        query: String,

        /// Maximum number of results to return.
        #[arg(long)]
        limit: Option<i64>,
    },

    /// Start the HTTP API (compare, search, health).
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pricegrid=info".into()),
        )
        // Diagnostics on stderr; stdout is for command output.
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Stores => {
            stores::list_stores(&cfg)?;
        }
        Commands::Ingest { stores } => {
            ingest::run_ingest(&cfg, &stores).await?;
        }
        Commands::Compare { gtin } => {
            query::run_compare(&cfg, &gtin).await?;
        }
        Commands::Search { query, limit } => {
            query::run_search(&cfg, &query, limit).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}

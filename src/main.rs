//! # Sinai Search CLI (`sinai`)
//!
//! ## Usage
//!
//! ```bash
//! sinai --config ./config/sinai.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `sinai search "<term>"` | Search the catalog and print the result as JSON |
//! | `sinai index <file.json>` | Post catalog documents to the Solr core |
//! | `sinai serve` | Start the HTTP search API |
//!
//! ## Logging
//!
//! Diagnostics go to stderr through `tracing`. The level defaults to `info`
//! and is controlled with `RUST_LOG`, e.g. `RUST_LOG=sinai_search=debug`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use sinai_search::{commands, config, server};

/// Sinai Search: keyword search over the Sinai palimpsests catalog.
#[derive(Parser)]
#[command(
    name = "sinai",
    about = "Sinai Search: keyword search over the Sinai palimpsests catalog",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/sinai.toml`. When the file is missing, a local
    /// Solr at `http://localhost:8983/solr/sinai` is assumed.
    #[arg(long, global = true, default_value = "./config/sinai.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the catalog.
    ///
    /// The term is matched as an exact phrase. Omit it to list every
    /// published manuscript.
    Search {
        /// Search term.
        #[arg(default_value = "")]
        term: String,
    },

    /// Index catalog documents.
    ///
    /// The file holds one JSON document or an array of documents, posted
    /// as-is to the Solr update endpoint and committed.
    Index {
        /// Path to the JSON file.
        path: PathBuf,
    },

    /// Start the HTTP search API on `server.bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cfg = if cli.config.exists() {
        config::load_config(&cli.config)?
    } else {
        tracing::warn!(
            path = %cli.config.display(),
            "config file not found, using defaults"
        );
        config::Config::minimal()
    };

    match cli.command {
        Commands::Search { term } => {
            commands::run_search(&cfg, &term).await?;
        }
        Commands::Index { path } => {
            commands::run_index(&cfg, &path).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}

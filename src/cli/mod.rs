//! Command-line interface for tuck.
//!
//! Provides commands for serving the HTTP API, reading and appending to
//! the stored content locally, and inspecting the resolved configuration.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use crate::api;
use crate::config::{self, ResolvedConfig};
use crate::core::{bootstrap, ContentStore, SqliteContentStore, StoreError};

/// tuck - durable append-only text register served over HTTP
#[derive(Parser, Debug)]
#[command(name = "tuck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to bind to (overrides TUCK_BIND and the config file)
        #[arg(short, long)]
        bind: Option<String>,

        /// Database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Seed document used when the database is empty
        #[arg(short, long)]
        seed: Option<PathBuf>,
    },

    /// Print the current content
    Show {
        /// Database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Append text to the content and print the result
    Append {
        /// Words to append (joined with spaces)
        #[arg(required = true)]
        text: Vec<String>,

        /// Database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let cfg = config::load_config()?;

        match self.command {
            Commands::Serve {
                bind,
                database,
                seed,
            } => {
                let bind = bind.unwrap_or_else(|| cfg.bind.clone());
                let database = database.unwrap_or_else(|| cfg.database.clone());
                let seed = seed.unwrap_or_else(|| cfg.seed.clone());
                serve(&bind, database, seed).await
            }
            Commands::Show { database } => {
                show_content(database.unwrap_or(cfg.database)).await
            }
            Commands::Append { text, database } => {
                append_content(&text.join(" "), database.unwrap_or(cfg.database)).await
            }
            Commands::Config => {
                show_config(&cfg);
                Ok(())
            }
        }
    }
}

/// Open the store, seed it if empty, and serve until a shutdown signal
async fn serve(bind: &str, database: PathBuf, seed: PathBuf) -> Result<()> {
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("Invalid bind address: {}", bind))?;

    let store = open_store(&database).await?;
    bootstrap(&store, &seed)
        .await
        .context("Failed to initialize content store")?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind HTTP server on {}", addr))?;

    api::serve(listener, store, api::shutdown_signal())
        .await
        .context("HTTP server failed")
}

/// Print the current content
async fn show_content(database: PathBuf) -> Result<()> {
    let store = open_store(&database).await?;
    let content = store.get().await.context("Failed to read content")?;
    store.close().await?;

    println!("{}", content);
    Ok(())
}

/// Append text and print the updated content
async fn append_content(text: &str, database: PathBuf) -> Result<()> {
    let store = open_store(&database).await?;
    let result = store.append(text).await;
    store.close().await?;

    match result {
        Ok(updated) => {
            println!("{}", updated);
            Ok(())
        }
        Err(StoreError::InvalidInput) => anyhow::bail!("No text provided"),
        Err(e) => Err(e).context("Failed to append content"),
    }
}

async fn open_store(database: &Path) -> Result<SqliteContentStore> {
    SqliteContentStore::open(database)
        .await
        .with_context(|| format!("Failed to open database: {}", database.display()))
}

/// Show resolved configuration
fn show_config(cfg: &ResolvedConfig) {
    println!("tuck configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Paths:");
    println!("  Home:     {}", cfg.home.display());
    println!("  Database: {}", cfg.database.display());
    println!("  Seed:     {}", cfg.seed.display());
    println!();
    println!("Server:");
    println!("  Bind:     {}", cfg.bind);
}

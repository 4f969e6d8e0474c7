//! # switchyardd — switchyard daemon
//!
//! Composition root that wires all adapters together.
//!
//! ## Responsibilities
//! - Parse configuration (CLI args, env vars, config file)
//! - Initialise logging
//! - Initialise the `SQLite` connection pool and run migrations
//! - Construct the action store, credential store and driver registry
//! - Run execution cycles on a timer and serve the HTTP API
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! `switchyardd once` runs a single cycle and exits, for use under cron.
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;
mod daemon;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use switchyard_adapter_credentials_toml::TomlCredentialStore;
use switchyard_adapter_devices::DeviceRegistry;
use switchyard_adapter_storage_sqlite_sqlx::SqliteActionRepository;
use switchyard_app::engine::ExecutionEngine;
use switchyard_app::services::ActionService;

use crate::config::Config;

#[derive(Parser)]
#[command(
    name = "switchyardd",
    about = "Executes scheduled home-automation actions against smart switches",
    version
)]
struct Cli {
    /// Configuration file
    #[arg(long, short, env = "SWITCHYARD_CONFIG", default_value = config::DEFAULT_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Default)]
enum Commands {
    /// Serve the API and run a cycle every tick (default)
    #[default]
    Serve,
    /// Run one execution cycle and exit
    Once,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Database
    let db = switchyard_adapter_storage_sqlite_sqlx::Config {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let repo = SqliteActionRepository::new(db.pool().clone());

    // Execution
    let credentials = TomlCredentialStore::new(&config.credentials.path);
    let registry = DeviceRegistry::new(config.http_timeout())?;
    let engine = ExecutionEngine::new(repo.clone(), credentials, registry);

    match cli.command.unwrap_or_default() {
        Commands::Once => {
            let summary = engine.run_cycle().await?;
            tracing::info!(%summary, "single cycle finished");
            Ok(())
        }
        Commands::Serve => daemon::run(&config, engine, ActionService::new(repo)).await,
    }
}

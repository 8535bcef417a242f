//! Chronolog API Server
//!
//! Run with: cargo run --bin chronolog
//!
//! # Configuration
//!
//! Settings come from `--config <path>` or the default config locations,
//! with `CHRONOLOG_*` environment variables applied on top.
//! `RUST_LOG` overrides the configured log level.

use chronolog::api::{serve, AppState};
use chronolog::config::{Config, LoggingConfig};
use chronolog::storage::RecordStore;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "chronolog")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Timestamped record store with inclusive range queries")]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Config loading logs before the configured subscriber exists
    let config = {
        let _bootstrap = tracing::subscriber::set_default(bootstrap_subscriber());
        let config = match args.config {
            Some(path) => Config::load_with_env(&path)?,
            None => Config::load_default()?,
        };
        config.validate()?;
        config
    };

    init_tracing(&config.logging);

    tracing::info!("Starting Chronolog API server v{}", env!("CARGO_PKG_VERSION"));

    let store_config = config.storage.to_store_config()?;
    let backend = store_config.backend;
    tracing::info!("Index backend: {}", backend);
    tracing::info!("Data directory: {:?}", store_config.data_dir);

    let store = Arc::new(RecordStore::open(store_config)?);
    tracing::info!("Record store initialized ({} records)", store.len()?);

    let api_config = config.api.to_server_config();
    let state = AppState::new(Arc::clone(&store), backend);

    // Run server
    tracing::info!("Starting server on {}:{}", api_config.host, api_config.port);
    serve(state, &api_config).await?;

    tracing::info!("Chronolog API server stopped");
    Ok(())
}

/// Subscriber used while the config itself is loaded
fn bootstrap_subscriber() -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chronolog=info".into()),
        )
        .finish()
}

/// Initialize tracing from the logging section
fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("chronolog={},tower_http=debug", logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    if logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

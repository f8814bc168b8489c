//! schoolmatch server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) overlaid with
//! `SCHOOLMATCH_*` environment variables, opens the SQLite store, and serves
//! the JSON API under `/api`.

mod settings;
mod retry;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use axum::Router;
use clap::Parser;
use schoolmatch_core::LifecycleManager;
use schoolmatch_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "SchoolMatch review server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("SCHOOLMATCH"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Open SQLite store, retrying while it is unavailable.
  let store_path = server_cfg.resolved_store_path();
  let store = retry::connect_with_retry(
    server_cfg.connect_attempts,
    server_cfg.connect_backoff(),
    || SqliteStore::open(&store_path),
  )
  .await
  .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let manager = LifecycleManager::new(Arc::new(store));
  let app = Router::new()
    .nest("/api", schoolmatch_api::api_router(manager))
    .layer(TraceLayer::new_for_http());
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

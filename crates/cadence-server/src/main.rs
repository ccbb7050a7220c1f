//! cadence-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the review API over HTTP.
//!
//! # First run
//!
//! An empty database has no one allowed to create employees. Seed the first
//! admin with:
//!
//! ```text
//! cargo run -p cadence-server -- --bootstrap-admin "Ada Admin" ada@example.com
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use cadence_core::{engine::ReviewEngine, event::ChannelNotifier};
use cadence_server::{ServerConfig, app, expand_tilde, spawn_delivery};
use cadence_store_sqlite::SqliteStore;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Cadence review cycle server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Create the first admin on an empty database before serving.
  #[arg(long, num_args = 2, value_names = ["NAME", "EMAIL"])]
  bootstrap_admin: Option<Vec<String>>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(&cli.config).context("failed to load configuration")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?
    .with_eligibility(server_cfg.eligibility.clone());

  let (notifier, events) = ChannelNotifier::new();
  let delivery = spawn_delivery(events);

  let engine = Arc::new(
    ReviewEngine::new(store.clone(), store, notifier).with_policy(server_cfg.policy.clone()),
  );

  if let Some([name, email]) = cli.bootstrap_admin.as_deref() {
    let admin = engine
      .bootstrap_admin(name.clone(), email.clone())
      .await
      .context("failed to bootstrap admin")?;
    println!("{}", admin.employee_id);
  }

  let address = server_cfg.address();
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app(engine))
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  // The router held the last notifier; let the delivery task drain.
  delivery.await.context("event delivery task failed")?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::warn!(error = %e, "failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutting down");
}

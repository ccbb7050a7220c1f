//! Wiring for the Cadence HTTP server: configuration, the event delivery
//! task, and the top-level router.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::Router;
use cadence_core::{
  directory::EmployeeRegistry,
  engine::ReviewEngine,
  event::{Notifier, ReviewEvent},
  policy::{Eligibility, SubmissionPolicy},
  store::ReviewStore,
};
use serde::Deserialize;
use tokio::{sync::mpsc::UnboundedReceiver, task::JoinHandle};
use tower_http::trace::TraceLayer;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` layered with
/// `CADENCE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:        String,
  pub port:        u16,
  pub store_path:  PathBuf,
  /// Fields a submission must fill in.
  #[serde(default)]
  pub policy:      SubmissionPolicy,
  /// Which active employees a cycle activation fans out to.
  #[serde(default)]
  pub eligibility: Eligibility,
}

impl ServerConfig {
  /// Build the configuration from an optional file plus the environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("CADENCE"))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// The API router with request tracing.
pub fn app<S, D, N>(engine: Arc<ReviewEngine<S, D, N>>) -> Router
where
  S: ReviewStore + 'static,
  D: EmployeeRegistry + 'static,
  N: Notifier + 'static,
{
  cadence_api::api_router(engine).layer(TraceLayer::new_for_http())
}

// ─── Event delivery ──────────────────────────────────────────────────────────

/// Drain events queued by a `ChannelNotifier`. Runs until every sender is
/// dropped.
pub fn spawn_delivery(mut events: UnboundedReceiver<ReviewEvent>) -> JoinHandle<()> {
  tokio::spawn(async move {
    while let Some(event) = events.recv().await {
      tracing::info!(
        event_id = %event.event_id,
        kind = %event.kind,
        subject = ?event.subject,
        actor_id = %event.actor_id,
        occurred_at = %event.occurred_at,
        "review event delivered"
      );
    }
    tracing::debug!("event channel closed");
  })
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

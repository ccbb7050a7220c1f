//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use cadence_core::Error as EngineError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// No usable `x-actor-id` header.
  #[error("missing or malformed x-actor-id header")]
  MissingActor,

  #[error("unknown actor: {0}")]
  UnknownActor(uuid::Uuid),

  #[error(transparent)]
  Engine(#[from] EngineError),
}

impl ApiError {
  fn status(&self) -> StatusCode {
    match self {
      ApiError::MissingActor | ApiError::UnknownActor(_) => StatusCode::UNAUTHORIZED,
      ApiError::Engine(e) => match e {
        EngineError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
        EngineError::NotFound { .. } => StatusCode::NOT_FOUND,
        EngineError::PreconditionFailed { .. }
        | EngineError::InvalidState(_)
        | EngineError::ConcurrentModification { .. } => StatusCode::CONFLICT,
        EngineError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::DependencyUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
      },
    }
  }

  fn kind(&self) -> &'static str {
    match self {
      ApiError::MissingActor | ApiError::UnknownActor(_) => "unauthenticated",
      ApiError::Engine(e) => match e {
        EngineError::PermissionDenied { .. } => "permission_denied",
        EngineError::NotFound { .. } => "not_found",
        EngineError::PreconditionFailed { .. } => "precondition_failed",
        EngineError::InvalidState(_) => "invalid_state",
        EngineError::ConcurrentModification { .. } => "concurrent_modification",
        EngineError::Validation { .. } => "validation",
        EngineError::DependencyUnavailable(_) => "dependency_unavailable",
      },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }

    let mut body = json!({ "error": self.to_string(), "kind": self.kind() });
    match &self {
      ApiError::Engine(EngineError::Validation { fields }) => {
        body["fields"] = json!(fields);
      }
      ApiError::Engine(EngineError::PermissionDenied { reason }) => {
        body["reason"] = json!(reason);
      }
      ApiError::Engine(EngineError::PreconditionFailed { rule }) => {
        body["rule"] = json!(rule);
      }
      _ => {}
    }
    (status, Json(body)).into_response()
  }
}

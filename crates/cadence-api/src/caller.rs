//! The `x-actor-id` extractor.
//!
//! The header is trusted as-is; authenticating it is the deployment's job.
//! The id is resolved through the engine's directory so deactivated
//! employees are turned away before any handler runs.

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use cadence_core::{
  Error as EngineError, directory::EmployeeDirectory, employee::Actor, engine::ReviewEngine,
  event::Notifier, store::ReviewStore,
};
use uuid::Uuid;

use crate::error::ApiError;

pub const ACTOR_HEADER: &str = "x-actor-id";

/// The resolved identity behind a request.
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub Actor);

impl<S, D, N> FromRequestParts<Arc<ReviewEngine<S, D, N>>> for Caller
where
  S: ReviewStore + 'static,
  D: EmployeeDirectory + 'static,
  N: Notifier + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    engine: &Arc<ReviewEngine<S, D, N>>,
  ) -> Result<Self, Self::Rejection> {
    let employee_id = parts
      .headers
      .get(ACTOR_HEADER)
      .and_then(|v| v.to_str().ok())
      .and_then(|v| Uuid::parse_str(v.trim()).ok())
      .ok_or(ApiError::MissingActor)?;

    match engine.resolve_actor(employee_id).await {
      Ok(actor) => Ok(Caller(actor)),
      Err(EngineError::NotFound { .. }) => Err(ApiError::UnknownActor(employee_id)),
      Err(e) => Err(e.into()),
    }
  }
}

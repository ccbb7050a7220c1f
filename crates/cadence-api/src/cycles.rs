//! Handlers for `/cycles` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/cycles` | Optional `?status=upcoming\|active\|closed` |
//! | `POST` | `/cycles` | Admin only; body: [`NewCycle`]; 201 |
//! | `GET`  | `/cycles/{id}` | |
//! | `POST` | `/cycles/{id}/activate` | Admin only; idempotent |
//! | `POST` | `/cycles/{id}/close` | Admin only |
//! | `GET`  | `/cycles/{id}/assessments` | Only the assessments the caller may see |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use cadence_core::{
  assessment::AssessmentView,
  cycle::{ActivationOutcome, CycleClosure, CycleStatus, NewCycle, ReviewCycle},
  directory::EmployeeDirectory,
  engine::ReviewEngine,
  event::Notifier,
  store::ReviewStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{caller::Caller, error::ApiError};

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub status: Option<CycleStatus>,
}

/// `GET /cycles[?status=<status>]`
pub async fn list<S, D, N>(
  State(engine): State<Arc<ReviewEngine<S, D, N>>>,
  Caller(actor): Caller,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<ReviewCycle>>, ApiError>
where
  S: ReviewStore + 'static,
  D: EmployeeDirectory + 'static,
  N: Notifier + 'static,
{
  Ok(Json(engine.list_cycles(&actor, params.status).await?))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /cycles`, body: `{"name":"2026 H1","start_date":"2026-01-01","end_date":"2026-06-30"}`
pub async fn create<S, D, N>(
  State(engine): State<Arc<ReviewEngine<S, D, N>>>,
  Caller(actor): Caller,
  Json(body): Json<NewCycle>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ReviewStore + 'static,
  D: EmployeeDirectory + 'static,
  N: Notifier + 'static,
{
  let cycle = engine.create_cycle(&actor, body).await?;
  Ok((StatusCode::CREATED, Json(cycle)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /cycles/{id}`
pub async fn get_one<S, D, N>(
  State(engine): State<Arc<ReviewEngine<S, D, N>>>,
  Caller(actor): Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<ReviewCycle>, ApiError>
where
  S: ReviewStore + 'static,
  D: EmployeeDirectory + 'static,
  N: Notifier + 'static,
{
  Ok(Json(engine.get_cycle(&actor, id).await?))
}

// ─── Lifecycle ───────────────────────────────────────────────────────────────

/// `POST /cycles/{id}/activate`
pub async fn activate<S, D, N>(
  State(engine): State<Arc<ReviewEngine<S, D, N>>>,
  Caller(actor): Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<ActivationOutcome>, ApiError>
where
  S: ReviewStore + 'static,
  D: EmployeeDirectory + 'static,
  N: Notifier + 'static,
{
  Ok(Json(engine.activate_cycle(&actor, id).await?))
}

/// `POST /cycles/{id}/close`
pub async fn close<S, D, N>(
  State(engine): State<Arc<ReviewEngine<S, D, N>>>,
  Caller(actor): Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<CycleClosure>, ApiError>
where
  S: ReviewStore + 'static,
  D: EmployeeDirectory + 'static,
  N: Notifier + 'static,
{
  Ok(Json(engine.close_cycle(&actor, id).await?))
}

// ─── Assessments ─────────────────────────────────────────────────────────────

/// `GET /cycles/{id}/assessments`
pub async fn assessments<S, D, N>(
  State(engine): State<Arc<ReviewEngine<S, D, N>>>,
  Caller(actor): Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<AssessmentView>>, ApiError>
where
  S: ReviewStore + 'static,
  D: EmployeeDirectory + 'static,
  N: Notifier + 'static,
{
  Ok(Json(engine.list_cycle_assessments(&actor, id).await?))
}

//! Handlers for `/assessments` endpoints.
//!
//! Every transition answers with the caller's [`AssessmentView`] of the
//! committed record.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/assessments/{id}` | Redacted per caller |
//! | `PUT`  | `/assessments/{id}/self` | Draft save; body: [`EmployeeContent`] |
//! | `POST` | `/assessments/{id}/start` | |
//! | `POST` | `/assessments/{id}/submit` | Body: [`EmployeeContent`] |
//! | `POST` | `/assessments/{id}/manager-review` | Body: [`ManagerContent`] |
//! | `POST` | `/assessments/{id}/acknowledge` | Idempotent |
//! | `POST` | `/assessments/{id}/override` | Admin only; body: [`OverrideBody`] |
//! | `GET`  | `/assessments/{id}/audit` | Admin only |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use cadence_core::{
  assessment::{AssessmentView, AuditEntry, EmployeeContent, ManagerContent, Stage},
  directory::EmployeeDirectory,
  engine::ReviewEngine,
  event::Notifier,
  store::ReviewStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{caller::Caller, error::ApiError};

/// `GET /assessments/{id}`
pub async fn get_one<S, D, N>(
  State(engine): State<Arc<ReviewEngine<S, D, N>>>,
  Caller(actor): Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<AssessmentView>, ApiError>
where
  S: ReviewStore + 'static,
  D: EmployeeDirectory + 'static,
  N: Notifier + 'static,
{
  Ok(Json(engine.view_assessment(&actor, id).await?))
}

/// `PUT /assessments/{id}/self`
pub async fn save_self<S, D, N>(
  State(engine): State<Arc<ReviewEngine<S, D, N>>>,
  Caller(actor): Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<EmployeeContent>,
) -> Result<Json<AssessmentView>, ApiError>
where
  S: ReviewStore + 'static,
  D: EmployeeDirectory + 'static,
  N: Notifier + 'static,
{
  Ok(Json(engine.save_self_assessment(&actor, id, body).await?))
}

/// `POST /assessments/{id}/start`
pub async fn start<S, D, N>(
  State(engine): State<Arc<ReviewEngine<S, D, N>>>,
  Caller(actor): Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<AssessmentView>, ApiError>
where
  S: ReviewStore + 'static,
  D: EmployeeDirectory + 'static,
  N: Notifier + 'static,
{
  Ok(Json(engine.start_assessment(&actor, id).await?))
}

/// `POST /assessments/{id}/submit`
pub async fn submit<S, D, N>(
  State(engine): State<Arc<ReviewEngine<S, D, N>>>,
  Caller(actor): Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<EmployeeContent>,
) -> Result<Json<AssessmentView>, ApiError>
where
  S: ReviewStore + 'static,
  D: EmployeeDirectory + 'static,
  N: Notifier + 'static,
{
  Ok(Json(engine.submit_self_assessment(&actor, id, body).await?))
}

/// `POST /assessments/{id}/manager-review`
pub async fn manager_review<S, D, N>(
  State(engine): State<Arc<ReviewEngine<S, D, N>>>,
  Caller(actor): Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<ManagerContent>,
) -> Result<Json<AssessmentView>, ApiError>
where
  S: ReviewStore + 'static,
  D: EmployeeDirectory + 'static,
  N: Notifier + 'static,
{
  Ok(Json(engine.submit_manager_review(&actor, id, body).await?))
}

/// `POST /assessments/{id}/acknowledge`
pub async fn acknowledge<S, D, N>(
  State(engine): State<Arc<ReviewEngine<S, D, N>>>,
  Caller(actor): Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<AssessmentView>, ApiError>
where
  S: ReviewStore + 'static,
  D: EmployeeDirectory + 'static,
  N: Notifier + 'static,
{
  Ok(Json(engine.acknowledge_review(&actor, id).await?))
}

/// JSON body accepted by `POST /assessments/{id}/override`.
#[derive(Debug, Deserialize)]
pub struct OverrideBody {
  pub target: Stage,
  pub reason: Option<String>,
}

/// `POST /assessments/{id}/override`
pub async fn override_stage<S, D, N>(
  State(engine): State<Arc<ReviewEngine<S, D, N>>>,
  Caller(actor): Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<OverrideBody>,
) -> Result<Json<AssessmentView>, ApiError>
where
  S: ReviewStore + 'static,
  D: EmployeeDirectory + 'static,
  N: Notifier + 'static,
{
  Ok(Json(engine.admin_override(&actor, id, body.target, body.reason).await?))
}

/// `GET /assessments/{id}/audit`
pub async fn audit<S, D, N>(
  State(engine): State<Arc<ReviewEngine<S, D, N>>>,
  Caller(actor): Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<AuditEntry>>, ApiError>
where
  S: ReviewStore + 'static,
  D: EmployeeDirectory + 'static,
  N: Notifier + 'static,
{
  Ok(Json(engine.audit_trail(&actor, id).await?))
}

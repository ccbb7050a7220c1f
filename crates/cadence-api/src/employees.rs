//! Handlers for `/employees` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/employees` | Admin only; `?include_inactive=true` |
//! | `POST`  | `/employees` | Admin only; body: [`NewEmployee`]; 201 |
//! | `GET`   | `/employees/{id}` | Self, direct manager, or admin |
//! | `PATCH` | `/employees/{id}` | Admin only; body: [`EmployeeUpdate`] |
//! | `POST`  | `/employees/{id}/deactivate` | Admin only |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use cadence_core::{
  directory::EmployeeRegistry,
  employee::{Employee, EmployeeUpdate, NewEmployee},
  engine::ReviewEngine,
  event::Notifier,
  store::ReviewStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{caller::Caller, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub include_inactive: bool,
}

/// `GET /employees[?include_inactive=true]`
pub async fn list<S, D, N>(
  State(engine): State<Arc<ReviewEngine<S, D, N>>>,
  Caller(actor): Caller,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Employee>>, ApiError>
where
  S: ReviewStore + 'static,
  D: EmployeeRegistry + 'static,
  N: Notifier + 'static,
{
  Ok(Json(engine.list_employees(&actor, params.include_inactive).await?))
}

/// `POST /employees`
pub async fn create<S, D, N>(
  State(engine): State<Arc<ReviewEngine<S, D, N>>>,
  Caller(actor): Caller,
  Json(body): Json<NewEmployee>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ReviewStore + 'static,
  D: EmployeeRegistry + 'static,
  N: Notifier + 'static,
{
  let employee = engine.add_employee(&actor, body).await?;
  Ok((StatusCode::CREATED, Json(employee)))
}

/// `GET /employees/{id}`
pub async fn get_one<S, D, N>(
  State(engine): State<Arc<ReviewEngine<S, D, N>>>,
  Caller(actor): Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<Employee>, ApiError>
where
  S: ReviewStore + 'static,
  D: EmployeeRegistry + 'static,
  N: Notifier + 'static,
{
  Ok(Json(engine.get_employee(&actor, id).await?))
}

/// `PATCH /employees/{id}`
pub async fn update<S, D, N>(
  State(engine): State<Arc<ReviewEngine<S, D, N>>>,
  Caller(actor): Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<EmployeeUpdate>,
) -> Result<Json<Employee>, ApiError>
where
  S: ReviewStore + 'static,
  D: EmployeeRegistry + 'static,
  N: Notifier + 'static,
{
  Ok(Json(engine.update_employee(&actor, id, body).await?))
}

/// `POST /employees/{id}/deactivate`
pub async fn deactivate<S, D, N>(
  State(engine): State<Arc<ReviewEngine<S, D, N>>>,
  Caller(actor): Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<Employee>, ApiError>
where
  S: ReviewStore + 'static,
  D: EmployeeRegistry + 'static,
  N: Notifier + 'static,
{
  Ok(Json(engine.deactivate_employee(&actor, id).await?))
}

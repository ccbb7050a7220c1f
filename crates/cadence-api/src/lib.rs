//! JSON REST API for Cadence.
//!
//! Exposes an axum [`Router`] over a [`ReviewEngine`] backed by any store and
//! employee registry. Callers identify themselves with an `x-actor-id` header;
//! authenticating that header, TLS, and other transport concerns are the
//! deployment's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", cadence_api::api_router(engine.clone()))
//! ```

pub mod assessments;
pub mod caller;
pub mod cycles;
pub mod employees;
pub mod error;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use cadence_core::{
  directory::EmployeeRegistry, engine::ReviewEngine, event::Notifier, store::ReviewStore,
};

pub use caller::{ACTOR_HEADER, Caller};
pub use error::ApiError;

/// Build a fully-materialised API router for `engine`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, D, N>(engine: Arc<ReviewEngine<S, D, N>>) -> Router<()>
where
  S: ReviewStore + 'static,
  D: EmployeeRegistry + 'static,
  N: Notifier + 'static,
{
  Router::new()
    // Employees
    .route(
      "/employees",
      get(employees::list::<S, D, N>).post(employees::create::<S, D, N>),
    )
    .route(
      "/employees/{id}",
      get(employees::get_one::<S, D, N>).patch(employees::update::<S, D, N>),
    )
    .route("/employees/{id}/deactivate", post(employees::deactivate::<S, D, N>))
    // Cycles
    .route("/cycles", get(cycles::list::<S, D, N>).post(cycles::create::<S, D, N>))
    .route("/cycles/{id}", get(cycles::get_one::<S, D, N>))
    .route("/cycles/{id}/activate", post(cycles::activate::<S, D, N>))
    .route("/cycles/{id}/close", post(cycles::close::<S, D, N>))
    .route("/cycles/{id}/assessments", get(cycles::assessments::<S, D, N>))
    // Assessments
    .route("/assessments/{id}", get(assessments::get_one::<S, D, N>))
    .route("/assessments/{id}/self", put(assessments::save_self::<S, D, N>))
    .route("/assessments/{id}/start", post(assessments::start::<S, D, N>))
    .route("/assessments/{id}/submit", post(assessments::submit::<S, D, N>))
    .route(
      "/assessments/{id}/manager-review",
      post(assessments::manager_review::<S, D, N>),
    )
    .route("/assessments/{id}/acknowledge", post(assessments::acknowledge::<S, D, N>))
    .route("/assessments/{id}/override", post(assessments::override_stage::<S, D, N>))
    .route("/assessments/{id}/audit", get(assessments::audit::<S, D, N>))
    .with_state(engine)
}

#[cfg(test)]
mod tests;

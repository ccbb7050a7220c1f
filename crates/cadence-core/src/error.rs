//! Error types for `cadence-core`.
//!
//! Every engine operation returns one of these kinds to the caller. Nothing is
//! swallowed except notifier failures, which are logged by the engine.

use thiserror::Error;
use uuid::Uuid;

use crate::{permission::Denial, workflow::Rule};

#[derive(Debug, Error)]
pub enum Error {
  /// A transition was attempted from the wrong state.
  #[error("precondition failed: {rule}")]
  PreconditionFailed { rule: Rule },

  /// The permission resolver rejected the actor for this operation.
  #[error("permission denied: {reason}")]
  PermissionDenied { reason: Denial },

  /// The operation is not valid for the current cycle or employee status.
  #[error("invalid state: {0}")]
  InvalidState(String),

  /// The assessment changed between read and conditional write.
  #[error("assessment {assessment_id} was modified concurrently")]
  ConcurrentModification { assessment_id: Uuid },

  /// The store or the employee directory failed.
  #[error("dependency unavailable: {0}")]
  DependencyUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// Required fields are missing or malformed.
  #[error("validation failed: {}", fields.join(", "))]
  Validation { fields: Vec<String> },

  #[error("{entity} not found: {id}")]
  NotFound { entity: &'static str, id: Uuid },
}

impl Error {
  /// Wrap a collaborator failure.
  pub fn dependency<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::DependencyUnavailable(Box::new(err))
  }

  pub fn validation<I, F>(fields: I) -> Self
  where
    I: IntoIterator<Item = F>,
    F: Into<String>,
  {
    Self::Validation { fields: fields.into_iter().map(Into::into).collect() }
  }

  pub fn denied(reason: Denial) -> Self { Self::PermissionDenied { reason } }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

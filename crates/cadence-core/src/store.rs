//! The `ReviewStore` trait and its outcome types.
//!
//! The trait is implemented by storage backends (e.g.
//! `cadence-store-sqlite`). Domain outcomes (a lost race, a cycle that is no
//! longer upcoming) come back as values; `Self::Error` is reserved for the
//! backend itself failing.

use std::future::Future;

use uuid::Uuid;

use crate::{
  assessment::{Assessment, AuditEntry, NewAssessment},
  cycle::{CycleStatus, NewCycle, ReviewCycle},
};

/// Result of [`ReviewStore::activate_cycle`].
#[derive(Debug, Clone)]
pub enum ActivationCommit {
  /// This call moved the cycle to `active`.
  Activated {
    cycle:   ReviewCycle,
    created: usize,
    total:   usize,
  },
  /// Another caller activated the cycle first. Nothing was written.
  AlreadyActive { total: usize },
  /// The cycle is missing or closed. Nothing was written.
  Rejected(Option<CycleStatus>),
}

/// The extra condition a conditional assessment write checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteGuard {
  /// Version check only (admin writes).
  VersionOnly,
  /// Version check, and the parent cycle must still be `active`.
  CycleActive,
}

#[derive(Debug, Clone)]
pub enum WriteOutcome {
  /// The write landed; the record carries its new version.
  Applied(Assessment),
  /// The version or the guard no longer held at commit time.
  Conflict,
}

/// Abstraction over a Cadence persistence backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ReviewStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Cycles ────────────────────────────────────────────────────────────

  /// Persist a new `upcoming` cycle.
  fn insert_cycle(
    &self,
    input: NewCycle,
  ) -> impl Future<Output = Result<ReviewCycle, Self::Error>> + Send + '_;

  fn get_cycle(
    &self,
    cycle_id: Uuid,
  ) -> impl Future<Output = Result<Option<ReviewCycle>, Self::Error>> + Send + '_;

  fn list_cycles(
    &self,
    status: Option<CycleStatus>,
  ) -> impl Future<Output = Result<Vec<ReviewCycle>, Self::Error>> + Send + '_;

  /// In one transaction: insert every assessment in `batch` that does not
  /// already exist for its `(employee_id, cycle_id)`, then move the cycle
  /// from `upcoming` to `active`. Any failure rolls back the whole batch.
  fn activate_cycle(
    &self,
    cycle_id: Uuid,
    batch: Vec<NewAssessment>,
  ) -> impl Future<Output = Result<ActivationCommit, Self::Error>> + Send + '_;

  /// Move an `active` cycle to `closed`. Returns `None` if the cycle was not
  /// active at commit time.
  fn close_cycle(
    &self,
    cycle_id: Uuid,
  ) -> impl Future<Output = Result<Option<ReviewCycle>, Self::Error>> + Send + '_;

  // ── Assessments ───────────────────────────────────────────────────────

  fn get_assessment(
    &self,
    assessment_id: Uuid,
  ) -> impl Future<Output = Result<Option<Assessment>, Self::Error>> + Send + '_;

  fn list_assessments(
    &self,
    cycle_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Assessment>, Self::Error>> + Send + '_;

  /// Write `next` if the stored version still equals `next.version` and
  /// `guard` holds; the stored version is incremented. `audit`, when given,
  /// is inserted in the same transaction.
  fn write_assessment(
    &self,
    next: Assessment,
    guard: WriteGuard,
    audit: Option<AuditEntry>,
  ) -> impl Future<Output = Result<WriteOutcome, Self::Error>> + Send + '_;

  /// Override audit entries for an assessment, oldest first.
  fn list_audit(
    &self,
    assessment_id: Uuid,
  ) -> impl Future<Output = Result<Vec<AuditEntry>, Self::Error>> + Send + '_;
}

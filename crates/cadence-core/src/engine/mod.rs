//! [`ReviewEngine`]: the caller-facing operations.
//!
//! The engine owns no state of its own. Each operation takes the acting
//! [`Actor`] explicitly, reads through the store, runs the pure resolver and
//! state machine, writes conditionally, and only then hands an event to the
//! notifier. No store transaction is ever open across a directory or notifier
//! call.

mod activation;
mod assessments;
mod employees;
mod lifecycle;

use uuid::Uuid;

use crate::{
  assessment::Assessment,
  cycle::ReviewCycle,
  directory::EmployeeDirectory,
  employee::Actor,
  event::{EventKind, EventSubject, Notifier, ReviewEvent},
  permission::Denial,
  policy::SubmissionPolicy,
  store::ReviewStore,
  Error, Result,
};

pub struct ReviewEngine<S, D, N> {
  store:     S,
  directory: D,
  notifier:  N,
  policy:    SubmissionPolicy,
}

impl<S, D, N> ReviewEngine<S, D, N>
where
  S: ReviewStore,
  D: EmployeeDirectory,
  N: Notifier,
{
  pub fn new(store: S, directory: D, notifier: N) -> Self {
    Self { store, directory, notifier, policy: SubmissionPolicy::default() }
  }

  pub fn with_policy(mut self, policy: SubmissionPolicy) -> Self {
    self.policy = policy;
    self
  }

  pub fn policy(&self) -> &SubmissionPolicy { &self.policy }

  /// Look up the employee behind an identity handed over by the transport.
  /// Deactivated employees cannot act.
  pub async fn resolve_actor(&self, employee_id: Uuid) -> Result<Actor> {
    let employee = self
      .directory
      .get_employee(employee_id)
      .await
      .map_err(Error::dependency)?
      .ok_or(Error::NotFound { entity: "employee", id: employee_id })?;
    if !employee.is_active {
      return Err(Error::denied(Denial::InactiveActor));
    }
    Ok(Actor::from(&employee))
  }

  async fn load_cycle(&self, cycle_id: Uuid) -> Result<ReviewCycle> {
    self
      .store
      .get_cycle(cycle_id)
      .await
      .map_err(Error::dependency)?
      .ok_or(Error::NotFound { entity: "cycle", id: cycle_id })
  }

  async fn load_assessment(&self, assessment_id: Uuid) -> Result<Assessment> {
    self
      .store
      .get_assessment(assessment_id)
      .await
      .map_err(Error::dependency)?
      .ok_or(Error::NotFound { entity: "assessment", id: assessment_id })
  }

  /// Hand an event to the notifier. Runs after commit; a failure here must
  /// not undo the transition, so it is only logged.
  fn emit(&self, kind: EventKind, subject: EventSubject, actor: &Actor) {
    let event = ReviewEvent::new(kind, subject, actor.employee_id);
    let event_id = event.event_id;
    if let Err(e) = self.notifier.notify(event) {
      tracing::warn!(%event_id, %kind, error = %e, "notification delivery failed");
    }
  }
}

fn require_admin(actor: &Actor) -> Result<()> {
  if actor.is_admin() { Ok(()) } else { Err(Error::denied(Denial::AdminOnly)) }
}

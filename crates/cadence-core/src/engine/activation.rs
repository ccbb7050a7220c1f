//! Cycle activation and assessment fan-out.

use uuid::Uuid;

use super::{require_admin, ReviewEngine};
use crate::{
  assessment::NewAssessment,
  cycle::{ActivationOutcome, CycleStatus},
  directory::EmployeeDirectory,
  employee::Actor,
  event::{EventKind, EventSubject, Notifier},
  store::{ActivationCommit, ReviewStore},
  Error, Result,
};

impl<S, D, N> ReviewEngine<S, D, N>
where
  S: ReviewStore,
  D: EmployeeDirectory,
  N: Notifier,
{
  /// Move an `upcoming` cycle to `active`, creating one assessment per
  /// eligible employee in the same transaction.
  ///
  /// Idempotent: activating an active cycle (or losing an activation race)
  /// reports zero created and the existing total.
  pub async fn activate_cycle(
    &self,
    actor: &Actor,
    cycle_id: Uuid,
  ) -> Result<ActivationOutcome> {
    require_admin(actor)?;
    let cycle = self.load_cycle(cycle_id).await?;
    match cycle.status {
      CycleStatus::Upcoming => {}
      CycleStatus::Active => {
        let total = self.existing_total(cycle_id).await?;
        tracing::debug!(%cycle_id, total, "cycle already active");
        return Ok(ActivationOutcome {
          cycle_id,
          assessments_created: 0,
          assessments_total: total,
        });
      }
      CycleStatus::Closed => {
        return Err(Error::InvalidState(format!("cycle {cycle_id} is closed")));
      }
    }

    // Resolved before the transaction opens; the store never waits on the
    // directory.
    let batch = self.resolve_batch(cycle_id).await?;

    match self
      .store
      .activate_cycle(cycle_id, batch)
      .await
      .map_err(Error::dependency)?
    {
      ActivationCommit::Activated { cycle, created, total } => {
        tracing::info!(
          cycle_id = %cycle.cycle_id,
          created,
          total,
          actor_id = %actor.employee_id,
          "cycle activated"
        );
        self.emit(EventKind::CycleActivated, EventSubject::Cycle(cycle_id), actor);
        Ok(ActivationOutcome {
          cycle_id,
          assessments_created: created,
          assessments_total: total,
        })
      }
      ActivationCommit::AlreadyActive { total } => {
        tracing::debug!(%cycle_id, total, "cycle activated concurrently");
        Ok(ActivationOutcome {
          cycle_id,
          assessments_created: 0,
          assessments_total: total,
        })
      }
      ActivationCommit::Rejected(Some(status)) => {
        Err(Error::InvalidState(format!("cycle {cycle_id} is {status}")))
      }
      ActivationCommit::Rejected(None) => {
        Err(Error::NotFound { entity: "cycle", id: cycle_id })
      }
    }
  }

  async fn existing_total(&self, cycle_id: Uuid) -> Result<usize> {
    Ok(
      self
        .store
        .list_assessments(cycle_id)
        .await
        .map_err(Error::dependency)?
        .len(),
    )
  }

  async fn resolve_batch(&self, cycle_id: Uuid) -> Result<Vec<NewAssessment>> {
    let mut employees = self
      .directory
      .list_eligible_employees(cycle_id)
      .await
      .map_err(Error::dependency)?;
    employees.sort_unstable();
    employees.dedup();

    let mut batch = Vec::with_capacity(employees.len());
    for employee_id in employees {
      let manager_id = self
        .directory
        .get_manager_of(employee_id)
        .await
        .map_err(Error::dependency)?;
      batch.push(NewAssessment { cycle_id, employee_id, manager_id });
    }
    Ok(batch)
  }
}

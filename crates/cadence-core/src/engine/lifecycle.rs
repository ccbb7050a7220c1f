//! Cycle lifecycle: creation, reads, and closure. Activation lives in
//! `activation.rs`.

use uuid::Uuid;

use super::{require_admin, ReviewEngine};
use crate::{
  cycle::{CycleClosure, CycleStatus, NewCycle, ReviewCycle},
  directory::EmployeeDirectory,
  employee::Actor,
  event::{EventKind, EventSubject, Notifier},
  store::ReviewStore,
  Error, Result,
};

impl<S, D, N> ReviewEngine<S, D, N>
where
  S: ReviewStore,
  D: EmployeeDirectory,
  N: Notifier,
{
  /// Create an `upcoming` cycle.
  pub async fn create_cycle(&self, actor: &Actor, input: NewCycle) -> Result<ReviewCycle> {
    require_admin(actor)?;
    input.validate()?;
    let cycle = self.store.insert_cycle(input).await.map_err(Error::dependency)?;
    tracing::info!(
      cycle_id = %cycle.cycle_id,
      name = %cycle.name,
      actor_id = %actor.employee_id,
      "cycle created"
    );
    Ok(cycle)
  }

  pub async fn get_cycle(&self, _actor: &Actor, cycle_id: Uuid) -> Result<ReviewCycle> {
    self.load_cycle(cycle_id).await
  }

  pub async fn list_cycles(
    &self,
    _actor: &Actor,
    status: Option<CycleStatus>,
  ) -> Result<Vec<ReviewCycle>> {
    self.store.list_cycles(status).await.map_err(Error::dependency)
  }

  /// Close an `active` cycle.
  ///
  /// Closing is a cutoff, not a completion gate: assessments that were never
  /// acknowledged are frozen as they are, and the returned summary counts
  /// them.
  pub async fn close_cycle(&self, actor: &Actor, cycle_id: Uuid) -> Result<CycleClosure> {
    require_admin(actor)?;
    let cycle = self.load_cycle(cycle_id).await?;
    if cycle.status != CycleStatus::Active {
      return Err(Error::InvalidState(format!(
        "cycle {cycle_id} is {}, only active cycles can be closed",
        cycle.status
      )));
    }

    let Some(closed) = self.store.close_cycle(cycle_id).await.map_err(Error::dependency)?
    else {
      // Lost a race with another close.
      let current = self.load_cycle(cycle_id).await?;
      return Err(Error::InvalidState(format!(
        "cycle {cycle_id} is {}, only active cycles can be closed",
        current.status
      )));
    };

    let assessments = self
      .store
      .list_assessments(cycle_id)
      .await
      .map_err(Error::dependency)?;
    let unacknowledged = assessments.iter().filter(|a| !a.is_acknowledged()).count();

    if unacknowledged > 0 {
      tracing::warn!(
        %cycle_id,
        unacknowledged,
        total = assessments.len(),
        "cycle closed with unacknowledged assessments"
      );
    } else {
      tracing::info!(%cycle_id, total = assessments.len(), "cycle closed");
    }
    self.emit(EventKind::CycleClosed, EventSubject::Cycle(cycle_id), actor);

    Ok(CycleClosure {
      cycle: closed,
      assessments_total: assessments.len(),
      unacknowledged,
    })
  }
}

//! Assessment transitions and reads.

use chrono::Utc;
use uuid::Uuid;

use super::{require_admin, ReviewEngine};
use crate::{
  assessment::{
    Assessment, AssessmentView, AuditEntry, EmployeeContent, ManagerContent, Stage,
  },
  cycle::{CycleStatus, ReviewCycle},
  directory::EmployeeDirectory,
  employee::Actor,
  event::{EventKind, EventSubject, Notifier},
  permission::{self, Denial},
  store::{ReviewStore, WriteGuard, WriteOutcome},
  workflow, Error, Result,
};

impl<S, D, N> ReviewEngine<S, D, N>
where
  S: ReviewStore,
  D: EmployeeDirectory,
  N: Notifier,
{
  // ── Transitions ───────────────────────────────────────────────────────

  /// `not_started → in_progress`.
  pub async fn start_assessment(
    &self,
    actor: &Actor,
    assessment_id: Uuid,
  ) -> Result<AssessmentView> {
    let (current, cycle) = self.load_with_cycle(assessment_id).await?;
    let next = workflow::start(actor, &current, cycle.status, Utc::now())?;
    let saved = self.commit(actor, next, None).await?;
    self.transitioned(actor, &current, &saved, EventKind::AssessmentStarted);
    present(actor, &saved, cycle.status)
  }

  /// Save draft employee content; the status does not change.
  pub async fn save_self_assessment(
    &self,
    actor: &Actor,
    assessment_id: Uuid,
    content: EmployeeContent,
  ) -> Result<AssessmentView> {
    let (current, cycle) = self.load_with_cycle(assessment_id).await?;
    let next = workflow::save_self(actor, &current, cycle.status, content, Utc::now())?;
    let saved = self.commit(actor, next, None).await?;
    tracing::debug!(%assessment_id, actor_id = %actor.employee_id, "self-assessment draft saved");
    present(actor, &saved, cycle.status)
  }

  /// `in_progress → employee_complete`.
  pub async fn submit_self_assessment(
    &self,
    actor: &Actor,
    assessment_id: Uuid,
    content: EmployeeContent,
  ) -> Result<AssessmentView> {
    let (current, cycle) = self.load_with_cycle(assessment_id).await?;
    let next = workflow::submit_self(
      actor,
      &current,
      cycle.status,
      content,
      &self.policy,
      Utc::now(),
    )?;
    let saved = self.commit(actor, next, None).await?;
    self.transitioned(actor, &current, &saved, EventKind::SelfAssessmentSubmitted);
    present(actor, &saved, cycle.status)
  }

  /// Complete the manager review. Status and every manager field land in one
  /// conditional write or not at all.
  pub async fn submit_manager_review(
    &self,
    actor: &Actor,
    assessment_id: Uuid,
    content: ManagerContent,
  ) -> Result<AssessmentView> {
    let (current, cycle) = self.load_with_cycle(assessment_id).await?;
    let next = workflow::submit_manager(
      actor,
      &current,
      cycle.status,
      content,
      &self.policy,
      Utc::now(),
    )?;
    let saved = self.commit(actor, next, None).await?;
    self.transitioned(actor, &current, &saved, EventKind::ManagerReviewSubmitted);
    present(actor, &saved, cycle.status)
  }

  /// Record the employee's acknowledgment. Repeating the call returns the
  /// record with the original timestamp and emits nothing.
  pub async fn acknowledge_review(
    &self,
    actor: &Actor,
    assessment_id: Uuid,
  ) -> Result<AssessmentView> {
    let (current, cycle) = self.load_with_cycle(assessment_id).await?;
    match workflow::acknowledge(actor, &current, cycle.status, Utc::now())? {
      Some(next) => {
        let saved = self.commit(actor, next, None).await?;
        self.transitioned(actor, &current, &saved, EventKind::ReviewAcknowledged);
        present(actor, &saved, cycle.status)
      }
      None => {
        tracing::debug!(%assessment_id, "acknowledgment already recorded");
        present(actor, &current, cycle.status)
      }
    }
  }

  /// Force an assessment to `target`. Always audited.
  pub async fn admin_override(
    &self,
    actor: &Actor,
    assessment_id: Uuid,
    target: Stage,
    reason: Option<String>,
  ) -> Result<AssessmentView> {
    let (current, cycle) = self.load_with_cycle(assessment_id).await?;
    let (next, entry) =
      workflow::override_stage(actor, &current, target, reason, Utc::now())?;
    let audit_id = entry.audit_id;
    let saved = self.commit(actor, next, Some(entry)).await?;

    tracing::info!(
      %assessment_id,
      %audit_id,
      actor_id = %actor.employee_id,
      from = %current.stage(),
      to = %target,
      "admin override applied"
    );
    self.emit(EventKind::AdminOverride, EventSubject::Assessment(assessment_id), actor);
    present(actor, &saved, cycle.status)
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  pub async fn view_assessment(
    &self,
    actor: &Actor,
    assessment_id: Uuid,
  ) -> Result<AssessmentView> {
    let (current, cycle) = self.load_with_cycle(assessment_id).await?;
    present(actor, &current, cycle.status)
  }

  /// Assessments of a cycle visible to `actor`: all of them for admins, the
  /// actor's own and their reports' otherwise.
  pub async fn list_cycle_assessments(
    &self,
    actor: &Actor,
    cycle_id: Uuid,
  ) -> Result<Vec<AssessmentView>> {
    let cycle = self.load_cycle(cycle_id).await?;
    let assessments = self
      .store
      .list_assessments(cycle_id)
      .await
      .map_err(Error::dependency)?;
    Ok(
      assessments
        .iter()
        .filter_map(|a| permission::view(actor, a, cycle.status))
        .collect(),
    )
  }

  pub async fn audit_trail(
    &self,
    actor: &Actor,
    assessment_id: Uuid,
  ) -> Result<Vec<AuditEntry>> {
    require_admin(actor)?;
    self.load_assessment(assessment_id).await?;
    self
      .store
      .list_audit(assessment_id)
      .await
      .map_err(Error::dependency)
  }

  // ── Helpers ───────────────────────────────────────────────────────────

  async fn load_with_cycle(&self, assessment_id: Uuid) -> Result<(Assessment, ReviewCycle)> {
    let assessment = self.load_assessment(assessment_id).await?;
    let cycle = self.load_cycle(assessment.cycle_id).await?;
    Ok((assessment, cycle))
  }

  /// Conditionally write `next` against the version it was computed from.
  async fn commit(
    &self,
    actor: &Actor,
    next: Assessment,
    audit: Option<AuditEntry>,
  ) -> Result<Assessment> {
    let assessment_id = next.assessment_id;
    let guard = if actor.is_admin() { WriteGuard::VersionOnly } else { WriteGuard::CycleActive };
    match self
      .store
      .write_assessment(next, guard, audit)
      .await
      .map_err(Error::dependency)?
    {
      WriteOutcome::Applied(saved) => Ok(saved),
      WriteOutcome::Conflict => {
        tracing::info!(%assessment_id, "stale transition rejected");
        Err(Error::ConcurrentModification { assessment_id })
      }
    }
  }

  fn transitioned(&self, actor: &Actor, from: &Assessment, to: &Assessment, kind: EventKind) {
    tracing::info!(
      assessment_id = %to.assessment_id,
      actor_id = %actor.employee_id,
      from = %from.stage(),
      to = %to.stage(),
      version = to.version,
      "assessment transition committed"
    );
    self.emit(kind, EventSubject::Assessment(to.assessment_id), actor);
  }
}

fn present(actor: &Actor, assessment: &Assessment, cycle: CycleStatus) -> Result<AssessmentView> {
  permission::view(actor, assessment, cycle).ok_or(Error::denied(Denial::NotParticipant))
}

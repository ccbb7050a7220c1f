//! The assessment state machine.
//!
//! Each transition is a pure function from the current record to the next
//! one. Nothing here persists anything: the engine writes the returned
//! record conditionally on the version it read, so a transition computed
//! against a superseded record never lands.
//!
//! Checks run in a fixed order: participant identity and frozen records
//! (`PermissionDenied`), then the state precondition (`PreconditionFailed`),
//! then the resolver's edit window, then content validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  assessment::{
    Assessment, AuditEntry, EmployeeContent, ManagerContent, ManagerReviewStatus,
    SelfAssessmentStatus, Stage,
  },
  cycle::CycleStatus,
  employee::Actor,
  permission::{self, Access, Denial, FieldGroup},
  policy::SubmissionPolicy,
  Error, Result,
};

/// The transition rule a caller violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
  #[strum(to_string = "self-assessment has already been started")]
  AlreadyStarted,
  #[strum(to_string = "self-assessment must be in progress")]
  NotInProgress,
  #[strum(to_string = "self-assessment has not been completed by the employee")]
  SelfAssessmentIncomplete,
  #[strum(to_string = "manager review has already been completed")]
  ManagerReviewAlreadyCompleted,
  #[strum(to_string = "manager review has not been completed")]
  ManagerReviewIncomplete,
}

// ─── Gates ───────────────────────────────────────────────────────────────────

/// Consult the resolver for `group`, letting the state precondition explain a
/// closed edit window before the resolver's own verdict is enforced.
fn gate(
  actor: &Actor,
  assessment: &Assessment,
  cycle: CycleStatus,
  group: FieldGroup,
  precondition: impl FnOnce(&Assessment) -> Option<Rule>,
) -> Result<()> {
  match permission::edit_access(actor, assessment, cycle, group) {
    Access::Granted | Access::Denied(Denial::OutsideEditWindow) => {}
    Access::Denied(reason) => return Err(Error::denied(reason)),
  }
  if let Some(rule) = precondition(assessment) {
    return Err(Error::PreconditionFailed { rule });
  }
  match permission::edit_access(actor, assessment, cycle, group) {
    Access::Granted => Ok(()),
    Access::Denied(reason) => Err(Error::denied(reason)),
  }
}

fn require_owner(actor: &Actor, assessment: &Assessment) -> Result<()> {
  if assessment.is_owned_by(actor.employee_id) {
    Ok(())
  } else {
    Err(Error::denied(Denial::NotParticipant))
  }
}

// ─── Employee transitions ────────────────────────────────────────────────────

/// `not_started → in_progress`.
pub fn start(
  actor: &Actor,
  assessment: &Assessment,
  cycle: CycleStatus,
  now: DateTime<Utc>,
) -> Result<Assessment> {
  require_owner(actor, assessment)?;
  gate(actor, assessment, cycle, FieldGroup::EmployeeContent, |a| {
    (a.self_assessment_status != SelfAssessmentStatus::NotStarted)
      .then_some(Rule::AlreadyStarted)
  })?;

  let mut next = assessment.clone();
  next.self_assessment_status = SelfAssessmentStatus::InProgress;
  next.updated_at = now;
  Ok(next)
}

/// Replace the employee's draft content without changing status. Open to the
/// owner (while the resolver allows) and to admins.
pub fn save_self(
  actor: &Actor,
  assessment: &Assessment,
  cycle: CycleStatus,
  content: EmployeeContent,
  now: DateTime<Utc>,
) -> Result<Assessment> {
  if !actor.is_admin() {
    require_owner(actor, assessment)?;
  }
  gate(actor, assessment, cycle, FieldGroup::EmployeeContent, |_| None)?;

  let mut next = assessment.clone();
  next.employee_content = content;
  next.updated_at = now;
  Ok(next)
}

/// `in_progress → employee_complete`, persisting the final employee content.
pub fn submit_self(
  actor: &Actor,
  assessment: &Assessment,
  cycle: CycleStatus,
  content: EmployeeContent,
  policy: &SubmissionPolicy,
  now: DateTime<Utc>,
) -> Result<Assessment> {
  require_owner(actor, assessment)?;
  gate(actor, assessment, cycle, FieldGroup::EmployeeContent, |a| {
    (a.self_assessment_status != SelfAssessmentStatus::InProgress)
      .then_some(Rule::NotInProgress)
  })?;
  policy.check_employee(&content)?;

  let mut next = assessment.clone();
  next.employee_content = content;
  next.self_assessment_status = SelfAssessmentStatus::EmployeeComplete;
  next.self_submitted_at = Some(now);
  next.updated_at = now;
  Ok(next)
}

// ─── Manager transition ──────────────────────────────────────────────────────

/// `manager_review_status: pending → completed` together with every
/// manager-authored field. Open to the assigned manager and to admins.
pub fn submit_manager(
  actor: &Actor,
  assessment: &Assessment,
  cycle: CycleStatus,
  content: ManagerContent,
  policy: &SubmissionPolicy,
  now: DateTime<Utc>,
) -> Result<Assessment> {
  if !actor.is_admin() && !assessment.is_managed_by(actor.employee_id) {
    return Err(Error::denied(Denial::NotParticipant));
  }
  gate(actor, assessment, cycle, FieldGroup::ManagerContent, |a| {
    if a.self_assessment_status != SelfAssessmentStatus::EmployeeComplete {
      Some(Rule::SelfAssessmentIncomplete)
    } else if a.manager_review_status == ManagerReviewStatus::Completed {
      Some(Rule::ManagerReviewAlreadyCompleted)
    } else {
      None
    }
  })?;
  policy.check_manager(&content)?;

  let mut next = assessment.clone();
  next.manager_content = content;
  next.manager_review_status = ManagerReviewStatus::Completed;
  next.manager_submitted_at = Some(now);
  next.updated_at = now;
  Ok(next)
}

// ─── Acknowledgment ──────────────────────────────────────────────────────────

/// Record the employee's acknowledgment.
///
/// Returns `Ok(None)` when it is already recorded: repeating the call is a
/// no-op and the caller keeps the existing timestamp.
pub fn acknowledge(
  actor: &Actor,
  assessment: &Assessment,
  cycle: CycleStatus,
  now: DateTime<Utc>,
) -> Result<Option<Assessment>> {
  require_owner(actor, assessment)?;
  if assessment.is_acknowledged() {
    return Ok(None);
  }
  if let Access::Denied(reason) = permission::acknowledge_access(actor, assessment, cycle) {
    return Err(Error::denied(reason));
  }
  if assessment.manager_review_status != ManagerReviewStatus::Completed {
    return Err(Error::PreconditionFailed { rule: Rule::ManagerReviewIncomplete });
  }

  let mut next = assessment.clone();
  next.employee_acknowledged_at = Some(now);
  next.updated_at = now;
  Ok(Some(next))
}

// ─── Admin override ──────────────────────────────────────────────────────────

/// Force `assessment` to `target`, forwards or backwards, bypassing every
/// precondition. Content is preserved; submission and acknowledgment
/// timestamps follow the target stage. The returned audit entry must be
/// committed with the record.
pub fn override_stage(
  actor: &Actor,
  assessment: &Assessment,
  target: Stage,
  reason: Option<String>,
  now: DateTime<Utc>,
) -> Result<(Assessment, AuditEntry)> {
  if !actor.is_admin() {
    return Err(Error::denied(Denial::AdminOnly));
  }
  let from = assessment.stage();

  let mut next = assessment.clone();
  (next.self_assessment_status, next.manager_review_status) = target.statuses();

  next.self_submitted_at = match next.self_assessment_status {
    SelfAssessmentStatus::EmployeeComplete => assessment.self_submitted_at.or(Some(now)),
    _ => None,
  };
  next.manager_submitted_at = match next.manager_review_status {
    ManagerReviewStatus::Completed => assessment.manager_submitted_at.or(Some(now)),
    ManagerReviewStatus::Pending => None,
  };
  next.employee_acknowledged_at = match target {
    Stage::Acknowledged => assessment.employee_acknowledged_at.or(Some(now)),
    _ => None,
  };
  next.updated_at = now;

  let entry = AuditEntry {
    audit_id: Uuid::new_v4(),
    assessment_id: assessment.assessment_id,
    actor_id: actor.employee_id,
    from_stage: from,
    to_stage: target,
    reason,
    recorded_at: now,
  };
  Ok((next, entry))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{assessment::NewAssessment, employee::Role};

  struct Fixture {
    owner:   Actor,
    manager: Actor,
    admin:   Actor,
    policy:  SubmissionPolicy,
    a:       Assessment,
  }

  fn fixture() -> Fixture {
    let owner = Actor::new(Uuid::new_v4(), Role::Employee);
    let manager = Actor::new(Uuid::new_v4(), Role::Manager);
    let a = NewAssessment {
      cycle_id:    Uuid::new_v4(),
      employee_id: owner.employee_id,
      manager_id:  Some(manager.employee_id),
    }
    .into_assessment(Utc::now());
    Fixture {
      owner,
      manager,
      admin: Actor::new(Uuid::new_v4(), Role::Admin),
      policy: SubmissionPolicy::default(),
      a,
    }
  }

  fn self_content() -> EmployeeContent {
    EmployeeContent {
      strengths:    "Shipped the billing rewrite".into(),
      improvements: "Delegate more".into(),
      ..Default::default()
    }
  }

  fn review() -> ManagerContent {
    ManagerContent {
      feedback:         "Strong quarter".into(),
      development_plan: "Lead the next migration".into(),
      ..Default::default()
    }
  }

  use CycleStatus::{Active, Closed};

  fn submitted(f: &Fixture) -> Assessment {
    let a = start(&f.owner, &f.a, Active, Utc::now()).unwrap();
    submit_self(&f.owner, &a, Active, self_content(), &f.policy, Utc::now()).unwrap()
  }

  fn reviewed(f: &Fixture) -> Assessment {
    submit_manager(&f.manager, &submitted(f), Active, review(), &f.policy, Utc::now())
      .unwrap()
  }

  #[test]
  fn full_happy_path() {
    let f = fixture();
    let a = start(&f.owner, &f.a, Active, Utc::now()).unwrap();
    assert_eq!(a.stage(), Stage::InProgress);

    let a = submit_self(&f.owner, &a, Active, self_content(), &f.policy, Utc::now()).unwrap();
    assert_eq!(a.stage(), Stage::EmployeeComplete);
    assert!(a.self_submitted_at.is_some());

    let a = submit_manager(&f.manager, &a, Active, review(), &f.policy, Utc::now()).unwrap();
    assert_eq!(a.stage(), Stage::ManagerComplete);
    assert_eq!(a.manager_content, review());

    let a = acknowledge(&f.owner, &a, Active, Utc::now()).unwrap().unwrap();
    assert_eq!(a.stage(), Stage::Acknowledged);
  }

  #[test]
  fn starting_twice_fails_with_rule() {
    let f = fixture();
    let a = start(&f.owner, &f.a, Active, Utc::now()).unwrap();
    let err = start(&f.owner, &a, Active, Utc::now()).unwrap_err();
    assert!(matches!(err, Error::PreconditionFailed { rule: Rule::AlreadyStarted }));
  }

  #[test]
  fn only_the_owner_starts() {
    let f = fixture();
    for actor in [&f.manager, &f.admin] {
      let err = start(actor, &f.a, Active, Utc::now()).unwrap_err();
      assert!(matches!(err, Error::PermissionDenied { reason: Denial::NotParticipant }));
    }
  }

  #[test]
  fn empty_strengths_is_a_validation_error() {
    let f = fixture();
    let a = start(&f.owner, &f.a, Active, Utc::now()).unwrap();
    let content = EmployeeContent { strengths: String::new(), ..self_content() };
    let err = submit_self(&f.owner, &a, Active, content, &f.policy, Utc::now()).unwrap_err();
    assert!(matches!(err, Error::Validation { ref fields } if fields == &["strengths"]));
  }

  #[test]
  fn submitting_self_twice_fails() {
    let f = fixture();
    let a = submitted(&f);
    let err = submit_self(&f.owner, &a, Active, self_content(), &f.policy, Utc::now())
      .unwrap_err();
    // The edit window is closed, but the state rule explains why.
    assert!(matches!(err, Error::PreconditionFailed { rule: Rule::NotInProgress }));
  }

  #[test]
  fn manager_review_before_self_completion_fails() {
    let f = fixture();
    let a = start(&f.owner, &f.a, Active, Utc::now()).unwrap();
    let err = submit_manager(&f.manager, &a, Active, review(), &f.policy, Utc::now())
      .unwrap_err();
    assert!(matches!(
      err,
      Error::PreconditionFailed { rule: Rule::SelfAssessmentIncomplete }
    ));
  }

  #[test]
  fn manager_review_requires_configured_fields() {
    let f = fixture();
    let a = submitted(&f);
    let partial = ManagerContent { development_plan: String::new(), ..review() };
    let err = submit_manager(&f.manager, &a, Active, partial, &f.policy, Utc::now())
      .unwrap_err();
    assert!(matches!(err, Error::Validation { ref fields } if fields == &["development_plan"]));
  }

  #[test]
  fn other_managers_cannot_review() {
    let f = fixture();
    let a = submitted(&f);
    let outsider = Actor::new(Uuid::new_v4(), Role::Manager);
    let err = submit_manager(&outsider, &a, Active, review(), &f.policy, Utc::now())
      .unwrap_err();
    assert!(matches!(err, Error::PermissionDenied { reason: Denial::NotParticipant }));
  }

  #[test]
  fn acknowledge_requires_completed_review() {
    let f = fixture();
    let err = acknowledge(&f.owner, &submitted(&f), Active, Utc::now()).unwrap_err();
    assert!(matches!(
      err,
      Error::PreconditionFailed { rule: Rule::ManagerReviewIncomplete }
    ));
  }

  #[test]
  fn second_acknowledgment_is_a_no_op() {
    let f = fixture();
    let a = acknowledge(&f.owner, &reviewed(&f), Active, Utc::now()).unwrap().unwrap();
    assert!(acknowledge(&f.owner, &a, Active, Utc::now()).unwrap().is_none());
  }

  #[test]
  fn acknowledged_record_rejects_content_writes() {
    let f = fixture();
    let a = acknowledge(&f.owner, &reviewed(&f), Active, Utc::now()).unwrap().unwrap();

    let err = save_self(&f.owner, &a, Active, self_content(), Utc::now()).unwrap_err();
    assert!(matches!(err, Error::PermissionDenied { reason: Denial::Acknowledged }));

    let err = submit_manager(&f.manager, &a, Active, review(), &f.policy, Utc::now())
      .unwrap_err();
    assert!(matches!(err, Error::PermissionDenied { reason: Denial::Acknowledged }));
  }

  #[test]
  fn closed_cycle_rejects_participants_regardless_of_stage() {
    let f = fixture();
    let err = start(&f.owner, &f.a, Closed, Utc::now()).unwrap_err();
    assert!(matches!(err, Error::PermissionDenied { reason: Denial::CycleClosed }));

    let err = submit_manager(&f.manager, &submitted(&f), Closed, review(), &f.policy, Utc::now())
      .unwrap_err();
    assert!(matches!(err, Error::PermissionDenied { reason: Denial::CycleClosed }));

    let err = acknowledge(&f.owner, &reviewed(&f), Closed, Utc::now()).unwrap_err();
    assert!(matches!(err, Error::PermissionDenied { reason: Denial::CycleClosed }));
  }

  #[test]
  fn admin_may_save_drafts_and_review_without_being_assigned() {
    let f = fixture();
    let a = save_self(&f.admin, &f.a, Active, self_content(), Utc::now()).unwrap();
    assert_eq!(a.employee_content, self_content());
    assert_eq!(a.stage(), Stage::NotStarted);

    let a = submit_manager(&f.admin, &submitted(&f), Active, review(), &f.policy, Utc::now());
    assert!(a.is_ok());
  }

  #[test]
  fn override_backwards_reopens_and_clears_acknowledgment() {
    let f = fixture();
    let acked = acknowledge(&f.owner, &reviewed(&f), Active, Utc::now()).unwrap().unwrap();

    let (a, entry) = override_stage(
      &f.admin,
      &acked,
      Stage::InProgress,
      Some("employee asked to revise".into()),
      Utc::now(),
    )
    .unwrap();

    assert_eq!(a.stage(), Stage::InProgress);
    assert!(a.employee_acknowledged_at.is_none());
    assert!(a.self_submitted_at.is_none());
    assert!(a.manager_submitted_at.is_none());
    assert_eq!(a.manager_content, review());
    assert_eq!(entry.from_stage, Stage::Acknowledged);
    assert_eq!(entry.to_stage, Stage::InProgress);
    assert_eq!(entry.actor_id, f.admin.employee_id);

    // The reopened record is editable again.
    assert!(save_self(&f.owner, &a, Active, self_content(), Utc::now()).is_ok());
  }

  #[test]
  fn override_forwards_stamps_timestamps() {
    let f = fixture();
    let (a, entry) =
      override_stage(&f.admin, &f.a, Stage::Acknowledged, None, Utc::now()).unwrap();
    assert_eq!(a.stage(), Stage::Acknowledged);
    assert!(a.self_submitted_at.is_some());
    assert!(a.manager_submitted_at.is_some());
    assert_eq!(entry.from_stage, Stage::NotStarted);
  }

  #[test]
  fn override_requires_admin() {
    let f = fixture();
    let err = override_stage(&f.manager, &f.a, Stage::ManagerComplete, None, Utc::now())
      .unwrap_err();
    assert!(matches!(err, Error::PermissionDenied { reason: Denial::AdminOnly }));
  }
}

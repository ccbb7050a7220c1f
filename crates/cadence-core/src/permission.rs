//! The permission resolver.
//!
//! A pure function of (actor, assessment, cycle status, field group). Every
//! read path builds its view through [`view`] and every write path consults
//! [`edit_access`] before anything is persisted.
//!
//! Edit rules, first match wins:
//!
//! 1. cycle closed: nothing is editable by non-admins
//! 2. admins may edit every group
//! 3. `admin_override` is admin-only
//! 4. once acknowledged, nothing is editable by non-admins
//! 5. `employee_content`: owner, while not started or in progress
//! 6. `manager_content`: assigned manager, while the self-assessment is
//!    complete and the manager review is pending

use serde::{Deserialize, Serialize};

use crate::{
  assessment::{
    Assessment, AssessmentView, ManagerReviewStatus, SelfAssessmentStatus,
  },
  cycle::CycleStatus,
  employee::Actor,
};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FieldGroup {
  EmployeeContent,
  ManagerContent,
  AdminOverride,
}

impl FieldGroup {
  pub const ALL: [FieldGroup; 3] =
    [Self::EmployeeContent, Self::ManagerContent, Self::AdminOverride];
}

/// Why the resolver refused an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
pub enum Denial {
  #[strum(to_string = "the review cycle is closed")]
  CycleClosed,
  #[strum(to_string = "actor is not a participant in this assessment")]
  NotParticipant,
  #[strum(to_string = "the review has been acknowledged")]
  Acknowledged,
  #[strum(to_string = "the field group is not editable at this stage")]
  OutsideEditWindow,
  #[strum(to_string = "admin role required")]
  AdminOnly,
  #[strum(to_string = "actor is not an active employee")]
  InactiveActor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
  Granted,
  Denied(Denial),
}

impl Access {
  pub fn is_granted(self) -> bool { matches!(self, Self::Granted) }
}

/// Resolve write access for `group`, reporting the first rule that denies.
pub fn edit_access(
  actor: &Actor,
  assessment: &Assessment,
  cycle: CycleStatus,
  group: FieldGroup,
) -> Access {
  if cycle == CycleStatus::Closed && !actor.is_admin() {
    return Access::Denied(Denial::CycleClosed);
  }
  if actor.is_admin() {
    return Access::Granted;
  }
  let participant = match group {
    FieldGroup::AdminOverride => return Access::Denied(Denial::AdminOnly),
    FieldGroup::EmployeeContent => assessment.is_owned_by(actor.employee_id),
    FieldGroup::ManagerContent => assessment.is_managed_by(actor.employee_id),
  };
  if !participant {
    return Access::Denied(Denial::NotParticipant);
  }
  if assessment.is_acknowledged() {
    return Access::Denied(Denial::Acknowledged);
  }

  let open = match group {
    FieldGroup::EmployeeContent => matches!(
      assessment.self_assessment_status,
      SelfAssessmentStatus::NotStarted | SelfAssessmentStatus::InProgress
    ),
    FieldGroup::ManagerContent => {
      assessment.self_assessment_status == SelfAssessmentStatus::EmployeeComplete
        && assessment.manager_review_status == ManagerReviewStatus::Pending
    }
    FieldGroup::AdminOverride => false,
  };
  if open { Access::Granted } else { Access::Denied(Denial::OutsideEditWindow) }
}

pub fn can_edit(
  actor: &Actor,
  assessment: &Assessment,
  cycle: CycleStatus,
  group: FieldGroup,
) -> bool {
  edit_access(actor, assessment, cycle, group).is_granted()
}

pub fn can_view(
  actor: &Actor,
  assessment: &Assessment,
  cycle: CycleStatus,
  group: FieldGroup,
) -> bool {
  if actor.is_admin() {
    return true;
  }
  let owner = assessment.is_owned_by(actor.employee_id);
  let manager = assessment.is_managed_by(actor.employee_id);
  if !owner && !manager {
    return false;
  }
  if cycle == CycleStatus::Closed {
    return true;
  }
  match group {
    FieldGroup::EmployeeContent => {
      owner
        || assessment.self_assessment_status == SelfAssessmentStatus::EmployeeComplete
    }
    FieldGroup::ManagerContent => {
      manager || assessment.manager_review_status == ManagerReviewStatus::Completed
    }
    FieldGroup::AdminOverride => false,
  }
}

/// Groups `actor` may write right now.
pub fn editable_groups(
  actor: &Actor,
  assessment: &Assessment,
  cycle: CycleStatus,
) -> Vec<FieldGroup> {
  FieldGroup::ALL
    .into_iter()
    .filter(|g| can_edit(actor, assessment, cycle, *g))
    .collect()
}

/// Whether `actor` may record the acknowledgment. The state precondition
/// (manager review completed) is checked by the state machine.
pub fn acknowledge_access(
  actor: &Actor,
  assessment: &Assessment,
  cycle: CycleStatus,
) -> Access {
  if !assessment.is_owned_by(actor.employee_id) {
    return Access::Denied(Denial::NotParticipant);
  }
  if cycle == CycleStatus::Closed && !actor.is_admin() {
    return Access::Denied(Denial::CycleClosed);
  }
  Access::Granted
}

/// Build the redacted read model for `actor`, or `None` when the actor may
/// see nothing of this assessment.
pub fn view(
  actor: &Actor,
  assessment: &Assessment,
  cycle: CycleStatus,
) -> Option<AssessmentView> {
  let sees_employee = can_view(actor, assessment, cycle, FieldGroup::EmployeeContent);
  let sees_manager = can_view(actor, assessment, cycle, FieldGroup::ManagerContent);
  let participant = actor.is_admin()
    || assessment.is_owned_by(actor.employee_id)
    || assessment.is_managed_by(actor.employee_id);
  if !participant {
    return None;
  }

  Some(AssessmentView {
    assessment_id:            assessment.assessment_id,
    cycle_id:                 assessment.cycle_id,
    employee_id:              assessment.employee_id,
    manager_id:               assessment.manager_id,
    cycle_status:             cycle,
    stage:                    assessment.stage(),
    self_assessment_status:   assessment.self_assessment_status,
    manager_review_status:    assessment.manager_review_status,
    employee_acknowledged_at: assessment.employee_acknowledged_at,
    employee_content:         sees_employee.then(|| assessment.employee_content.clone()),
    manager_content:          sees_manager.then(|| assessment.manager_content.clone()),
    editable:                 editable_groups(actor, assessment, cycle),
    updated_at:               assessment.updated_at,
    version:                  assessment.version,
  })
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use uuid::Uuid;

  use super::*;
  use crate::{
    assessment::{NewAssessment, Stage},
    employee::Role,
  };

  struct Cast {
    owner:    Actor,
    manager:  Actor,
    admin:    Actor,
    stranger: Actor,
  }

  fn cast() -> Cast {
    Cast {
      owner:    Actor::new(Uuid::new_v4(), Role::Employee),
      manager:  Actor::new(Uuid::new_v4(), Role::Manager),
      admin:    Actor::new(Uuid::new_v4(), Role::Admin),
      stranger: Actor::new(Uuid::new_v4(), Role::Manager),
    }
  }

  fn at_stage(c: &Cast, stage: Stage) -> Assessment {
    let mut a = NewAssessment {
      cycle_id:    Uuid::new_v4(),
      employee_id: c.owner.employee_id,
      manager_id:  Some(c.manager.employee_id),
    }
    .into_assessment(Utc::now());
    (a.self_assessment_status, a.manager_review_status) = stage.statuses();
    if stage == Stage::Acknowledged {
      a.employee_acknowledged_at = Some(Utc::now());
    }
    a
  }

  use CycleStatus::{Active, Closed};
  use FieldGroup::{AdminOverride, EmployeeContent, ManagerContent};

  #[test]
  fn owner_edits_employee_content_until_submission() {
    let c = cast();
    for stage in [Stage::NotStarted, Stage::InProgress] {
      assert!(can_edit(&c.owner, &at_stage(&c, stage), Active, EmployeeContent));
    }
    for stage in [Stage::EmployeeComplete, Stage::ManagerComplete] {
      assert_eq!(
        edit_access(&c.owner, &at_stage(&c, stage), Active, EmployeeContent),
        Access::Denied(Denial::OutsideEditWindow)
      );
    }
  }

  #[test]
  fn manager_edits_only_between_submission_and_completion() {
    let c = cast();
    assert!(!can_edit(&c.manager, &at_stage(&c, Stage::InProgress), Active, ManagerContent));
    assert!(can_edit(&c.manager, &at_stage(&c, Stage::EmployeeComplete), Active, ManagerContent));
    assert!(!can_edit(&c.manager, &at_stage(&c, Stage::ManagerComplete), Active, ManagerContent));
  }

  #[test]
  fn groups_are_not_co_owned() {
    let c = cast();
    let a = at_stage(&c, Stage::EmployeeComplete);
    assert_eq!(
      edit_access(&c.owner, &a, Active, ManagerContent),
      Access::Denied(Denial::NotParticipant)
    );
    let a = at_stage(&c, Stage::InProgress);
    assert_eq!(
      edit_access(&c.manager, &a, Active, EmployeeContent),
      Access::Denied(Denial::NotParticipant)
    );
  }

  #[test]
  fn acknowledgment_freezes_both_groups() {
    let c = cast();
    let a = at_stage(&c, Stage::Acknowledged);
    for (actor, group) in [(&c.owner, EmployeeContent), (&c.manager, ManagerContent)] {
      assert_eq!(edit_access(actor, &a, Active, group), Access::Denied(Denial::Acknowledged));
    }
    assert!(can_edit(&c.admin, &a, Active, ManagerContent));
  }

  #[test]
  fn closed_cycle_denies_every_non_admin_write() {
    let c = cast();
    for stage in [
      Stage::NotStarted,
      Stage::InProgress,
      Stage::EmployeeComplete,
      Stage::ManagerComplete,
      Stage::Acknowledged,
    ] {
      let a = at_stage(&c, stage);
      for actor in [&c.owner, &c.manager, &c.stranger] {
        assert!(editable_groups(actor, &a, Closed).is_empty(), "{stage} {actor:?}");
      }
      assert_eq!(acknowledge_access(&c.owner, &a, Closed), Access::Denied(Denial::CycleClosed));
      assert_eq!(editable_groups(&c.admin, &a, Closed), FieldGroup::ALL.to_vec());
    }
  }

  #[test]
  fn closed_cycle_opens_all_groups_to_participants() {
    let c = cast();
    let a = at_stage(&c, Stage::InProgress);
    assert!(!can_view(&c.manager, &a, Active, EmployeeContent));
    assert!(can_view(&c.manager, &a, Closed, EmployeeContent));
    assert!(can_view(&c.owner, &a, Closed, ManagerContent));
    assert!(!can_view(&c.stranger, &a, Closed, EmployeeContent));
  }

  #[test]
  fn override_group_is_admin_only() {
    let c = cast();
    let a = at_stage(&c, Stage::InProgress);
    assert_eq!(edit_access(&c.owner, &a, Active, AdminOverride), Access::Denied(Denial::AdminOnly));
    assert!(can_edit(&c.admin, &a, Active, AdminOverride));
    assert!(!can_view(&c.owner, &a, Active, AdminOverride));
  }

  #[test]
  fn view_redacts_unreleased_content() {
    let c = cast();
    let mut a = at_stage(&c, Stage::InProgress);
    a.employee_content.strengths = "draft".into();

    let manager_view = view(&c.manager, &a, Active).unwrap();
    assert!(manager_view.employee_content.is_none());
    assert!(manager_view.editable.is_empty());

    let owner_view = view(&c.owner, &a, Active).unwrap();
    assert_eq!(owner_view.employee_content.unwrap().strengths, "draft");
    assert!(owner_view.manager_content.is_none());
    assert_eq!(owner_view.editable, vec![EmployeeContent]);

    assert!(view(&c.stranger, &a, Active).is_none());
  }

  #[test]
  fn owner_sees_manager_feedback_once_completed() {
    let c = cast();
    let a = at_stage(&c, Stage::ManagerComplete);
    assert!(view(&c.owner, &a, Active).unwrap().manager_content.is_some());
  }
}

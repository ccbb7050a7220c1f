//! Assessments: the per-employee review record for one cycle.
//!
//! Content is partitioned by authorship: [`EmployeeContent`] is only ever
//! written by the employee (or an admin), [`ManagerContent`] only by the
//! manager (or an admin). The two status fields plus the acknowledgment
//! timestamp together determine the assessment's [`Stage`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{cycle::CycleStatus, permission::FieldGroup};

// ─── Statuses ────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SelfAssessmentStatus {
  #[default]
  NotStarted,
  InProgress,
  EmployeeComplete,
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ManagerReviewStatus {
  #[default]
  Pending,
  Completed,
}

/// The combined position of an assessment in its workflow.
///
/// Derived from the stored statuses; admin overrides target a stage.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
  NotStarted,
  InProgress,
  EmployeeComplete,
  ManagerComplete,
  Acknowledged,
}

impl Stage {
  /// The stored statuses that represent this stage.
  pub fn statuses(self) -> (SelfAssessmentStatus, ManagerReviewStatus) {
    use ManagerReviewStatus as M;
    use SelfAssessmentStatus as S;
    match self {
      Self::NotStarted => (S::NotStarted, M::Pending),
      Self::InProgress => (S::InProgress, M::Pending),
      Self::EmployeeComplete => (S::EmployeeComplete, M::Pending),
      Self::ManagerComplete | Self::Acknowledged => {
        (S::EmployeeComplete, M::Completed)
      }
    }
  }
}

// ─── Content ─────────────────────────────────────────────────────────────────

/// Yes/no answers to "gets it, wants it, capacity to do it".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GwcRatings {
  pub gets_it:  Option<bool>,
  pub wants_it: Option<bool>,
  pub capacity: Option<bool>,
  pub comments: Option<String>,
}

impl GwcRatings {
  pub fn is_rated(&self) -> bool {
    self.gets_it.is_some() && self.wants_it.is_some() && self.capacity.is_some()
  }
}

/// An employee's example of living one of the organisation's core values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreValueExample {
  pub value:   String,
  pub example: String,
}

/// A manager's rating against a core value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueRating {
  #[serde(rename = "+")]
  Plus,
  #[serde(rename = "+/-")]
  PlusMinus,
  #[serde(rename = "-")]
  Minus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreValueRating {
  pub value:  String,
  pub rating: ValueRating,
}

/// Employee-authored fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmployeeContent {
  pub strengths:    String,
  pub improvements: String,
  pub core_values:  Vec<CoreValueExample>,
  pub gwc:          GwcRatings,
}

/// Manager-authored fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerContent {
  pub core_value_ratings: Vec<CoreValueRating>,
  pub gwc:                GwcRatings,
  pub feedback:           String,
  pub development_plan:   String,
}

// ─── Assessment ──────────────────────────────────────────────────────────────

/// One row per `(employee_id, cycle_id)`, created by cycle activation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
  pub assessment_id:            Uuid,
  pub cycle_id:                 Uuid,
  pub employee_id:              Uuid,
  /// The employee's manager as resolved when the cycle activated.
  pub manager_id:               Option<Uuid>,
  pub self_assessment_status:   SelfAssessmentStatus,
  pub manager_review_status:    ManagerReviewStatus,
  pub employee_acknowledged_at: Option<DateTime<Utc>>,
  pub employee_content:         EmployeeContent,
  pub manager_content:          ManagerContent,
  pub self_submitted_at:        Option<DateTime<Utc>>,
  pub manager_submitted_at:     Option<DateTime<Utc>>,
  pub created_at:               DateTime<Utc>,
  pub updated_at:               DateTime<Utc>,
  /// Bumped by the store on every committed write.
  pub version:                  i64,
}

impl Assessment {
  pub fn stage(&self) -> Stage {
    if self.employee_acknowledged_at.is_some() {
      return Stage::Acknowledged;
    }
    if self.manager_review_status == ManagerReviewStatus::Completed {
      return Stage::ManagerComplete;
    }
    match self.self_assessment_status {
      SelfAssessmentStatus::NotStarted => Stage::NotStarted,
      SelfAssessmentStatus::InProgress => Stage::InProgress,
      SelfAssessmentStatus::EmployeeComplete => Stage::EmployeeComplete,
    }
  }

  pub fn is_acknowledged(&self) -> bool { self.employee_acknowledged_at.is_some() }

  pub fn is_owned_by(&self, employee_id: Uuid) -> bool {
    self.employee_id == employee_id
  }

  pub fn is_managed_by(&self, employee_id: Uuid) -> bool {
    self.manager_id == Some(employee_id)
  }
}

/// A pending row for the activation batch. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAssessment {
  pub cycle_id:    Uuid,
  pub employee_id: Uuid,
  pub manager_id:  Option<Uuid>,
}

impl NewAssessment {
  /// Materialise the initial `not_started` / `pending` record.
  pub fn into_assessment(self, now: DateTime<Utc>) -> Assessment {
    Assessment {
      assessment_id:            Uuid::new_v4(),
      cycle_id:                 self.cycle_id,
      employee_id:              self.employee_id,
      manager_id:               self.manager_id,
      self_assessment_status:   SelfAssessmentStatus::NotStarted,
      manager_review_status:    ManagerReviewStatus::Pending,
      employee_acknowledged_at: None,
      employee_content:         EmployeeContent::default(),
      manager_content:          ManagerContent::default(),
      self_submitted_at:        None,
      manager_submitted_at:     None,
      created_at:               now,
      updated_at:               now,
      version:                  0,
    }
  }
}

// ─── Read model ──────────────────────────────────────────────────────────────

/// An assessment as seen by one actor. Content groups the actor may not view
/// are `None`; `editable` lists what the actor may currently write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentView {
  pub assessment_id:            Uuid,
  pub cycle_id:                 Uuid,
  pub employee_id:              Uuid,
  pub manager_id:               Option<Uuid>,
  pub cycle_status:             CycleStatus,
  pub stage:                    Stage,
  pub self_assessment_status:   SelfAssessmentStatus,
  pub manager_review_status:    ManagerReviewStatus,
  pub employee_acknowledged_at: Option<DateTime<Utc>>,
  pub employee_content:         Option<EmployeeContent>,
  pub manager_content:          Option<ManagerContent>,
  pub editable:                 Vec<FieldGroup>,
  pub updated_at:               DateTime<Utc>,
  pub version:                  i64,
}

// ─── Audit ───────────────────────────────────────────────────────────────────

/// A record of an admin override. Written in the same transaction as the
/// state change it describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
  pub audit_id:      Uuid,
  pub assessment_id: Uuid,
  pub actor_id:      Uuid,
  pub from_stage:    Stage,
  pub to_stage:      Stage,
  pub reason:        Option<String>,
  pub recorded_at:   DateTime<Utc>,
}

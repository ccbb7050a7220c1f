//! Configurable policies the engine consults: which fields a submission
//! requires, and which employees a cycle fans out to.

use serde::{Deserialize, Serialize};

use crate::{
  assessment::{EmployeeContent, ManagerContent},
  employee::{Employee, Role},
  Error, Result,
};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EmployeeField {
  Strengths,
  Improvements,
  CoreValues,
  Gwc,
}

impl EmployeeField {
  pub fn is_filled(self, content: &EmployeeContent) -> bool {
    match self {
      Self::Strengths => !content.strengths.trim().is_empty(),
      Self::Improvements => !content.improvements.trim().is_empty(),
      Self::CoreValues => {
        !content.core_values.is_empty()
          && content
            .core_values
            .iter()
            .all(|v| !v.value.trim().is_empty() && !v.example.trim().is_empty())
      }
      Self::Gwc => content.gwc.is_rated(),
    }
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ManagerField {
  CoreValueRatings,
  Gwc,
  Feedback,
  DevelopmentPlan,
}

impl ManagerField {
  pub fn is_filled(self, content: &ManagerContent) -> bool {
    match self {
      Self::CoreValueRatings => {
        !content.core_value_ratings.is_empty()
          && content
            .core_value_ratings
            .iter()
            .all(|r| !r.value.trim().is_empty())
      }
      Self::Gwc => content.gwc.is_rated(),
      Self::Feedback => !content.feedback.trim().is_empty(),
      Self::DevelopmentPlan => !content.development_plan.trim().is_empty(),
    }
  }
}

/// The fields that must be populated before each party may submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionPolicy {
  pub employee_required: Vec<EmployeeField>,
  pub manager_required:  Vec<ManagerField>,
}

impl Default for SubmissionPolicy {
  fn default() -> Self {
    Self {
      employee_required: vec![EmployeeField::Strengths, EmployeeField::Improvements],
      manager_required:  vec![ManagerField::Feedback, ManagerField::DevelopmentPlan],
    }
  }
}

impl SubmissionPolicy {
  pub fn check_employee(&self, content: &EmployeeContent) -> Result<()> {
    let missing: Vec<_> = self
      .employee_required
      .iter()
      .filter(|f| !f.is_filled(content))
      .map(ToString::to_string)
      .collect();
    if missing.is_empty() { Ok(()) } else { Err(Error::validation(missing)) }
  }

  pub fn check_manager(&self, content: &ManagerContent) -> Result<()> {
    let missing: Vec<_> = self
      .manager_required
      .iter()
      .filter(|f| !f.is_filled(content))
      .map(ToString::to_string)
      .collect();
    if missing.is_empty() { Ok(()) } else { Err(Error::validation(missing)) }
  }
}

/// Which active employees a cycle activation fans out to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Eligibility {
  #[default]
  AllActive,
  Roles { roles: Vec<Role> },
}

impl Eligibility {
  pub fn admits(&self, employee: &Employee) -> bool {
    if !employee.is_active {
      return false;
    }
    match self {
      Self::AllActive => true,
      Self::Roles { roles } => roles.contains(&employee.role),
    }
  }
}

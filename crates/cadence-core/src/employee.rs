//! Employees and the actor identity passed into every engine operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Organisational role; governs override authority, not review relationships.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  Employee,
  Manager,
  Admin,
}

/// A person in the organisation. Never hard-deleted; see `is_active`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
  pub employee_id: Uuid,
  pub name:        String,
  pub email:       String,
  pub role:        Role,
  /// Must reference an active employee when set.
  pub manager_id:  Option<Uuid>,
  pub is_active:   bool,
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::directory::EmployeeRegistry::insert_employee`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEmployee {
  pub name:       String,
  pub email:      String,
  pub role:       Role,
  #[serde(default)]
  pub manager_id: Option<Uuid>,
}

/// A partial update to an employee's mutable attributes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeUpdate {
  pub name:          Option<String>,
  pub email:         Option<String>,
  pub role:          Option<Role>,
  pub manager_id:    Option<Uuid>,
  /// Remove the manager link. Ignored when `manager_id` is also set.
  #[serde(default)]
  pub clear_manager: bool,
}

impl EmployeeUpdate {
  /// Apply the update to `employee`, returning the resulting record.
  pub fn apply(&self, mut employee: Employee) -> Employee {
    if let Some(name) = &self.name {
      employee.name = name.clone();
    }
    if let Some(email) = &self.email {
      employee.email = email.clone();
    }
    if let Some(role) = self.role {
      employee.role = role;
    }
    if let Some(manager_id) = self.manager_id {
      employee.manager_id = Some(manager_id);
    } else if self.clear_manager {
      employee.manager_id = None;
    }
    employee
  }
}

/// The identity performing an engine operation.
///
/// Resolved by the caller (see [`crate::engine::ReviewEngine::resolve_actor`])
/// and passed explicitly; the engine keeps no session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
  pub employee_id: Uuid,
  pub role:        Role,
}

impl Actor {
  pub fn new(employee_id: Uuid, role: Role) -> Self { Self { employee_id, role } }

  pub fn is_admin(&self) -> bool { self.role == Role::Admin }
}

impl From<&Employee> for Actor {
  fn from(e: &Employee) -> Self { Self::new(e.employee_id, e.role) }
}

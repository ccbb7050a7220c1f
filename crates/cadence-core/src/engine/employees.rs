//! Employee administration for backends that own employee records.
//!
//! Enforces the manager-link invariant: a manager, when set, is an existing
//! active employee other than the employee themself.

use uuid::Uuid;

use super::{require_admin, ReviewEngine};
use crate::{
  directory::EmployeeRegistry,
  employee::{Actor, Employee, EmployeeUpdate, NewEmployee, Role},
  event::Notifier,
  permission::Denial,
  store::ReviewStore,
  Error, Result,
};

impl<S, D, N> ReviewEngine<S, D, N>
where
  S: ReviewStore,
  D: EmployeeRegistry,
  N: Notifier,
{
  /// Create the first admin on an empty directory. Fails once any employee
  /// exists.
  pub async fn bootstrap_admin(&self, name: String, email: String) -> Result<Employee> {
    let existing = self
      .directory
      .list_employees(true)
      .await
      .map_err(Error::dependency)?;
    if !existing.is_empty() {
      return Err(Error::InvalidState("directory already has employees".into()));
    }
    let admin = self.insert(NewEmployee { name, email, role: Role::Admin, manager_id: None }).await?;
    tracing::info!(employee_id = %admin.employee_id, "bootstrap admin created");
    Ok(admin)
  }

  pub async fn add_employee(&self, actor: &Actor, input: NewEmployee) -> Result<Employee> {
    require_admin(actor)?;
    if let Some(manager_id) = input.manager_id {
      self.ensure_manager(manager_id).await?;
    }
    let employee = self.insert(input).await?;
    tracing::info!(
      employee_id = %employee.employee_id,
      role = %employee.role,
      actor_id = %actor.employee_id,
      "employee added"
    );
    Ok(employee)
  }

  /// Admins see anyone; others see themselves and their direct reports.
  pub async fn get_employee(&self, actor: &Actor, employee_id: Uuid) -> Result<Employee> {
    let employee = self.load_employee(employee_id).await?;
    let visible = actor.is_admin()
      || employee.employee_id == actor.employee_id
      || employee.manager_id == Some(actor.employee_id);
    if visible { Ok(employee) } else { Err(Error::denied(Denial::NotParticipant)) }
  }

  pub async fn list_employees(
    &self,
    actor: &Actor,
    include_inactive: bool,
  ) -> Result<Vec<Employee>> {
    require_admin(actor)?;
    self
      .directory
      .list_employees(include_inactive)
      .await
      .map_err(Error::dependency)
  }

  pub async fn update_employee(
    &self,
    actor: &Actor,
    employee_id: Uuid,
    update: EmployeeUpdate,
  ) -> Result<Employee> {
    require_admin(actor)?;
    let current = self.load_employee(employee_id).await?;
    let next = update.apply(current.clone());

    check_identity_fields(&next.name, &next.email)?;
    if next.manager_id == Some(employee_id) {
      return Err(Error::validation(["manager_id"]));
    }
    if let Some(manager_id) = next.manager_id
      && next.manager_id != current.manager_id
    {
      self.ensure_manager(manager_id).await?;
    }

    let saved = self
      .directory
      .update_employee(next)
      .await
      .map_err(Error::dependency)?;
    tracing::info!(%employee_id, actor_id = %actor.employee_id, "employee updated");
    Ok(saved)
  }

  /// Soft-deactivate. Refused while the employee still manages active
  /// employees, since their manager link would then point at an inactive
  /// employee.
  pub async fn deactivate_employee(&self, actor: &Actor, employee_id: Uuid) -> Result<Employee> {
    require_admin(actor)?;
    let mut employee = self.load_employee(employee_id).await?;
    if !employee.is_active {
      return Ok(employee);
    }
    let reports = self
      .directory
      .count_active_reports(employee_id)
      .await
      .map_err(Error::dependency)?;
    if reports > 0 {
      return Err(Error::InvalidState(format!(
        "employee {employee_id} still manages {reports} active employee(s)"
      )));
    }

    employee.is_active = false;
    let saved = self
      .directory
      .update_employee(employee)
      .await
      .map_err(Error::dependency)?;
    tracing::info!(%employee_id, actor_id = %actor.employee_id, "employee deactivated");
    Ok(saved)
  }

  async fn insert(&self, input: NewEmployee) -> Result<Employee> {
    check_identity_fields(&input.name, &input.email)?;
    self
      .directory
      .insert_employee(input)
      .await
      .map_err(Error::dependency)
  }

  async fn load_employee(&self, employee_id: Uuid) -> Result<Employee> {
    self
      .directory
      .get_employee(employee_id)
      .await
      .map_err(Error::dependency)?
      .ok_or(Error::NotFound { entity: "employee", id: employee_id })
  }

  async fn ensure_manager(&self, manager_id: Uuid) -> Result<()> {
    let manager = self.load_employee(manager_id).await?;
    if manager.is_active {
      Ok(())
    } else {
      Err(Error::InvalidState(format!("manager {manager_id} is not an active employee")))
    }
  }
}

fn check_identity_fields(name: &str, email: &str) -> Result<()> {
  let mut fields = Vec::new();
  if name.trim().is_empty() {
    fields.push("name");
  }
  if !email.contains('@') {
    fields.push("email");
  }
  if fields.is_empty() { Ok(()) } else { Err(Error::validation(fields)) }
}

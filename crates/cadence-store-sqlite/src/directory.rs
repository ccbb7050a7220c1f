//! The employee directory and registry, backed by the `employees` table.

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use cadence_core::{
  directory::{EmployeeDirectory, EmployeeRegistry},
  employee::{Employee, NewEmployee},
};

use crate::{
  encode::{decode_uuid, encode_dt, encode_uuid, RawEmployee, EMPLOYEE_COLUMNS},
  store::SqliteStore,
  Error, Result,
};

impl SqliteStore {
  async fn select_employees(&self, include_inactive: bool) -> Result<Vec<Employee>> {
    let raws: Vec<RawEmployee> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {EMPLOYEE_COLUMNS} FROM employees
           WHERE ?1 OR is_active = 1
           ORDER BY created_at, employee_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![include_inactive], RawEmployee::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawEmployee::into_employee).collect()
  }
}

impl EmployeeDirectory for SqliteStore {
  type Error = crate::Error;

  /// Every active employee the configured eligibility admits. The cycle does
  /// not narrow the set.
  async fn list_eligible_employees(&self, _cycle_id: Uuid) -> Result<Vec<Uuid>> {
    let employees = self.select_employees(false).await?;
    Ok(
      employees
        .iter()
        .filter(|e| self.eligibility.admits(e))
        .map(|e| e.employee_id)
        .collect(),
    )
  }

  async fn get_manager_of(&self, employee_id: Uuid) -> Result<Option<Uuid>> {
    let id_str = encode_uuid(employee_id);
    let manager: Option<Option<String>> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT manager_id FROM employees WHERE employee_id = ?1",
              rusqlite::params![id_str],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    manager.flatten().as_deref().map(decode_uuid).transpose()
  }

  async fn get_employee(&self, employee_id: Uuid) -> Result<Option<Employee>> {
    let id_str = encode_uuid(employee_id);
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE employee_id = ?1"),
              rusqlite::params![id_str],
              RawEmployee::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawEmployee::into_employee).transpose()
  }
}

impl EmployeeRegistry for SqliteStore {
  async fn list_employees(&self, include_inactive: bool) -> Result<Vec<Employee>> {
    self.select_employees(include_inactive).await
  }

  async fn insert_employee(&self, input: NewEmployee) -> Result<Employee> {
    let employee = Employee {
      employee_id: Uuid::new_v4(),
      name:        input.name,
      email:       input.email,
      role:        input.role,
      manager_id:  input.manager_id,
      is_active:   true,
      created_at:  Utc::now(),
    };

    let id_str      = encode_uuid(employee.employee_id);
    let name        = employee.name.clone();
    let email       = employee.email.clone();
    let role_str    = employee.role.to_string();
    let manager_str = employee.manager_id.map(encode_uuid);
    let at_str      = encode_dt(employee.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO employees (employee_id, name, email, role, manager_id, is_active, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)",
          rusqlite::params![id_str, name, email, role_str, manager_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(employee)
  }

  async fn update_employee(&self, employee: Employee) -> Result<Employee> {
    let id_str      = encode_uuid(employee.employee_id);
    let name        = employee.name.clone();
    let email       = employee.email.clone();
    let role_str    = employee.role.to_string();
    let manager_str = employee.manager_id.map(encode_uuid);
    let is_active   = employee.is_active;

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE employees
           SET name = ?2, email = ?3, role = ?4, manager_id = ?5, is_active = ?6
           WHERE employee_id = ?1",
          rusqlite::params![id_str, name, email, role_str, manager_str, is_active],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::EmployeeNotFound(employee.employee_id));
    }
    Ok(employee)
  }

  async fn count_active_reports(&self, manager_id: Uuid) -> Result<usize> {
    let id_str = encode_uuid(manager_id);
    let count = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM employees WHERE manager_id = ?1 AND is_active = 1",
          rusqlite::params![id_str],
          |r| r.get::<_, usize>(0),
        )?)
      })
      .await?;
    Ok(count)
  }
}

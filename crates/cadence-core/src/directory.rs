//! The employee directory collaborator.
//!
//! [`EmployeeDirectory`] is the read contract the engine consumes during
//! activation and actor resolution. [`EmployeeRegistry`] adds the admin write
//! surface for backends that own employee records.

use std::future::Future;

use uuid::Uuid;

use crate::employee::{Employee, NewEmployee};

pub trait EmployeeDirectory: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Employees a cycle activation should fan out to.
  fn list_eligible_employees(
    &self,
    cycle_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + '_;

  fn get_manager_of(
    &self,
    employee_id: Uuid,
  ) -> impl Future<Output = Result<Option<Uuid>, Self::Error>> + Send + '_;

  fn get_employee(
    &self,
    employee_id: Uuid,
  ) -> impl Future<Output = Result<Option<Employee>, Self::Error>> + Send + '_;
}

pub trait EmployeeRegistry: EmployeeDirectory {
  fn list_employees(
    &self,
    include_inactive: bool,
  ) -> impl Future<Output = Result<Vec<Employee>, Self::Error>> + Send + '_;

  fn insert_employee(
    &self,
    input: NewEmployee,
  ) -> impl Future<Output = Result<Employee, Self::Error>> + Send + '_;

  /// Replace the mutable attributes of an existing employee.
  fn update_employee(
    &self,
    employee: Employee,
  ) -> impl Future<Output = Result<Employee, Self::Error>> + Send + '_;

  /// Active employees whose `manager_id` is `manager_id`.
  fn count_active_reports(
    &self,
    manager_id: Uuid,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;
}

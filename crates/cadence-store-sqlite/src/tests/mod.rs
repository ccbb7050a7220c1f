//! Integration tests for `SqliteStore` against an in-memory database.


use cadence_core::{
  cycle::NewCycle,
  directory::EmployeeRegistry,
  employee::{Employee, NewEmployee, Role},
};
use chrono::NaiveDate;
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn hire(s: &SqliteStore, name: &str, role: Role, manager_id: Option<Uuid>) -> Employee {
  s.insert_employee(NewEmployee {
    name: name.to_owned(),
    email: format!("{}@example.com", name.to_lowercase()),
    role,
    manager_id,
  })
  .await
  .unwrap()
}

fn quarter() -> NewCycle {
  NewCycle {
    name:       "2026 Q1".into(),
    start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
    end_date:   NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
  }
}

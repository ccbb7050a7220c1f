//! SQLite backend for Cadence.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. One [`SqliteStore`] serves as both the
//! [`ReviewStore`](cadence_core::store::ReviewStore) and the
//! [`EmployeeRegistry`](cadence_core::directory::EmployeeRegistry).

mod directory;
mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;

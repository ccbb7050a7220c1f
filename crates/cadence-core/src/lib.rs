//! Core types, collaborator traits, and the workflow engine for Cadence.
//!
//! This crate is deliberately free of HTTP and database dependencies. Storage
//! backends implement [`store::ReviewStore`] and [`directory::EmployeeDirectory`];
//! transports drive [`engine::ReviewEngine`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod assessment;
pub mod cycle;
pub mod directory;
pub mod employee;
pub mod engine;
pub mod error;
pub mod event;
pub mod permission;
pub mod policy;
pub mod store;
pub mod workflow;

pub use error::{Error, Result};

//! Review cycles: the bounded periods in which assessments are written.
//!
//! A cycle only moves forward: `upcoming → active → closed`. Closing is an
//! administrative cutoff; it freezes every contained assessment through the
//! permission resolver rather than by rewriting assessment rows.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CycleStatus {
  Upcoming,
  Active,
  Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewCycle {
  pub cycle_id:     Uuid,
  pub name:         String,
  pub start_date:   NaiveDate,
  /// Strictly after `start_date`.
  pub end_date:     NaiveDate,
  pub status:       CycleStatus,
  pub created_at:   DateTime<Utc>,
  pub activated_at: Option<DateTime<Utc>>,
  pub closed_at:    Option<DateTime<Utc>>,
}

impl ReviewCycle {
  pub fn is_active(&self) -> bool { self.status == CycleStatus::Active }

  pub fn is_closed(&self) -> bool { self.status == CycleStatus::Closed }
}

/// Input to [`crate::store::ReviewStore::insert_cycle`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCycle {
  pub name:       String,
  pub start_date: NaiveDate,
  pub end_date:   NaiveDate,
}

impl NewCycle {
  pub fn validate(&self) -> Result<()> {
    let mut fields = Vec::new();
    if self.name.trim().is_empty() {
      fields.push("name");
    }
    if self.end_date <= self.start_date {
      fields.push("end_date");
    }
    if fields.is_empty() { Ok(()) } else { Err(Error::validation(fields)) }
  }
}

/// Result of [`crate::engine::ReviewEngine::activate_cycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationOutcome {
  pub cycle_id:            Uuid,
  /// Rows inserted by this call; zero when the cycle was already active.
  pub assessments_created: usize,
  pub assessments_total:   usize,
}

/// Result of [`crate::engine::ReviewEngine::close_cycle`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleClosure {
  pub cycle:             ReviewCycle,
  pub assessments_total: usize,
  /// Assessments frozen before the employee acknowledged them.
  pub unacknowledged:    usize,
}

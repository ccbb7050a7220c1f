//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, cycle dates are `YYYY-MM-DD`, and
//! assessment content is compact JSON. Enum columns hold the variant's
//! `strum` serialisation.

use std::str::FromStr;

use cadence_core::{
  assessment::{Assessment, AuditEntry, EmployeeContent, ManagerContent},
  cycle::ReviewCycle,
  employee::Employee,
};
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

fn decode_opt_uuid(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

// ─── Dates ───────────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

/// Parse a `strum`-serialised enum column.
pub fn decode_enum<T: FromStr>(column: &'static str, value: String) -> Result<T> {
  T::from_str(&value).map_err(|_| Error::UnknownVariant { column, value })
}

// ─── Content ─────────────────────────────────────────────────────────────────

pub fn encode_employee_content(c: &EmployeeContent) -> Result<String> {
  Ok(serde_json::to_string(c)?)
}

pub fn encode_manager_content(c: &ManagerContent) -> Result<String> {
  Ok(serde_json::to_string(c)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const EMPLOYEE_COLUMNS: &str =
  "employee_id, name, email, role, manager_id, is_active, created_at";

/// Raw strings read directly from an `employees` row.
pub struct RawEmployee {
  pub employee_id: String,
  pub name:        String,
  pub email:       String,
  pub role:        String,
  pub manager_id:  Option<String>,
  pub is_active:   bool,
  pub created_at:  String,
}

impl RawEmployee {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      employee_id: row.get(0)?,
      name:        row.get(1)?,
      email:       row.get(2)?,
      role:        row.get(3)?,
      manager_id:  row.get(4)?,
      is_active:   row.get(5)?,
      created_at:  row.get(6)?,
    })
  }

  pub fn into_employee(self) -> Result<Employee> {
    Ok(Employee {
      employee_id: decode_uuid(&self.employee_id)?,
      name:        self.name,
      email:       self.email,
      role:        decode_enum("role", self.role)?,
      manager_id:  decode_opt_uuid(self.manager_id)?,
      is_active:   self.is_active,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

pub const CYCLE_COLUMNS: &str =
  "cycle_id, name, start_date, end_date, status, created_at, activated_at, closed_at";

/// Raw strings read directly from a `review_cycles` row.
pub struct RawCycle {
  pub cycle_id:     String,
  pub name:         String,
  pub start_date:   String,
  pub end_date:     String,
  pub status:       String,
  pub created_at:   String,
  pub activated_at: Option<String>,
  pub closed_at:    Option<String>,
}

impl RawCycle {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      cycle_id:     row.get(0)?,
      name:         row.get(1)?,
      start_date:   row.get(2)?,
      end_date:     row.get(3)?,
      status:       row.get(4)?,
      created_at:   row.get(5)?,
      activated_at: row.get(6)?,
      closed_at:    row.get(7)?,
    })
  }

  pub fn into_cycle(self) -> Result<ReviewCycle> {
    Ok(ReviewCycle {
      cycle_id:     decode_uuid(&self.cycle_id)?,
      name:         self.name,
      start_date:   decode_date(&self.start_date)?,
      end_date:     decode_date(&self.end_date)?,
      status:       decode_enum("status", self.status)?,
      created_at:   decode_dt(&self.created_at)?,
      activated_at: decode_opt_dt(self.activated_at)?,
      closed_at:    decode_opt_dt(self.closed_at)?,
    })
  }
}

pub const ASSESSMENT_COLUMNS: &str = "assessment_id, cycle_id, employee_id, manager_id, \
   self_assessment_status, manager_review_status, employee_acknowledged_at, \
   employee_content, manager_content, self_submitted_at, manager_submitted_at, \
   created_at, updated_at, version";

/// Raw strings read directly from an `assessments` row.
pub struct RawAssessment {
  pub assessment_id:            String,
  pub cycle_id:                 String,
  pub employee_id:              String,
  pub manager_id:               Option<String>,
  pub self_assessment_status:   String,
  pub manager_review_status:    String,
  pub employee_acknowledged_at: Option<String>,
  pub employee_content:         String,
  pub manager_content:          String,
  pub self_submitted_at:        Option<String>,
  pub manager_submitted_at:     Option<String>,
  pub created_at:               String,
  pub updated_at:               String,
  pub version:                  i64,
}

impl RawAssessment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      assessment_id:            row.get(0)?,
      cycle_id:                 row.get(1)?,
      employee_id:              row.get(2)?,
      manager_id:               row.get(3)?,
      self_assessment_status:   row.get(4)?,
      manager_review_status:    row.get(5)?,
      employee_acknowledged_at: row.get(6)?,
      employee_content:         row.get(7)?,
      manager_content:          row.get(8)?,
      self_submitted_at:        row.get(9)?,
      manager_submitted_at:     row.get(10)?,
      created_at:               row.get(11)?,
      updated_at:               row.get(12)?,
      version:                  row.get(13)?,
    })
  }

  pub fn into_assessment(self) -> Result<Assessment> {
    Ok(Assessment {
      assessment_id:            decode_uuid(&self.assessment_id)?,
      cycle_id:                 decode_uuid(&self.cycle_id)?,
      employee_id:              decode_uuid(&self.employee_id)?,
      manager_id:               decode_opt_uuid(self.manager_id)?,
      self_assessment_status:   decode_enum(
        "self_assessment_status",
        self.self_assessment_status,
      )?,
      manager_review_status:    decode_enum(
        "manager_review_status",
        self.manager_review_status,
      )?,
      employee_acknowledged_at: decode_opt_dt(self.employee_acknowledged_at)?,
      employee_content:         serde_json::from_str(&self.employee_content)?,
      manager_content:          serde_json::from_str(&self.manager_content)?,
      self_submitted_at:        decode_opt_dt(self.self_submitted_at)?,
      manager_submitted_at:     decode_opt_dt(self.manager_submitted_at)?,
      created_at:               decode_dt(&self.created_at)?,
      updated_at:               decode_dt(&self.updated_at)?,
      version:                  self.version,
    })
  }
}

/// Column values of an assessment, encoded for a write.
pub struct AssessmentRow {
  pub assessment_id:            String,
  pub cycle_id:                 String,
  pub employee_id:              String,
  pub manager_id:               Option<String>,
  pub self_assessment_status:   String,
  pub manager_review_status:    String,
  pub employee_acknowledged_at: Option<String>,
  pub employee_content:         String,
  pub manager_content:          String,
  pub self_submitted_at:        Option<String>,
  pub manager_submitted_at:     Option<String>,
  pub created_at:               String,
  pub updated_at:               String,
  pub version:                  i64,
}

impl AssessmentRow {
  pub fn encode(a: &Assessment) -> Result<Self> {
    Ok(Self {
      assessment_id:            encode_uuid(a.assessment_id),
      cycle_id:                 encode_uuid(a.cycle_id),
      employee_id:              encode_uuid(a.employee_id),
      manager_id:               a.manager_id.map(encode_uuid),
      self_assessment_status:   a.self_assessment_status.to_string(),
      manager_review_status:    a.manager_review_status.to_string(),
      employee_acknowledged_at: a.employee_acknowledged_at.map(encode_dt),
      employee_content:         encode_employee_content(&a.employee_content)?,
      manager_content:          encode_manager_content(&a.manager_content)?,
      self_submitted_at:        a.self_submitted_at.map(encode_dt),
      manager_submitted_at:     a.manager_submitted_at.map(encode_dt),
      created_at:               encode_dt(a.created_at),
      updated_at:               encode_dt(a.updated_at),
      version:                  a.version,
    })
  }
}

pub const AUDIT_COLUMNS: &str =
  "audit_id, assessment_id, actor_id, from_stage, to_stage, reason, recorded_at";

/// Raw strings read directly from an `assessment_audit` row.
pub struct RawAudit {
  pub audit_id:      String,
  pub assessment_id: String,
  pub actor_id:      String,
  pub from_stage:    String,
  pub to_stage:      String,
  pub reason:        Option<String>,
  pub recorded_at:   String,
}

impl RawAudit {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      audit_id:      row.get(0)?,
      assessment_id: row.get(1)?,
      actor_id:      row.get(2)?,
      from_stage:    row.get(3)?,
      to_stage:      row.get(4)?,
      reason:        row.get(5)?,
      recorded_at:   row.get(6)?,
    })
  }

  pub fn into_entry(self) -> Result<AuditEntry> {
    Ok(AuditEntry {
      audit_id:      decode_uuid(&self.audit_id)?,
      assessment_id: decode_uuid(&self.assessment_id)?,
      actor_id:      decode_uuid(&self.actor_id)?,
      from_stage:    decode_enum("from_stage", self.from_stage)?,
      to_stage:      decode_enum("to_stage", self.to_stage)?,
      reason:        self.reason,
      recorded_at:   decode_dt(&self.recorded_at)?,
    })
  }
}

/// Column values of an audit entry, encoded for insertion.
pub struct AuditRow {
  pub audit_id:      String,
  pub assessment_id: String,
  pub actor_id:      String,
  pub from_stage:    String,
  pub to_stage:      String,
  pub reason:        Option<String>,
  pub recorded_at:   String,
}

impl AuditRow {
  pub fn encode(e: &AuditEntry) -> Self {
    Self {
      audit_id:      encode_uuid(e.audit_id),
      assessment_id: encode_uuid(e.assessment_id),
      actor_id:      encode_uuid(e.actor_id),
      from_stage:    e.from_stage.to_string(),
      to_stage:      e.to_stage.to_string(),
      reason:        e.reason.clone(),
      recorded_at:   encode_dt(e.recorded_at),
    }
  }
}

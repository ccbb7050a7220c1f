//! [`SqliteStore`]: the SQLite implementation of [`ReviewStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use cadence_core::{
  assessment::{Assessment, AuditEntry, NewAssessment},
  cycle::{CycleStatus, NewCycle, ReviewCycle},
  policy::Eligibility,
  store::{ActivationCommit, ReviewStore, WriteGuard, WriteOutcome},
};

use crate::{
  encode::{
    decode_enum, encode_date, encode_dt, encode_uuid, AssessmentRow, AuditRow, RawAssessment,
    RawAudit, RawCycle, ASSESSMENT_COLUMNS, AUDIT_COLUMNS, CYCLE_COLUMNS,
  },
  schema::SCHEMA,
  Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Cadence store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn:        tokio_rusqlite::Connection,
  pub(crate) eligibility: Eligibility,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  /// Restrict which active employees a cycle activation fans out to.
  pub fn with_eligibility(mut self, eligibility: Eligibility) -> Self {
    self.eligibility = eligibility;
    self
  }

  pub fn eligibility(&self) -> &Eligibility { &self.eligibility }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(Self { conn, eligibility: Eligibility::default() })
  }
}

// ─── Row helpers ─────────────────────────────────────────────────────────────

fn select_cycle(
  conn: &rusqlite::Connection,
  cycle_id: &str,
) -> rusqlite::Result<Option<RawCycle>> {
  conn
    .query_row(
      &format!("SELECT {CYCLE_COLUMNS} FROM review_cycles WHERE cycle_id = ?1"),
      rusqlite::params![cycle_id],
      RawCycle::from_row,
    )
    .optional()
}

fn count_assessments(conn: &rusqlite::Connection, cycle_id: &str) -> rusqlite::Result<usize> {
  conn.query_row(
    "SELECT COUNT(*) FROM assessments WHERE cycle_id = ?1",
    rusqlite::params![cycle_id],
    |r| r.get(0),
  )
}

/// What the activation transaction saw, before decoding.
enum ActivationStep {
  Activated { raw: RawCycle, created: usize, total: usize },
  AlreadyActive { total: usize },
  Rejected(Option<String>),
}

// ─── ReviewStore impl ────────────────────────────────────────────────────────

impl ReviewStore for SqliteStore {
  type Error = crate::Error;

  // ── Cycles ────────────────────────────────────────────────────────────────

  async fn insert_cycle(&self, input: NewCycle) -> Result<ReviewCycle> {
    let cycle = ReviewCycle {
      cycle_id:     Uuid::new_v4(),
      name:         input.name,
      start_date:   input.start_date,
      end_date:     input.end_date,
      status:       CycleStatus::Upcoming,
      created_at:   Utc::now(),
      activated_at: None,
      closed_at:    None,
    };

    let id_str     = encode_uuid(cycle.cycle_id);
    let name       = cycle.name.clone();
    let start_str  = encode_date(cycle.start_date);
    let end_str    = encode_date(cycle.end_date);
    let status_str = cycle.status.to_string();
    let at_str     = encode_dt(cycle.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO review_cycles (cycle_id, name, start_date, end_date, status, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, name, start_str, end_str, status_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(cycle)
  }

  async fn get_cycle(&self, cycle_id: Uuid) -> Result<Option<ReviewCycle>> {
    let id_str = encode_uuid(cycle_id);
    let raw = self
      .conn
      .call(move |conn| Ok(select_cycle(conn, &id_str)?))
      .await?;
    raw.map(RawCycle::into_cycle).transpose()
  }

  async fn list_cycles(&self, status: Option<CycleStatus>) -> Result<Vec<ReviewCycle>> {
    let status_str = status.map(|s| s.to_string());
    let raws: Vec<RawCycle> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CYCLE_COLUMNS} FROM review_cycles
           WHERE ?1 IS NULL OR status = ?1
           ORDER BY start_date, created_at"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![status_str], RawCycle::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawCycle::into_cycle).collect()
  }

  async fn activate_cycle(
    &self,
    cycle_id: Uuid,
    batch: Vec<NewAssessment>,
  ) -> Result<ActivationCommit> {
    let now = Utc::now();
    let rows = batch
      .into_iter()
      .map(|n| AssessmentRow::encode(&n.into_assessment(now)))
      .collect::<Result<Vec<_>>>()?;
    let id_str = encode_uuid(cycle_id);
    let now_str = encode_dt(now);

    let step = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let status: Option<String> = tx
          .query_row(
            "SELECT status FROM review_cycles WHERE cycle_id = ?1",
            rusqlite::params![id_str],
            |r| r.get(0),
          )
          .optional()?;
        if status.as_deref() == Some("active") {
          let total = count_assessments(&tx, &id_str)?;
          return Ok(ActivationStep::AlreadyActive { total });
        }
        if status.as_deref() != Some("upcoming") {
          return Ok(ActivationStep::Rejected(status));
        }

        let mut created = 0;
        {
          let mut insert = tx.prepare(
            "INSERT INTO assessments (
               assessment_id, cycle_id, employee_id, manager_id,
               self_assessment_status, manager_review_status,
               employee_content, manager_content, created_at, updated_at, version
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT (employee_id, cycle_id) DO NOTHING",
          )?;
          for row in &rows {
            created += insert.execute(rusqlite::params![
              row.assessment_id,
              row.cycle_id,
              row.employee_id,
              row.manager_id,
              row.self_assessment_status,
              row.manager_review_status,
              row.employee_content,
              row.manager_content,
              row.created_at,
              row.updated_at,
              row.version,
            ])?;
          }
        }

        tx.execute(
          "UPDATE review_cycles SET status = 'active', activated_at = ?2
           WHERE cycle_id = ?1 AND status = 'upcoming'",
          rusqlite::params![id_str, now_str],
        )?;
        let total = count_assessments(&tx, &id_str)?;
        let raw = tx.query_row(
          &format!("SELECT {CYCLE_COLUMNS} FROM review_cycles WHERE cycle_id = ?1"),
          rusqlite::params![id_str],
          RawCycle::from_row,
        )?;

        tx.commit()?;
        Ok(ActivationStep::Activated { raw, created, total })
      })
      .await?;

    Ok(match step {
      ActivationStep::Activated { raw, created, total } => {
        ActivationCommit::Activated { cycle: raw.into_cycle()?, created, total }
      }
      ActivationStep::AlreadyActive { total } => ActivationCommit::AlreadyActive { total },
      ActivationStep::Rejected(status) => ActivationCommit::Rejected(
        status.map(|s| decode_enum("status", s)).transpose()?,
      ),
    })
  }

  async fn close_cycle(&self, cycle_id: Uuid) -> Result<Option<ReviewCycle>> {
    let id_str = encode_uuid(cycle_id);
    let now_str = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE review_cycles SET status = 'closed', closed_at = ?2
           WHERE cycle_id = ?1 AND status = 'active'",
          rusqlite::params![id_str, now_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(select_cycle(conn, &id_str)?)
      })
      .await?;
    raw.map(RawCycle::into_cycle).transpose()
  }

  // ── Assessments ───────────────────────────────────────────────────────────

  async fn get_assessment(&self, assessment_id: Uuid) -> Result<Option<Assessment>> {
    let id_str = encode_uuid(assessment_id);
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ASSESSMENT_COLUMNS} FROM assessments WHERE assessment_id = ?1"),
              rusqlite::params![id_str],
              RawAssessment::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawAssessment::into_assessment).transpose()
  }

  async fn list_assessments(&self, cycle_id: Uuid) -> Result<Vec<Assessment>> {
    let id_str = encode_uuid(cycle_id);
    let raws: Vec<RawAssessment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ASSESSMENT_COLUMNS} FROM assessments
           WHERE cycle_id = ?1
           ORDER BY created_at, employee_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawAssessment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawAssessment::into_assessment).collect()
  }

  async fn write_assessment(
    &self,
    next: Assessment,
    guard: WriteGuard,
    audit: Option<AuditEntry>,
  ) -> Result<WriteOutcome> {
    let row = AssessmentRow::encode(&next)?;
    let audit = audit.as_ref().map(AuditRow::encode);
    let require_active = guard == WriteGuard::CycleActive;

    // `manager_id` and `created_at` are fixed at activation and never
    // rewritten.
    let applied = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute(
          "UPDATE assessments SET
             self_assessment_status   = ?2,
             manager_review_status    = ?3,
             employee_acknowledged_at = ?4,
             employee_content         = ?5,
             manager_content          = ?6,
             self_submitted_at        = ?7,
             manager_submitted_at     = ?8,
             updated_at               = ?9,
             version                  = version + 1
           WHERE assessment_id = ?1
             AND version = ?10
             AND (?11 = 0 OR EXISTS (
               SELECT 1 FROM review_cycles c
               WHERE c.cycle_id = assessments.cycle_id AND c.status = 'active'
             ))",
          rusqlite::params![
            row.assessment_id,
            row.self_assessment_status,
            row.manager_review_status,
            row.employee_acknowledged_at,
            row.employee_content,
            row.manager_content,
            row.self_submitted_at,
            row.manager_submitted_at,
            row.updated_at,
            row.version,
            require_active,
          ],
        )?;
        if changed == 0 {
          return Ok(false);
        }

        if let Some(entry) = audit {
          tx.execute(
            "INSERT INTO assessment_audit
               (audit_id, assessment_id, actor_id, from_stage, to_stage, reason, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
              entry.audit_id,
              entry.assessment_id,
              entry.actor_id,
              entry.from_stage,
              entry.to_stage,
              entry.reason,
              entry.recorded_at,
            ],
          )?;
        }

        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !applied {
      return Ok(WriteOutcome::Conflict);
    }
    let version = next.version + 1;
    Ok(WriteOutcome::Applied(Assessment { version, ..next }))
  }

  async fn list_audit(&self, assessment_id: Uuid) -> Result<Vec<AuditEntry>> {
    let id_str = encode_uuid(assessment_id);
    let raws: Vec<RawAudit> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {AUDIT_COLUMNS} FROM assessment_audit
           WHERE assessment_id = ?1
           ORDER BY recorded_at, rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawAudit::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawAudit::into_entry).collect()
  }
}

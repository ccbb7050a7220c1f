//! SQL schema for the Cadence SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Employees are soft-deactivated, never deleted.
CREATE TABLE IF NOT EXISTS employees (
    employee_id TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    email       TEXT NOT NULL,
    role        TEXT NOT NULL,     -- 'employee' | 'manager' | 'admin'
    manager_id  TEXT REFERENCES employees(employee_id),
    is_active   INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL,
    CHECK (manager_id IS NULL OR manager_id != employee_id)
);

CREATE TABLE IF NOT EXISTS review_cycles (
    cycle_id     TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    start_date   TEXT NOT NULL,    -- YYYY-MM-DD
    end_date     TEXT NOT NULL,    -- YYYY-MM-DD
    status       TEXT NOT NULL DEFAULT 'upcoming',
    created_at   TEXT NOT NULL,
    activated_at TEXT,
    closed_at    TEXT,
    CHECK (end_date > start_date)
);

-- One row per (employee, cycle). Written only by activation and by
-- version-checked transitions.
CREATE TABLE IF NOT EXISTS assessments (
    assessment_id            TEXT PRIMARY KEY,
    cycle_id                 TEXT NOT NULL REFERENCES review_cycles(cycle_id),
    employee_id              TEXT NOT NULL REFERENCES employees(employee_id),
    manager_id               TEXT REFERENCES employees(employee_id),
    self_assessment_status   TEXT NOT NULL DEFAULT 'not_started',
    manager_review_status    TEXT NOT NULL DEFAULT 'pending',
    employee_acknowledged_at TEXT,
    employee_content         TEXT NOT NULL,   -- JSON EmployeeContent
    manager_content          TEXT NOT NULL,   -- JSON ManagerContent
    self_submitted_at        TEXT,
    manager_submitted_at     TEXT,
    created_at               TEXT NOT NULL,
    updated_at               TEXT NOT NULL,
    version                  INTEGER NOT NULL DEFAULT 0,
    UNIQUE (employee_id, cycle_id)
);

-- Admin overrides. Append-only.
CREATE TABLE IF NOT EXISTS assessment_audit (
    audit_id      TEXT PRIMARY KEY,
    assessment_id TEXT NOT NULL REFERENCES assessments(assessment_id),
    actor_id      TEXT NOT NULL,
    from_stage    TEXT NOT NULL,
    to_stage      TEXT NOT NULL,
    reason        TEXT,
    recorded_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS employees_manager_idx   ON employees(manager_id);
CREATE INDEX IF NOT EXISTS assessments_cycle_idx   ON assessments(cycle_id);
CREATE INDEX IF NOT EXISTS assessments_manager_idx ON assessments(manager_id);
CREATE INDEX IF NOT EXISTS audit_assessment_idx    ON assessment_audit(assessment_id);

PRAGMA user_version = 1;
";

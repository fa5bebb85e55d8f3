//! SQL schema for the Telos SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.
//!
//! Tables come in three families: abstractions, basics (one foreign key to
//! their abstraction, UNIQUE so the pairing is one-to-one) and composites.
//! No foreign key cascades: coordinators delete children before parents
//! themselves, and `foreign_keys = ON` rejects any write that would dangle.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- ── Abstractions ────────────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS measures (
    id            TEXT PRIMARY KEY,
    title         TEXT NOT NULL,
    unit          TEXT NOT NULL,
    measure_type  TEXT NOT NULL,
    description   TEXT,
    notes         TEXT,
    log_time      TEXT NOT NULL       -- ISO 8601 UTC; never updated
);

CREATE TABLE IF NOT EXISTS personal_values (
    id                 TEXT PRIMARY KEY,
    title              TEXT NOT NULL,
    description        TEXT,
    notes              TEXT,
    log_time           TEXT NOT NULL,
    priority           INTEGER NOT NULL,
    value_level        TEXT NOT NULL,  -- 'general' | 'major' | 'highest_order' | 'life_area'
    life_domain        TEXT NOT NULL,
    alignment_guidance TEXT            -- JSON or NULL
);

CREATE TABLE IF NOT EXISTS time_periods (
    id           TEXT PRIMARY KEY,
    title        TEXT NOT NULL,
    description  TEXT,
    notes        TEXT,
    log_time     TEXT NOT NULL,
    start_date   TEXT NOT NULL,
    end_date     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS expectations (
    id           TEXT PRIMARY KEY,
    title        TEXT NOT NULL,
    description  TEXT,
    notes        TEXT,
    log_time     TEXT NOT NULL,
    importance   INTEGER NOT NULL,
    urgency      INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS actions (
    id                TEXT PRIMARY KEY,
    title             TEXT NOT NULL,
    description       TEXT,
    notes             TEXT,
    log_time          TEXT NOT NULL,
    duration_minutes  REAL,
    start_time        TEXT
);

-- ── Basics ──────────────────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS goal_terms (
    id              TEXT PRIMARY KEY,
    time_period_id  TEXT NOT NULL UNIQUE REFERENCES time_periods(id),
    term_number     INTEGER NOT NULL,
    theme           TEXT,
    reflection      TEXT,
    status          TEXT NOT NULL     -- 'planned' | 'active' | 'completed'
);

CREATE TABLE IF NOT EXISTS goals (
    id                    TEXT PRIMARY KEY,
    expectation_id        TEXT NOT NULL UNIQUE REFERENCES expectations(id),
    goal_kind             TEXT NOT NULL,  -- 'goal' | 'smart_goal' | 'milestone'
    start_date            TEXT,
    target_date           TEXT,
    action_plan           TEXT,
    expected_term_length  INTEGER
);

-- ── Composites ──────────────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS expectation_measures (
    id              TEXT PRIMARY KEY,
    expectation_id  TEXT NOT NULL REFERENCES expectations(id),
    measure_id      TEXT NOT NULL REFERENCES measures(id),
    target_value    REAL NOT NULL,
    created_at      TEXT NOT NULL,
    UNIQUE (expectation_id, measure_id)
);

CREATE TABLE IF NOT EXISTS goal_relevances (
    id                  TEXT PRIMARY KEY,
    goal_id             TEXT NOT NULL REFERENCES goals(id),
    value_id            TEXT NOT NULL REFERENCES personal_values(id),
    alignment_strength  INTEGER NOT NULL,
    relevance_notes     TEXT,
    created_at          TEXT NOT NULL,
    UNIQUE (goal_id, value_id)
);

-- A goal is committed to at most one term.
CREATE TABLE IF NOT EXISTS term_goal_assignments (
    id                TEXT PRIMARY KEY,
    term_id           TEXT NOT NULL REFERENCES goal_terms(id),
    goal_id           TEXT NOT NULL UNIQUE REFERENCES goals(id),
    assignment_order  INTEGER NOT NULL,
    created_at        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS measured_actions (
    id          TEXT PRIMARY KEY,
    action_id   TEXT NOT NULL REFERENCES actions(id),
    measure_id  TEXT NOT NULL REFERENCES measures(id),
    value       REAL NOT NULL,
    created_at  TEXT NOT NULL,
    UNIQUE (action_id, measure_id)
);

CREATE TABLE IF NOT EXISTS action_goal_contributions (
    id                   TEXT PRIMARY KEY,
    action_id            TEXT NOT NULL REFERENCES actions(id),
    goal_id              TEXT NOT NULL REFERENCES goals(id),
    contribution_amount  REAL,
    measure_id           TEXT REFERENCES measures(id),
    assignment_method    TEXT NOT NULL,  -- 'auto_inferred' | 'user_confirmed' | 'manual'
    confidence           REAL NOT NULL,
    created_at           TEXT NOT NULL,
    UNIQUE (action_id, goal_id)
);

CREATE INDEX IF NOT EXISTS expectation_measures_measure_idx ON expectation_measures(measure_id);
CREATE INDEX IF NOT EXISTS goal_relevances_value_idx        ON goal_relevances(value_id);
CREATE INDEX IF NOT EXISTS term_goal_assignments_term_idx   ON term_goal_assignments(term_id);
CREATE INDEX IF NOT EXISTS measured_actions_measure_idx     ON measured_actions(measure_id);
CREATE INDEX IF NOT EXISTS contributions_goal_idx           ON action_goal_contributions(goal_id);
CREATE INDEX IF NOT EXISTS contributions_measure_idx        ON action_goal_contributions(measure_id);

PRAGMA user_version = 1;
";

//! Database schema definitions.

use rusqlite::{Connection, Result};

pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// The complete SQL schema for the civitrack database.
///
/// Notes:
/// - `issue_updates` is owned by its issue (`ON DELETE CASCADE`); audit
///   entries never outlive the issue they describe.
/// - `sessions.user_id` is a weak reference on purpose: deleting a user
///   must not silently cascade into the session ledger.
/// - Statuses are stored canonical lowercase; case-insensitivity is
///   handled at the parse boundary.
pub const SCHEMA_SQL: &str = r"
    -- Users
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'citizen',
        full_name TEXT,
        phone TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_users_role ON users(role);

    -- Sessions (revocable; a deleted row is a revoked token)
    CREATE TABLE IF NOT EXISTS sessions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        token TEXT NOT NULL UNIQUE,
        expires_at TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id);

    -- Issues
    CREATE TABLE IF NOT EXISTS issues (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        category TEXT NOT NULL,
        location TEXT NOT NULL,
        latitude REAL,
        longitude REAL,
        reporter_name TEXT NOT NULL,
        reporter_email TEXT NOT NULL,
        reporter_phone TEXT,
        photo_path TEXT,
        status TEXT NOT NULL DEFAULT 'open',
        priority TEXT NOT NULL DEFAULT 'medium',
        assigned_volunteer_id TEXT,
        admin_notes TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        resolved_at TEXT,
        CHECK (length(title) >= 1 AND length(title) <= 500)
    );
    CREATE INDEX IF NOT EXISTS idx_issues_status ON issues(status);
    CREATE INDEX IF NOT EXISTS idx_issues_category ON issues(category);
    CREATE INDEX IF NOT EXISTS idx_issues_priority ON issues(priority);
    CREATE INDEX IF NOT EXISTS idx_issues_created_at ON issues(created_at);
    CREATE INDEX IF NOT EXISTS idx_issues_assigned ON issues(assigned_volunteer_id);

    -- Audit log (append-only, owned by its issue)
    CREATE TABLE IF NOT EXISTS issue_updates (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        issue_id TEXT NOT NULL,
        update_type TEXT NOT NULL,
        message TEXT NOT NULL,
        user_id TEXT,
        created_at TEXT NOT NULL,
        FOREIGN KEY (issue_id) REFERENCES issues(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_issue_updates_issue_id ON issue_updates(issue_id);
    CREATE INDEX IF NOT EXISTS idx_issue_updates_created_at ON issue_updates(created_at);

    -- Volunteers
    CREATE TABLE IF NOT EXISTS volunteers (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        phone TEXT,
        skills TEXT,
        location_preference TEXT,
        experience_level TEXT,
        availability TEXT,
        status TEXT NOT NULL DEFAULT 'active',
        joined_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_volunteers_status ON volunteers(status);
    CREATE INDEX IF NOT EXISTS idx_volunteers_joined_at ON volunteers(joined_at);
";

/// Apply the schema to the database.
///
/// This uses `execute_batch` to run the entire DDL script.
/// It is idempotent because all statements use `IF NOT EXISTS`.
///
/// # Errors
///
/// Returns an error if the SQL execution fails or pragmas cannot be set.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // WAL for concurrent admin activity
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // Required for issue_updates cascade
    conn.pragma_update(None, "foreign_keys", "ON")?;

    Ok(())
}

//! `SQLite` storage backend.
//!
//! All writes go through [`SqliteStorage::mutate`], which opens an
//! immediate transaction and flushes any audit entries queued during the
//! mutation before committing. An operation either lands together with
//! its audit trail or not at all.

use crate::error::{CivicError, Result};
use crate::model::{
    Issue, Session, Status, UpdateEntry, UpdateType, User, Volunteer, VolunteerStatus,
};
use crate::query::{IssueFilter, IssuePage, Page, PageInfo};
use crate::storage::schema;
use crate::util::time::parse_datetime;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, ToSql, Transaction, TransactionBehavior};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Audit message seeded when a citizen report is accepted.
pub const SUBMISSION_NOTE: &str = "Issue reported and submitted for review";

const ISSUE_COLUMNS: &str = "id, title, description, category, location, latitude, longitude, \
     reporter_name, reporter_email, reporter_phone, photo_path, status, priority, \
     assigned_volunteer_id, admin_notes, created_at, updated_at, resolved_at";

/// A partial update to a single issue. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct IssueChange {
    pub status: Option<Status>,
    pub priority: Option<String>,
    /// Outer `None` leaves the assignment alone; `Some(None)` clears it.
    pub assigned_volunteer_id: Option<Option<String>>,
    pub admin_notes: Option<String>,
}

/// The field changes a bulk action applies to every matched issue.
#[derive(Debug, Clone, Default)]
pub struct BulkChange {
    pub status: Option<Status>,
    pub priority: Option<String>,
}

/// Filter for volunteer roster listings.
#[derive(Debug, Clone, Default)]
pub struct VolunteerFilter {
    pub status: Option<VolunteerStatus>,
    /// Case-insensitive substring over name, skills and location preference.
    pub search: Option<String>,
}

/// Queues audit entries during a mutation; they are written inside the
/// same transaction just before commit.
pub struct MutationContext {
    actor: Option<String>,
    pending: Vec<PendingEntry>,
}

struct PendingEntry {
    issue_id: String,
    update_type: UpdateType,
    message: String,
    created_at: DateTime<Utc>,
}

impl MutationContext {
    fn new(actor: Option<&str>) -> Self {
        Self {
            actor: actor.map(str::to_string),
            pending: Vec::new(),
        }
    }

    /// Queue an audit entry for `issue_id`.
    pub fn record(&mut self, issue_id: &str, update_type: UpdateType, message: impl Into<String>) {
        self.pending.push(PendingEntry {
            issue_id: issue_id.to_string(),
            update_type,
            message: message.into(),
            created_at: Utc::now(),
        });
    }
}

/// `SQLite`-backed storage.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Open (creating if necessary) a database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or the schema fails
    /// to apply.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        schema::apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database. Used by tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema fails to apply.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Run `f` inside an immediate transaction, then flush queued audit
    /// entries and commit. Any error rolls the whole mutation back.
    fn mutate<T, F>(&mut self, op: &'static str, actor: Option<&str>, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>, &mut MutationContext) -> Result<T>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut ctx = MutationContext::new(actor);
        let out = f(&tx, &mut ctx)?;

        let entries = ctx.pending.len();
        for entry in &ctx.pending {
            tx.execute(
                "INSERT INTO issue_updates (issue_id, update_type, message, user_id, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    entry.issue_id,
                    entry.update_type.as_str(),
                    entry.message,
                    ctx.actor,
                    entry.created_at.to_rfc3339(),
                ],
            )?;
        }
        tx.commit()?;
        debug!(op, entries, "mutation committed");
        Ok(out)
    }

    // === Issues ===

    /// Insert a new issue and seed its audit log with the submission entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (duplicate id, constraint
    /// violation, storage failure).
    pub fn create_issue(&mut self, issue: &Issue) -> Result<()> {
        self.mutate("create_issue", None, |tx, ctx| {
            tx.execute(
                "INSERT INTO issues (id, title, description, category, location, latitude, \
                 longitude, reporter_name, reporter_email, reporter_phone, photo_path, status, \
                 priority, assigned_volunteer_id, admin_notes, created_at, updated_at, resolved_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
                params![
                    issue.id,
                    issue.title,
                    issue.description,
                    issue.category.as_str(),
                    issue.location,
                    issue.latitude,
                    issue.longitude,
                    issue.reporter_name,
                    issue.reporter_email,
                    issue.reporter_phone,
                    issue.photo_path,
                    issue.status.as_str(),
                    issue.priority,
                    issue.assigned_volunteer_id,
                    issue.admin_notes,
                    issue.created_at.to_rfc3339(),
                    issue.updated_at.to_rfc3339(),
                    issue.resolved_at.map(|t| t.to_rfc3339()),
                ],
            )?;
            ctx.record(&issue.id, UpdateType::StatusChange, SUBMISSION_NOTE);
            Ok(())
        })
    }

    /// Fetch a single issue without its audit log.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn get_issue(&self, id: &str) -> Result<Option<Issue>> {
        fetch_issue(&self.conn, id)
    }

    /// Fetch a single issue with its audit log loaded, oldest entry first.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn get_issue_with_updates(&self, id: &str) -> Result<Option<Issue>> {
        let Some(mut issue) = fetch_issue(&self.conn, id)? else {
            return Ok(None);
        };
        issue.updates = self.list_updates(id)?;
        Ok(Some(issue))
    }

    /// The audit log for one issue, oldest entry first.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn list_updates(&self, issue_id: &str) -> Result<Vec<UpdateEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, issue_id, update_type, message, user_id, created_at \
             FROM issue_updates WHERE issue_id = ?1 ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map(params![issue_id], update_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// Apply a partial update to one issue.
    ///
    /// `updated_at` is refreshed even when the change carries no fields.
    /// A transition into resolved stamps `resolved_at` the first time;
    /// leaving resolved never clears it. Each observable field change
    /// appends its own audit entry attributed to `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`CivicError::IssueNotFound`] if no issue has this id, or
    /// an error on storage failure.
    pub fn apply_update(
        &mut self,
        id: &str,
        change: &IssueChange,
        actor: Option<&str>,
    ) -> Result<Issue> {
        self.mutate("apply_update", actor, |tx, ctx| {
            let Some(current) = fetch_issue(tx, id)? else {
                return Err(CivicError::IssueNotFound { id: id.to_string() });
            };

            let now = Utc::now();
            let mut sets: Vec<&str> = vec!["updated_at = ?"];
            let mut values: Vec<Box<dyn ToSql>> = vec![Box::new(now.to_rfc3339())];

            if let Some(ref status) = change.status {
                sets.push("status = ?");
                values.push(Box::new(status.as_str().to_string()));
                if *status != current.status {
                    if *status == Status::Resolved && current.resolved_at.is_none() {
                        sets.push("resolved_at = ?");
                        values.push(Box::new(now.to_rfc3339()));
                    }
                    ctx.record(
                        id,
                        UpdateType::StatusChange,
                        format!("Status changed from {} to {status}", current.status),
                    );
                }
            }

            if let Some(ref priority) = change.priority {
                sets.push("priority = ?");
                values.push(Box::new(priority.clone()));
                if !priority.eq_ignore_ascii_case(&current.priority) {
                    ctx.record(
                        id,
                        UpdateType::AdminUpdate,
                        format!("Priority changed from {} to {priority}", current.priority),
                    );
                }
            }

            if let Some(ref assignment) = change.assigned_volunteer_id {
                sets.push("assigned_volunteer_id = ?");
                values.push(Box::new(assignment.clone()));
                if *assignment != current.assigned_volunteer_id {
                    let message = match assignment {
                        Some(volunteer_id) => format!("Issue assigned to volunteer {volunteer_id}"),
                        None => "Volunteer assignment cleared".to_string(),
                    };
                    ctx.record(id, UpdateType::AdminUpdate, message);
                }
            }

            if let Some(ref notes) = change.admin_notes {
                sets.push("admin_notes = ?");
                values.push(Box::new(notes.clone()));
                if current.admin_notes.as_deref() != Some(notes.as_str()) {
                    ctx.record(id, UpdateType::AdminUpdate, "Admin notes updated");
                }
            }

            let sql = format!("UPDATE issues SET {} WHERE id = ?", sets.join(", "));
            values.push(Box::new(id.to_string()));
            let refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
            tx.execute(&sql, refs.as_slice())?;

            fetch_issue(tx, id)?.ok_or_else(|| CivicError::IssueNotFound { id: id.to_string() })
        })
    }

    /// Delete one issue; the audit log goes with it via cascade.
    ///
    /// Returns the photo reference so the caller can release the stored
    /// file after the transaction commits.
    ///
    /// # Errors
    ///
    /// Returns [`CivicError::IssueNotFound`] if no issue has this id, or
    /// an error on storage failure.
    pub fn delete_issue(&mut self, id: &str) -> Result<Option<String>> {
        self.mutate("delete_issue", None, |tx, _ctx| {
            let Some(issue) = fetch_issue(tx, id)? else {
                return Err(CivicError::IssueNotFound { id: id.to_string() });
            };
            tx.execute("DELETE FROM issues WHERE id = ?1", params![id])?;
            Ok(issue.photo_path)
        })
    }

    /// Apply `change` to every existing issue in `ids`, recording one
    /// bulk-action audit entry per matched issue.
    ///
    /// Ids without a matching issue are silently skipped; the returned
    /// count reflects actual matches only. The whole batch commits or
    /// rolls back as one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn bulk_update(
        &mut self,
        ids: &[String],
        change: &BulkChange,
        note: &str,
        actor: Option<&str>,
    ) -> Result<u64> {
        self.mutate("bulk_update", actor, |tx, ctx| {
            let matched = matched_ids(tx, ids)?;
            if matched.is_empty() {
                return Ok(0);
            }

            let now = Utc::now().to_rfc3339();
            let mut sets: Vec<&str> = vec!["updated_at = ?"];
            let mut values: Vec<Box<dyn ToSql>> = vec![Box::new(now.clone())];

            if let Some(ref status) = change.status {
                sets.push("status = ?");
                values.push(Box::new(status.as_str().to_string()));
                if *status == Status::Resolved {
                    // Keep the first resolution time on already-resolved rows
                    sets.push("resolved_at = COALESCE(resolved_at, ?)");
                    values.push(Box::new(now));
                }
            }
            if let Some(ref priority) = change.priority {
                sets.push("priority = ?");
                values.push(Box::new(priority.clone()));
            }

            let placeholders = vec!["?"; matched.len()].join(", ");
            let sql = format!(
                "UPDATE issues SET {} WHERE id IN ({placeholders})",
                sets.join(", ")
            );
            for id in &matched {
                values.push(Box::new(id.clone()));
            }
            let refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
            tx.execute(&sql, refs.as_slice())?;

            for id in &matched {
                ctx.record(id, UpdateType::BulkAction, note);
            }
            Ok(matched.len() as u64)
        })
    }

    /// Delete every existing issue in `ids` in one transaction.
    ///
    /// Returns the matched count and the photo references of the deleted
    /// issues, for release after commit. Missing ids are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn bulk_delete(&mut self, ids: &[String], actor: Option<&str>) -> Result<(u64, Vec<String>)> {
        self.mutate("bulk_delete", actor, |tx, _ctx| {
            let matched = matched_ids(tx, ids)?;
            if matched.is_empty() {
                return Ok((0, Vec::new()));
            }

            let placeholders = vec!["?"; matched.len()].join(", ");
            let refs: Vec<&dyn ToSql> = matched.iter().map(|id| id as &dyn ToSql).collect();

            let mut stmt = tx.prepare(&format!(
                "SELECT photo_path FROM issues WHERE id IN ({placeholders}) \
                 AND photo_path IS NOT NULL AND photo_path != ''"
            ))?;
            let photos = stmt
                .query_map(refs.as_slice(), |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<String>>>()?;
            drop(stmt);

            tx.execute(
                &format!("DELETE FROM issues WHERE id IN ({placeholders})"),
                refs.as_slice(),
            )?;
            Ok((matched.len() as u64, photos))
        })
    }

    /// List issues newest first, with a total count independent of the
    /// pagination window. Audit logs are not loaded in listings.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn list_issues(&self, filter: &IssueFilter, page: Page) -> Result<IssuePage> {
        let (clause, mut values) = filter.where_clause();

        let count_refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM issues WHERE 1=1{clause}"),
            count_refs.as_slice(),
            |row| row.get(0),
        )?;
        let total = u64::try_from(total).unwrap_or(0);

        let mut sql = format!(
            "SELECT {ISSUE_COLUMNS} FROM issues WHERE 1=1{clause} \
             ORDER BY created_at DESC, id DESC"
        );
        page.apply(&mut sql, &mut values);
        let refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let items = stmt
            .query_map(refs.as_slice(), issue_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(IssuePage {
            items,
            pagination: PageInfo::new(total, page),
        })
    }

    // === Users ===

    /// Insert a new user, rejecting username or email collisions.
    ///
    /// # Errors
    ///
    /// Returns [`CivicError::DuplicateIdentity`] naming the clashing field,
    /// or an error on storage failure.
    pub fn insert_user(&mut self, user: &User) -> Result<()> {
        self.mutate("insert_user", None, |tx, _ctx| {
            let clash: Option<String> = tx
                .query_row(
                    "SELECT CASE WHEN username = ?1 THEN 'username' ELSE 'email' END \
                     FROM users WHERE username = ?1 OR email = ?2 LIMIT 1",
                    params![user.username, user.email],
                    |row| row.get(0),
                )
                .optional()?;
            if let Some(field) = clash {
                return Err(CivicError::DuplicateIdentity { field });
            }
            tx.execute(
                "INSERT INTO users (id, username, email, password_hash, role, full_name, phone, \
                 created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    user.id,
                    user.username,
                    user.email,
                    user.password_hash,
                    user.role.as_str(),
                    user.full_name,
                    user.phone,
                    user.created_at.to_rfc3339(),
                    user.updated_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
    }

    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, username, email, password_hash, role, full_name, phone, created_at, \
                 updated_at FROM users WHERE username = ?1",
                params![username],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn get_user(&self, id: &str) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, username, email, password_hash, role, full_name, phone, created_at, \
                 updated_at FROM users WHERE id = ?1",
                params![id],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    /// Replace a user's password hash.
    ///
    /// # Errors
    ///
    /// Returns [`CivicError::UserNotFound`] if no user has this id, or an
    /// error on storage failure.
    pub fn set_password_hash(&mut self, user_id: &str, hash: &str) -> Result<()> {
        self.mutate("set_password_hash", None, |tx, _ctx| {
            let changed = tx.execute(
                "UPDATE users SET password_hash = ?1, updated_at = ?2 WHERE id = ?3",
                params![hash, Utc::now().to_rfc3339(), user_id],
            )?;
            if changed == 0 {
                return Err(CivicError::UserNotFound {
                    id: user_id.to_string(),
                });
            }
            Ok(())
        })
    }

    // === Sessions ===

    /// Record a freshly issued token in the session ledger.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn insert_session(
        &mut self,
        user_id: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Session> {
        let created_at = Utc::now();
        self.mutate("insert_session", None, |tx, _ctx| {
            tx.execute(
                "INSERT INTO sessions (user_id, token, expires_at, created_at) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    user_id,
                    token,
                    expires_at.to_rfc3339(),
                    created_at.to_rfc3339(),
                ],
            )?;
            Ok(Session {
                id: tx.last_insert_rowid(),
                user_id: user_id.to_string(),
                token: token.to_string(),
                expires_at,
                created_at,
            })
        })
    }

    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn find_session(&self, token: &str) -> Result<Option<Session>> {
        let session = self
            .conn
            .query_row(
                "SELECT id, user_id, token, expires_at, created_at FROM sessions WHERE token = ?1",
                params![token],
                session_from_row,
            )
            .optional()?;
        Ok(session)
    }

    /// Revoke a token by deleting its session row. Idempotent; returns
    /// whether a row existed.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn delete_session(&mut self, token: &str) -> Result<bool> {
        self.mutate("delete_session", None, |tx, _ctx| {
            let deleted = tx.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
            Ok(deleted > 0)
        })
    }

    // === Volunteers ===

    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn insert_volunteer(&mut self, volunteer: &Volunteer) -> Result<()> {
        self.mutate("insert_volunteer", None, |tx, _ctx| {
            tx.execute(
                "INSERT INTO volunteers (id, name, email, phone, skills, location_preference, \
                 experience_level, availability, status, joined_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    volunteer.id,
                    volunteer.name,
                    volunteer.email,
                    volunteer.phone,
                    volunteer.skills,
                    volunteer.location_preference,
                    volunteer.experience_level,
                    volunteer.availability,
                    volunteer.status.as_str(),
                    volunteer.joined_at.to_rfc3339(),
                    volunteer.updated_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
    }

    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn get_volunteer(&self, id: &str) -> Result<Option<Volunteer>> {
        fetch_volunteer(&self.conn, id)
    }

    /// List volunteers, newest joiner first.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn list_volunteers(&self, filter: &VolunteerFilter) -> Result<Vec<Volunteer>> {
        let mut sql = String::from(
            "SELECT id, name, email, phone, skills, location_preference, experience_level, \
             availability, status, joined_at, updated_at FROM volunteers WHERE 1=1",
        );
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(status) = filter.status {
            sql.push_str(" AND status = ?");
            values.push(Box::new(status.as_str().to_string()));
        }
        if let Some(ref search) = filter.search {
            let trimmed = search.trim();
            if !trimmed.is_empty() {
                sql.push_str(
                    " AND (name LIKE ? ESCAPE '\\' OR skills LIKE ? ESCAPE '\\' OR location_preference LIKE ? ESCAPE '\\')",
                );
                let pattern = format!("%{}%", crate::query::escape_like(trimmed));
                for _ in 0..3 {
                    values.push(Box::new(pattern.clone()));
                }
            }
        }
        sql.push_str(" ORDER BY joined_at DESC, id DESC");

        let refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let mut stmt = self.conn.prepare(&sql)?;
        let volunteers = stmt
            .query_map(refs.as_slice(), volunteer_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(volunteers)
    }

    /// Flip a volunteer between active and inactive.
    ///
    /// # Errors
    ///
    /// Returns [`CivicError::VolunteerNotFound`] if no volunteer has this
    /// id, or an error on storage failure.
    pub fn set_volunteer_status(
        &mut self,
        id: &str,
        status: VolunteerStatus,
    ) -> Result<Volunteer> {
        self.mutate("set_volunteer_status", None, |tx, _ctx| {
            let changed = tx.execute(
                "UPDATE volunteers SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![status.as_str(), Utc::now().to_rfc3339(), id],
            )?;
            if changed == 0 {
                return Err(CivicError::VolunteerNotFound { id: id.to_string() });
            }
            fetch_volunteer(tx, id)?
                .ok_or_else(|| CivicError::VolunteerNotFound { id: id.to_string() })
        })
    }

    /// Whether an id exists in the issues table. Used by id generation.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn issue_id_exists(&self, id: &str) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM issues WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

fn fetch_issue(conn: &Connection, id: &str) -> Result<Option<Issue>> {
    let issue = conn
        .query_row(
            &format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE id = ?1"),
            params![id],
            issue_from_row,
        )
        .optional()?;
    Ok(issue)
}

fn fetch_volunteer(conn: &Connection, id: &str) -> Result<Option<Volunteer>> {
    let volunteer = conn
        .query_row(
            "SELECT id, name, email, phone, skills, location_preference, experience_level, \
             availability, status, joined_at, updated_at FROM volunteers WHERE id = ?1",
            params![id],
            volunteer_from_row,
        )
        .optional()?;
    Ok(volunteer)
}

/// The subset of `ids` that exist, ordered newest first.
fn matched_ids(conn: &Connection, ids: &[String]) -> Result<Vec<String>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = vec!["?"; ids.len()].join(", ");
    let refs: Vec<&dyn ToSql> = ids.iter().map(|id| id as &dyn ToSql).collect();
    let mut stmt = conn.prepare(&format!(
        "SELECT id FROM issues WHERE id IN ({placeholders}) ORDER BY created_at DESC, id DESC"
    ))?;
    let matched = stmt
        .query_map(refs.as_slice(), |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(matched)
}

fn parse_text_column<T>(idx: usize, raw: &str) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = CivicError>,
{
    raw.parse().map_err(|e: CivicError| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn empty_to_none(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn issue_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Issue> {
    let status_raw: String = row.get("status")?;
    let category_raw: String = row.get("category")?;
    Ok(Issue {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        category: category_raw.parse().unwrap_or_default(),
        location: row.get("location")?,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        reporter_name: row.get("reporter_name")?,
        reporter_email: row.get("reporter_email")?,
        reporter_phone: empty_to_none(row.get("reporter_phone")?),
        photo_path: empty_to_none(row.get("photo_path")?),
        status: parse_text_column(11, &status_raw)?,
        priority: row.get("priority")?,
        assigned_volunteer_id: empty_to_none(row.get("assigned_volunteer_id")?),
        admin_notes: empty_to_none(row.get("admin_notes")?),
        updates: Vec::new(),
        created_at: parse_datetime(&row.get::<_, String>("created_at")?),
        updated_at: parse_datetime(&row.get::<_, String>("updated_at")?),
        resolved_at: row
            .get::<_, Option<String>>("resolved_at")?
            .map(|s| parse_datetime(&s)),
    })
}

fn update_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UpdateEntry> {
    let type_raw: String = row.get("update_type")?;
    let update_type = match type_raw.as_str() {
        "status_change" => UpdateType::StatusChange,
        "admin_update" => UpdateType::AdminUpdate,
        "bulk_action" => UpdateType::BulkAction,
        _ => UpdateType::Custom(type_raw.clone()),
    };
    Ok(UpdateEntry {
        id: row.get("id")?,
        issue_id: row.get("issue_id")?,
        update_type,
        message: row.get("message")?,
        user_id: empty_to_none(row.get("user_id")?),
        created_at: parse_datetime(&row.get::<_, String>("created_at")?),
    })
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let role_raw: String = row.get("role")?;
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        role: parse_text_column(4, &role_raw)?,
        full_name: empty_to_none(row.get("full_name")?),
        phone: empty_to_none(row.get("phone")?),
        created_at: parse_datetime(&row.get::<_, String>("created_at")?),
        updated_at: parse_datetime(&row.get::<_, String>("updated_at")?),
    })
}

fn session_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Session> {
    Ok(Session {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        token: row.get("token")?,
        expires_at: parse_datetime(&row.get::<_, String>("expires_at")?),
        created_at: parse_datetime(&row.get::<_, String>("created_at")?),
    })
}

fn volunteer_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Volunteer> {
    let status_raw: String = row.get("status")?;
    Ok(Volunteer {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        phone: empty_to_none(row.get("phone")?),
        skills: empty_to_none(row.get("skills")?),
        location_preference: empty_to_none(row.get("location_preference")?),
        experience_level: empty_to_none(row.get("experience_level")?),
        availability: empty_to_none(row.get("availability")?),
        status: parse_text_column(8, &status_raw)?,
        joined_at: parse_datetime(&row.get::<_, String>("joined_at")?),
        updated_at: parse_datetime(&row.get::<_, String>("updated_at")?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use chrono::Duration as ChronoDuration;

    fn sample_issue(id: &str, created_at: DateTime<Utc>) -> Issue {
        Issue {
            id: id.to_string(),
            title: "Pothole on Main St".to_string(),
            description: "Large pothole near the intersection".to_string(),
            category: Category::Pothole,
            location: "Main St & 5th Ave".to_string(),
            latitude: None,
            longitude: None,
            reporter_name: "A. Citizen".to_string(),
            reporter_email: "citizen@example.com".to_string(),
            reporter_phone: None,
            photo_path: None,
            status: Status::Open,
            priority: "medium".to_string(),
            assigned_volunteer_id: None,
            admin_notes: None,
            updates: Vec::new(),
            created_at,
            updated_at: created_at,
            resolved_at: None,
        }
    }

    #[test]
    fn test_create_seeds_submission_entry() {
        let mut store = SqliteStorage::open_memory().unwrap();
        store.create_issue(&sample_issue("cv-a1", Utc::now())).unwrap();

        let issue = store.get_issue_with_updates("cv-a1").unwrap().unwrap();
        assert_eq!(issue.updates.len(), 1);
        assert_eq!(issue.updates[0].message, SUBMISSION_NOTE);
        assert_eq!(issue.updates[0].update_type, UpdateType::StatusChange);
        assert!(issue.updates[0].user_id.is_none());
    }

    #[test]
    fn test_resolve_stamps_resolved_at_once() {
        let mut store = SqliteStorage::open_memory().unwrap();
        store.create_issue(&sample_issue("cv-a1", Utc::now())).unwrap();

        let change = IssueChange {
            status: Some(Status::Resolved),
            ..IssueChange::default()
        };
        let resolved = store.apply_update("cv-a1", &change, Some("usr-1")).unwrap();
        let first_stamp = resolved.resolved_at.unwrap();

        // Reopen, then resolve again; the original stamp survives
        let reopen = IssueChange {
            status: Some(Status::Open),
            ..IssueChange::default()
        };
        let reopened = store.apply_update("cv-a1", &reopen, Some("usr-1")).unwrap();
        assert_eq!(reopened.resolved_at, Some(first_stamp));

        let resolved_again = store.apply_update("cv-a1", &change, Some("usr-1")).unwrap();
        assert_eq!(resolved_again.resolved_at, Some(first_stamp));
    }

    #[test]
    fn test_empty_change_refreshes_updated_at() {
        let mut store = SqliteStorage::open_memory().unwrap();
        let past = Utc::now() - ChronoDuration::hours(1);
        store.create_issue(&sample_issue("cv-a1", past)).unwrap();

        let issue = store
            .apply_update("cv-a1", &IssueChange::default(), None)
            .unwrap();
        assert!(issue.updated_at > past);
        // No field changed, so no audit entry beyond the submission one
        assert_eq!(store.list_updates("cv-a1").unwrap().len(), 1);
    }

    #[test]
    fn test_update_missing_issue() {
        let mut store = SqliteStorage::open_memory().unwrap();
        let err = store
            .apply_update("cv-nope", &IssueChange::default(), None)
            .unwrap_err();
        assert!(matches!(err, CivicError::IssueNotFound { .. }));
    }

    #[test]
    fn test_bulk_update_counts_matches_only() {
        let mut store = SqliteStorage::open_memory().unwrap();
        store.create_issue(&sample_issue("cv-a1", Utc::now())).unwrap();
        store.create_issue(&sample_issue("cv-a2", Utc::now())).unwrap();

        let ids = vec![
            "cv-a1".to_string(),
            "cv-missing".to_string(),
            "cv-a2".to_string(),
        ];
        let change = BulkChange {
            status: Some(Status::Resolved),
            ..BulkChange::default()
        };
        let affected = store
            .bulk_update(&ids, &change, "Marked as resolved via bulk action", Some("usr-1"))
            .unwrap();
        assert_eq!(affected, 2);

        let issue = store.get_issue_with_updates("cv-a1").unwrap().unwrap();
        assert_eq!(issue.status, Status::Resolved);
        assert!(issue.resolved_at.is_some());
        let bulk_entries: Vec<_> = issue
            .updates
            .iter()
            .filter(|u| u.update_type == UpdateType::BulkAction)
            .collect();
        assert_eq!(bulk_entries.len(), 1);
        assert_eq!(bulk_entries[0].user_id.as_deref(), Some("usr-1"));
    }

    #[test]
    fn test_delete_cascades_audit_log() {
        let mut store = SqliteStorage::open_memory().unwrap();
        let mut issue = sample_issue("cv-a1", Utc::now());
        issue.photo_path = Some("uploads/photo-1.jpg".to_string());
        store.create_issue(&issue).unwrap();

        let photo = store.delete_issue("cv-a1").unwrap();
        assert_eq!(photo.as_deref(), Some("uploads/photo-1.jpg"));
        assert!(store.get_issue("cv-a1").unwrap().is_none());
        assert!(store.list_updates("cv-a1").unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_user_rejected() {
        let mut store = SqliteStorage::open_memory().unwrap();
        let now = Utc::now();
        let user = User {
            id: "usr-1".to_string(),
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            role: crate::model::Role::Admin,
            full_name: None,
            phone: None,
            created_at: now,
            updated_at: now,
        };
        store.insert_user(&user).unwrap();

        let mut clash = user.clone();
        clash.id = "usr-2".to_string();
        clash.email = "other@example.com".to_string();
        let err = store.insert_user(&clash).unwrap_err();
        assert!(matches!(
            err,
            CivicError::DuplicateIdentity { ref field } if field == "username"
        ));
    }

    #[test]
    fn test_volunteer_roster_filtering() {
        let mut store = SqliteStorage::open_memory().unwrap();
        let now = Utc::now();
        for (id, name, status) in [
            ("vol-1", "Ada", VolunteerStatus::Active),
            ("vol-2", "Grace", VolunteerStatus::Inactive),
        ] {
            store
                .insert_volunteer(&Volunteer {
                    id: id.to_string(),
                    name: name.to_string(),
                    email: format!("{id}@example.com"),
                    phone: None,
                    skills: Some("plumbing".to_string()),
                    location_preference: None,
                    experience_level: None,
                    availability: None,
                    status,
                    joined_at: now,
                    updated_at: now,
                })
                .unwrap();
        }

        let active = store
            .list_volunteers(&VolunteerFilter {
                status: Some(VolunteerStatus::Active),
                search: None,
            })
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Ada");

        let flipped = store
            .set_volunteer_status("vol-2", VolunteerStatus::Active)
            .unwrap();
        assert_eq!(flipped.status, VolunteerStatus::Active);
    }
}

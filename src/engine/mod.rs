//! The civic issue engine.
//!
//! Ties storage, validation and the auth gate together into the
//! operations a front end calls: citizen submission and browsing, the
//! administrative update path, bulk actions, and the volunteer roster.
//! Citizen reads and submissions are open; everything that mutates an
//! existing issue passes through the auth gate.

mod photos;

pub use photos::{FsPhotoStore, NoopPhotoStore, PhotoStore};

use crate::auth::{AuthGate, Identity, LoginOutcome};
use crate::config::Config;
use crate::error::{CivicError, Result};
use crate::model::{Issue, Role, Status, User, Volunteer, VolunteerStatus};
use crate::query::{IssueFilter, IssuePage, Page};
use crate::storage::{BulkChange, IssueChange, SqliteStorage, VolunteerFilter};
use crate::util::id::{generate_id, ISSUE_PREFIX, USER_PREFIX, VOLUNTEER_PREFIX};
use crate::validation::{RegistrationValidator, ReportValidator, VolunteerValidator};
use chrono::Utc;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// A citizen-submitted issue report.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub location: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub reporter_name: String,
    pub reporter_email: String,
    #[serde(default)]
    pub reporter_phone: Option<String>,
    #[serde(default)]
    pub photo_path: Option<String>,
}

/// Raw listing parameters as they arrive from the outside.
///
/// Filter values are strings on purpose: "all" (any case) and blank mean
/// unfiltered, and limit/offset coercion is lenient.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListRequest {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub assigned: Option<bool>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub offset: Option<String>,
    /// Set for the admin listing; extends search to the reporter name.
    #[serde(default)]
    pub include_reporter_in_search: bool,
}

impl ListRequest {
    fn into_parts(self) -> (IssueFilter, Page) {
        // A status value that names no known status matches nothing; the
        // listing answers with an empty page rather than an error.
        let mut match_none = false;
        let status = match normalize_filter(self.status.as_deref()) {
            Some(raw) => match raw.parse::<Status>() {
                Ok(status) => Some(status),
                Err(_) => {
                    match_none = true;
                    None
                }
            },
            None => None,
        };
        let category = normalize_filter(self.category.as_deref())
            .map(|raw| raw.parse().unwrap_or_default());
        let priority = normalize_filter(self.priority.as_deref()).map(str::to_string);

        let filter = IssueFilter {
            status,
            category,
            priority,
            assigned: self.assigned,
            search: self.search,
            include_reporter_in_search: self.include_reporter_in_search,
            match_none,
        };
        let page = Page::from_raw(self.limit.as_deref(), self.offset.as_deref());
        (filter, page)
    }
}

/// Blank and the "all" sentinel both mean "no filter".
fn normalize_filter(raw: Option<&str>) -> Option<&str> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(trimmed)
    }
}

/// An administrative update to a single issue. `None` leaves a field
/// untouched; `assigned_volunteer_id: Some(None)` clears the assignment.
#[derive(Debug, Clone, Default)]
pub struct UpdateRequest {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assigned_volunteer_id: Option<Option<String>>,
    pub admin_notes: Option<String>,
}

/// The supported bulk actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    MarkResolved,
    MarkInProgress,
    SetHighPriority,
    Delete,
}

impl BulkAction {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MarkResolved => "mark_resolved",
            Self::MarkInProgress => "mark_in_progress",
            Self::SetHighPriority => "set_high_priority",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for BulkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BulkAction {
    type Err = CivicError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "mark_resolved" => Ok(Self::MarkResolved),
            "mark_in_progress" => Ok(Self::MarkInProgress),
            "set_high_priority" => Ok(Self::SetHighPriority),
            "delete" => Ok(Self::Delete),
            other => Err(CivicError::InvalidAction {
                action: other.to_string(),
            }),
        }
    }
}

/// A bulk action over a selection of issues.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkRequest {
    pub action: String,
    #[serde(default)]
    pub issue_ids: Vec<String>,
}

/// What a bulk action did.
#[derive(Debug, Clone, Copy)]
pub struct BulkOutcome {
    pub action: BulkAction,
    /// Issues actually touched; ids without a match are not counted.
    pub affected: u64,
}

/// A new administrative account.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// A volunteer signing up for the roster.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VolunteerRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub skills: Option<String>,
    #[serde(default)]
    pub location_preference: Option<String>,
    #[serde(default)]
    pub experience_level: Option<String>,
    #[serde(default)]
    pub availability: Option<String>,
}

/// The assembled engine.
pub struct Engine {
    storage: SqliteStorage,
    gate: AuthGate,
    photos: Box<dyn PhotoStore>,
}

impl Engine {
    /// Open the engine against the configured database, releasing photos
    /// under the configured upload directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open(config: &Config) -> Result<Self> {
        Ok(Self {
            storage: SqliteStorage::open(&config.db_path)?,
            gate: AuthGate::new(config),
            photos: Box::new(FsPhotoStore::new(config.upload_dir.clone())),
        })
    }

    /// In-memory engine with a no-op photo store. Used by tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema fails to apply.
    pub fn open_memory(config: &Config) -> Result<Self> {
        Ok(Self {
            storage: SqliteStorage::open_memory()?,
            gate: AuthGate::new(config),
            photos: Box::new(NoopPhotoStore),
        })
    }

    /// Swap the photo store. Used by tests exercising photo release.
    #[must_use]
    pub fn with_photo_store(mut self, photos: Box<dyn PhotoStore>) -> Self {
        self.photos = photos;
        self
    }

    // === Citizen operations ===

    /// Accept a citizen report.
    ///
    /// The new issue starts open with medium priority, and its audit log
    /// is seeded with an unattributed submission entry.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed input, or an error on
    /// storage failure.
    pub fn submit_report(&mut self, req: ReportRequest) -> Result<Issue> {
        ReportValidator::validate(&req).map_err(CivicError::from_validation_errors)?;

        let now = Utc::now();
        let storage = &self.storage;
        let id = generate_id(
            ISSUE_PREFIX,
            &[req.title.trim(), req.reporter_email.trim()],
            now,
            |candidate| storage.issue_id_exists(candidate).unwrap_or(false),
        );

        let issue = Issue {
            id,
            title: req.title.trim().to_string(),
            description: req.description.trim().to_string(),
            category: req.category.parse().unwrap_or_default(),
            location: req.location.trim().to_string(),
            latitude: req.latitude,
            longitude: req.longitude,
            reporter_name: req.reporter_name.trim().to_string(),
            reporter_email: req.reporter_email.trim().to_string(),
            reporter_phone: none_if_blank(req.reporter_phone),
            photo_path: none_if_blank(req.photo_path),
            status: Status::Open,
            priority: "medium".to_string(),
            assigned_volunteer_id: None,
            admin_notes: None,
            updates: Vec::new(),
            created_at: now,
            updated_at: now,
            resolved_at: None,
        };
        self.storage.create_issue(&issue)?;
        info!(issue_id = %issue.id, category = %issue.category, "report accepted");
        self.get_issue(&issue.id)
    }

    /// Fetch one issue with its full audit log.
    ///
    /// # Errors
    ///
    /// Returns [`CivicError::IssueNotFound`] if no issue has this id, or
    /// an error on storage failure.
    pub fn get_issue(&self, id: &str) -> Result<Issue> {
        self.storage
            .get_issue_with_updates(id)?
            .ok_or_else(|| CivicError::IssueNotFound { id: id.to_string() })
    }

    /// List issues newest first with pagination metadata.
    ///
    /// Filter inputs are lenient: an unrecognized status filter matches
    /// nothing instead of failing the request.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn list_issues(&self, req: ListRequest) -> Result<IssuePage> {
        let (filter, page) = req.into_parts();
        self.storage.list_issues(&filter, page)
    }

    // === Administrative operations ===

    /// Apply an administrative update to one issue.
    ///
    /// # Errors
    ///
    /// Returns an auth error if the token does not resolve to an
    /// administrative identity, [`CivicError::IssueNotFound`] for an
    /// unknown id, [`CivicError::InvalidStatus`] for a bad status value,
    /// or an error on storage failure.
    pub fn update_issue(
        &mut self,
        token: Option<&str>,
        id: &str,
        req: &UpdateRequest,
    ) -> Result<Issue> {
        let identity = self.gate.authenticate(&self.storage, token)?;
        self.gate.authorize(&identity, Role::ADMINISTRATIVE)?;

        let change = IssueChange {
            status: match req.status.as_deref() {
                Some(raw) => Some(raw.parse::<Status>()?),
                None => None,
            },
            priority: req.priority.clone(),
            assigned_volunteer_id: req.assigned_volunteer_id.clone(),
            admin_notes: req.admin_notes.clone(),
        };
        let issue = self
            .storage
            .apply_update(id, &change, Some(&identity.user_id))?;
        info!(issue_id = id, actor = %identity.user_id, "issue updated");
        Ok(issue)
    }

    /// Delete one issue and release its photo.
    ///
    /// # Errors
    ///
    /// Returns an auth error for a bad token, [`CivicError::IssueNotFound`]
    /// for an unknown id, or an error on storage failure.
    pub fn delete_issue(&mut self, token: Option<&str>, id: &str) -> Result<()> {
        let identity = self.gate.authenticate(&self.storage, token)?;
        self.gate.authorize(&identity, Role::ADMINISTRATIVE)?;

        let photo = self.storage.delete_issue(id)?;
        if let Some(ref reference) = photo {
            self.photos.release(reference);
        }
        info!(issue_id = id, actor = %identity.user_id, "issue deleted");
        Ok(())
    }

    /// Apply a bulk action to a selection of issues.
    ///
    /// The whole batch commits or rolls back together. Ids without a
    /// matching issue are skipped and excluded from the affected count.
    ///
    /// # Errors
    ///
    /// Returns an auth error for a bad token,
    /// [`CivicError::InvalidAction`] for an unknown action,
    /// [`CivicError::EmptySelection`] for an empty id list, or an error
    /// on storage failure.
    pub fn apply_bulk(&mut self, token: Option<&str>, req: &BulkRequest) -> Result<BulkOutcome> {
        let identity = self.gate.authenticate(&self.storage, token)?;
        self.gate.authorize(&identity, Role::ADMINISTRATIVE)?;

        let action: BulkAction = req.action.parse()?;
        if req.issue_ids.is_empty() {
            return Err(CivicError::EmptySelection);
        }

        let actor = Some(identity.user_id.as_str());
        let affected = match action {
            BulkAction::MarkResolved => self.storage.bulk_update(
                &req.issue_ids,
                &BulkChange {
                    status: Some(Status::Resolved),
                    priority: None,
                },
                "Marked as resolved via bulk action",
                actor,
            )?,
            BulkAction::MarkInProgress => self.storage.bulk_update(
                &req.issue_ids,
                &BulkChange {
                    status: Some(Status::InProgress),
                    priority: None,
                },
                "Marked as in progress via bulk action",
                actor,
            )?,
            BulkAction::SetHighPriority => self.storage.bulk_update(
                &req.issue_ids,
                &BulkChange {
                    status: None,
                    priority: Some("high".to_string()),
                },
                "Priority set to high via bulk action",
                actor,
            )?,
            BulkAction::Delete => {
                let (count, photos) = self.storage.bulk_delete(&req.issue_ids, actor)?;
                for reference in &photos {
                    self.photos.release(reference);
                }
                count
            }
        };
        info!(
            action = %action,
            requested = req.issue_ids.len(),
            affected,
            actor = %identity.user_id,
            "bulk action applied"
        );
        Ok(BulkOutcome { action, affected })
    }

    // === Accounts and sessions ===

    /// Create an account.
    ///
    /// The role defaults to citizen when absent.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed input,
    /// [`CivicError::InvalidRole`] for an unknown role,
    /// [`CivicError::DuplicateIdentity`] for a username or email clash,
    /// or an error on storage failure.
    pub fn register_user(&mut self, req: RegistrationRequest) -> Result<User> {
        RegistrationValidator::validate(&req).map_err(CivicError::from_validation_errors)?;
        let role = match req.role.as_deref() {
            Some(raw) => raw.parse::<Role>()?,
            None => Role::Citizen,
        };

        let now = Utc::now();
        let id = generate_id(
            USER_PREFIX,
            &[req.username.trim(), req.email.trim()],
            now,
            |_| false,
        );
        let user = User {
            id,
            username: req.username.trim().to_string(),
            email: req.email.trim().to_string(),
            password_hash: crate::auth::hash_password(&req.password)?,
            role,
            full_name: none_if_blank(req.full_name),
            phone: none_if_blank(req.phone),
            created_at: now,
            updated_at: now,
        };
        self.storage.insert_user(&user)?;
        info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(user)
    }

    /// Verify credentials and issue a session token.
    ///
    /// When `role` is given the account must hold exactly that role;
    /// a mismatch is indistinguishable from a wrong password.
    ///
    /// # Errors
    ///
    /// Returns [`CivicError::InvalidCredentials`] on a failed match,
    /// [`CivicError::InvalidRole`] for an unparseable role, or an error on
    /// storage failure.
    pub fn login(
        &mut self,
        username: &str,
        password: &str,
        role: Option<&str>,
    ) -> Result<LoginOutcome> {
        let role = match role {
            Some(raw) => Some(raw.parse::<Role>()?),
            None => None,
        };
        self.gate.login(&mut self.storage, username, password, role)
    }

    /// Revoke a session token. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn logout(&mut self, token: &str) -> Result<bool> {
        self.gate.logout(&mut self.storage, token)
    }

    /// Resolve a token to its identity.
    ///
    /// # Errors
    ///
    /// Returns an auth error if the token is missing, invalid, expired or
    /// revoked.
    pub fn current_user(&self, token: Option<&str>) -> Result<Identity> {
        self.gate.authenticate(&self.storage, token)
    }

    /// Change the caller's own password.
    ///
    /// # Errors
    ///
    /// Returns an auth error for a bad token or wrong current password, a
    /// validation error for a weak replacement, or an error on storage
    /// failure.
    pub fn change_password(
        &mut self,
        token: Option<&str>,
        current: &str,
        replacement: &str,
    ) -> Result<()> {
        let identity = self.gate.authenticate(&self.storage, token)?;
        self.gate
            .change_password(&mut self.storage, &identity.user_id, current, replacement)
    }

    // === Volunteer roster ===

    /// Add a volunteer to the roster, active by default.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed input, or an error on
    /// storage failure.
    pub fn register_volunteer(&mut self, req: VolunteerRequest) -> Result<Volunteer> {
        VolunteerValidator::validate(&req).map_err(CivicError::from_validation_errors)?;

        let now = Utc::now();
        let id = generate_id(
            VOLUNTEER_PREFIX,
            &[req.name.trim(), req.email.trim()],
            now,
            |_| false,
        );
        let volunteer = Volunteer {
            id,
            name: req.name.trim().to_string(),
            email: req.email.trim().to_string(),
            phone: none_if_blank(req.phone),
            skills: none_if_blank(req.skills),
            location_preference: none_if_blank(req.location_preference),
            experience_level: none_if_blank(req.experience_level),
            availability: none_if_blank(req.availability),
            status: VolunteerStatus::Active,
            joined_at: now,
            updated_at: now,
        };
        self.storage.insert_volunteer(&volunteer)?;
        info!(volunteer_id = %volunteer.id, "volunteer registered");
        Ok(volunteer)
    }

    /// Fetch one volunteer.
    ///
    /// # Errors
    ///
    /// Returns [`CivicError::VolunteerNotFound`] for an unknown id, or an
    /// error on storage failure.
    pub fn get_volunteer(&self, id: &str) -> Result<Volunteer> {
        self.storage
            .get_volunteer(id)?
            .ok_or_else(|| CivicError::VolunteerNotFound { id: id.to_string() })
    }

    /// List the roster, newest joiner first. Accepts the "all" sentinel
    /// for the status filter.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an unknown status filter, or an
    /// error on storage failure.
    pub fn list_volunteers(
        &self,
        status: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<Volunteer>> {
        let status = match normalize_filter(status) {
            Some(raw) => Some(raw.parse::<VolunteerStatus>()?),
            None => None,
        };
        self.storage.list_volunteers(&VolunteerFilter {
            status,
            search: search.map(str::to_string),
        })
    }

    /// Flip a volunteer between active and inactive.
    ///
    /// # Errors
    ///
    /// Returns an auth error for a bad token, a validation error for an
    /// unknown status, [`CivicError::VolunteerNotFound`] for an unknown
    /// id, or an error on storage failure.
    pub fn set_volunteer_status(
        &mut self,
        token: Option<&str>,
        id: &str,
        status: &str,
    ) -> Result<Volunteer> {
        let identity = self.gate.authenticate(&self.storage, token)?;
        self.gate.authorize(&identity, Role::ADMINISTRATIVE)?;
        let status = status.parse::<VolunteerStatus>()?;
        self.storage.set_volunteer_status(id, status)
    }
}

fn none_if_blank(value: Option<String>) -> Option<String> {
    value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;

    fn engine() -> Engine {
        let config = Config {
            token_secret: "test-secret".to_string(),
            ..Config::default()
        };
        Engine::open_memory(&config).unwrap()
    }

    fn sample_report(title: &str) -> ReportRequest {
        ReportRequest {
            title: title.to_string(),
            description: "Something is broken".to_string(),
            category: "pothole".to_string(),
            location: "Main St".to_string(),
            reporter_name: "A. Citizen".to_string(),
            reporter_email: "citizen@example.com".to_string(),
            ..ReportRequest::default()
        }
    }

    fn admin_token(engine: &mut Engine) -> String {
        engine
            .register_user(RegistrationRequest {
                username: "admin".to_string(),
                email: "admin@example.com".to_string(),
                password: "correct horse".to_string(),
                role: Some("admin".to_string()),
                ..RegistrationRequest::default()
            })
            .unwrap();
        engine
            .login("admin", "correct horse", Some("admin"))
            .unwrap()
            .token
    }

    #[test]
    fn test_submit_report_defaults() {
        let mut engine = engine();
        let issue = engine.submit_report(sample_report("Pothole")).unwrap();
        assert_eq!(issue.status, Status::Open);
        assert_eq!(issue.priority, "medium");
        assert_eq!(issue.category, Category::Pothole);
        assert_eq!(issue.updates.len(), 1);
        assert!(issue.id.starts_with("cv-"));
    }

    #[test]
    fn test_submit_report_rejects_invalid() {
        let mut engine = engine();
        let mut report = sample_report("");
        report.reporter_email = "bogus".to_string();
        let err = engine.submit_report(report).unwrap_err();
        assert!(matches!(err, CivicError::ValidationErrors { .. }));
    }

    #[test]
    fn test_list_all_sentinel_and_bad_status() {
        let mut engine = engine();
        engine.submit_report(sample_report("One")).unwrap();

        let page = engine
            .list_issues(ListRequest {
                status: Some("All".to_string()),
                ..ListRequest::default()
            })
            .unwrap();
        assert_eq!(page.pagination.total, 1);

        // Unknown statuses match nothing rather than failing the read
        let page = engine
            .list_issues(ListRequest {
                status: Some("done".to_string()),
                ..ListRequest::default()
            })
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.total, 0);
        assert!(!page.pagination.has_more);
    }

    #[test]
    fn test_update_requires_admin_token() {
        let mut engine = engine();
        let issue = engine.submit_report(sample_report("One")).unwrap();

        let err = engine
            .update_issue(None, &issue.id, &UpdateRequest::default())
            .unwrap_err();
        assert!(matches!(err, CivicError::MissingToken));

        let token = admin_token(&mut engine);
        let updated = engine
            .update_issue(
                Some(&token),
                &issue.id,
                &UpdateRequest {
                    status: Some("Resolved".to_string()),
                    ..UpdateRequest::default()
                },
            )
            .unwrap();
        assert_eq!(updated.status, Status::Resolved);
        assert!(updated.resolved_at.is_some());
    }

    #[test]
    fn test_citizen_cannot_update() {
        let mut engine = engine();
        let issue = engine.submit_report(sample_report("One")).unwrap();
        engine
            .register_user(RegistrationRequest {
                username: "pat".to_string(),
                email: "pat@example.com".to_string(),
                password: "long enough".to_string(),
                ..RegistrationRequest::default()
            })
            .unwrap();
        let token = engine.login("pat", "long enough", None).unwrap().token;

        let err = engine
            .update_issue(Some(&token), &issue.id, &UpdateRequest::default())
            .unwrap_err();
        assert!(matches!(err, CivicError::Forbidden { .. }));
    }

    #[test]
    fn test_bulk_flow() {
        let mut engine = engine();
        let a = engine.submit_report(sample_report("One")).unwrap();
        let b = engine.submit_report(sample_report("Two")).unwrap();
        let token = admin_token(&mut engine);

        let outcome = engine
            .apply_bulk(
                Some(&token),
                &BulkRequest {
                    action: "mark_resolved".to_string(),
                    issue_ids: vec![a.id.clone(), "cv-missing".to_string(), b.id.clone()],
                },
            )
            .unwrap();
        assert_eq!(outcome.affected, 2);

        let err = engine
            .apply_bulk(
                Some(&token),
                &BulkRequest {
                    action: "mark_resolved".to_string(),
                    issue_ids: Vec::new(),
                },
            )
            .unwrap_err();
        assert!(matches!(err, CivicError::EmptySelection));

        let err = engine
            .apply_bulk(
                Some(&token),
                &BulkRequest {
                    action: "explode".to_string(),
                    issue_ids: vec![a.id],
                },
            )
            .unwrap_err();
        assert!(matches!(err, CivicError::InvalidAction { .. }));
    }

    #[test]
    fn test_volunteer_roster() {
        let mut engine = engine();
        let volunteer = engine
            .register_volunteer(VolunteerRequest {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                skills: Some("plumbing".to_string()),
                ..VolunteerRequest::default()
            })
            .unwrap();
        assert_eq!(volunteer.status, VolunteerStatus::Active);

        let token = admin_token(&mut engine);
        let flipped = engine
            .set_volunteer_status(Some(&token), &volunteer.id, "inactive")
            .unwrap();
        assert_eq!(flipped.status, VolunteerStatus::Inactive);

        let active = engine.list_volunteers(Some("active"), None).unwrap();
        assert!(active.is_empty());
        let all = engine.list_volunteers(Some("all"), None).unwrap();
        assert_eq!(all.len(), 1);
    }
}

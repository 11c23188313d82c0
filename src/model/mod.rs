//! Core data types for `civitrack`.
//!
//! This module defines the fundamental types used throughout the engine:
//! - `Issue` - A reported civic problem
//! - `Status` - Issue lifecycle states
//! - `Category` - Kinds of civic problems
//! - `UpdateEntry` - Audit log entries attached to an issue
//! - `User` / `Role` - Administrative identities
//! - `Session` - A revocable proof of authentication
//! - `Volunteer` - Roster entries available for assignment

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Issue lifecycle status.
///
/// The source data mixed "Open" with lowercase alternatives; statuses are
/// canonical lowercase in storage and parsed case-insensitively everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Open,
    InProgress,
    Resolved,
}

impl Status {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Status {
    type Err = crate::error::CivicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "in_progress" | "inprogress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            other => Err(crate::error::CivicError::InvalidStatus {
                status: other.to_string(),
            }),
        }
    }
}

/// Civic issue category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Pothole,
    Streetlight,
    WaterSupply,
    Garbage,
    PublicTransport,
    #[default]
    Other,
    #[serde(untagged)]
    Custom(String),
}

impl Category {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pothole => "pothole",
            Self::Streetlight => "streetlight",
            Self::WaterSupply => "water_supply",
            Self::Garbage => "garbage",
            Self::PublicTransport => "public_transport",
            Self::Other => "other",
            Self::Custom(value) => value,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = crate::error::CivicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pothole" => Ok(Self::Pothole),
            "streetlight" => Ok(Self::Streetlight),
            "water_supply" => Ok(Self::WaterSupply),
            "garbage" => Ok(Self::Garbage),
            "public_transport" => Ok(Self::PublicTransport),
            "other" => Ok(Self::Other),
            other => Ok(Self::Custom(other.to_string())),
        }
    }
}

/// User role for authorization decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Council,
    #[default]
    Citizen,
}

impl Role {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Council => "council",
            Self::Citizen => "citizen",
        }
    }

    /// Roles allowed through the admin gate.
    pub const ADMINISTRATIVE: &'static [Self] = &[Self::Admin, Self::Council];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = crate::error::CivicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "council" => Ok(Self::Council),
            "citizen" => Ok(Self::Citizen),
            other => Err(crate::error::CivicError::InvalidRole {
                role: other.to_string(),
            }),
        }
    }
}

/// Audit entry type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UpdateType {
    StatusChange,
    AdminUpdate,
    BulkAction,
    Custom(String),
}

impl UpdateType {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::StatusChange => "status_change",
            Self::AdminUpdate => "admin_update",
            Self::BulkAction => "bulk_action",
            Self::Custom(value) => value,
        }
    }
}

impl Serialize for UpdateType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for UpdateType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        let update_type = match value.as_str() {
            "status_change" => Self::StatusChange,
            "admin_update" => Self::AdminUpdate,
            "bulk_action" => Self::BulkAction,
            _ => Self::Custom(value),
        };
        Ok(update_type)
    }
}

/// One immutable audit record in an issue's history.
///
/// Entries are appended inside the mutation transaction and never edited
/// or removed; they are deleted only together with their issue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateEntry {
    pub id: i64,
    pub issue_id: String,
    pub update_type: UpdateType,
    pub message: String,
    /// Acting user, absent for anonymous citizen submissions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The primary issue entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Issue {
    /// Unique ID (e.g., "cv-abc123def456").
    pub id: String,

    /// Title (1-500 chars).
    pub title: String,

    /// Detailed description of the problem.
    pub description: String,

    /// Problem category.
    #[serde(default)]
    pub category: Category,

    /// Free-text location description.
    pub location: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    /// Reporter contact details. Reporting is anonymous in the sense that
    /// no account is required; a name and email are still collected.
    pub reporter_name: String,
    pub reporter_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter_phone: Option<String>,

    /// Opaque reference to an uploaded photo (path/URL); the engine never
    /// inspects the bytes behind it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_path: Option<String>,

    /// Workflow status.
    #[serde(default)]
    pub status: Status,

    /// Free-form priority, defaults to "medium".
    #[serde(default = "default_priority")]
    pub priority: String,

    /// Assigned volunteer, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_volunteer_id: Option<String>,

    /// Notes visible to administrators only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,

    /// Ordered append-only audit log. Loaded with the issue on single
    /// fetch; left empty in listings.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub updates: Vec<UpdateEntry>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Set the first time status transitions into resolved; never cleared
    /// afterwards, even if the issue is reopened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

pub(crate) fn default_priority() -> String {
    "medium".to_string()
}

impl Issue {
    /// True if this issue has ever been resolved.
    #[must_use]
    pub const fn ever_resolved(&self) -> bool {
        self.resolved_at.is_some()
    }
}

/// An administrative identity record.
///
/// The secret is stored only as an argon2id hash; the plaintext never
/// touches the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An ephemeral credential row.
///
/// Valid iff `now < expires_at` AND the row still exists: logout deletes
/// the row, so tokens are revocable ahead of their natural expiry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub id: i64,
    /// Weak reference to the user; deleting a user does not cascade here.
    pub user_id: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Expiry check against a supplied clock value.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Volunteer roster status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VolunteerStatus {
    #[default]
    Active,
    Inactive,
}

impl VolunteerStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for VolunteerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VolunteerStatus {
    type Err = crate::error::CivicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(crate::error::CivicError::validation(
                "status",
                format!("unknown volunteer status '{other}'"),
            )),
        }
    }
}

/// A volunteer roster entry. Independent lifecycle from issues; referenced
/// only through `Issue::assigned_volunteer_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Volunteer {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_preference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
    #[serde(default)]
    pub status: VolunteerStatus,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!("Open".parse::<Status>().unwrap(), Status::Open);
        assert_eq!("OPEN".parse::<Status>().unwrap(), Status::Open);
        assert_eq!("In_Progress".parse::<Status>().unwrap(), Status::InProgress);
        assert_eq!("Resolved".parse::<Status>().unwrap(), Status::Resolved);
        assert!("done".parse::<Status>().is_err());
    }

    #[test]
    fn status_serializes_canonical_lowercase() {
        assert_eq!(
            serde_json::to_string(&Status::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(serde_json::to_string(&Status::Open).unwrap(), "\"open\"");
    }

    #[test]
    fn category_custom_roundtrip() {
        let cat: Category = "graffiti".parse().unwrap();
        assert_eq!(cat, Category::Custom("graffiti".to_string()));
        let serialized = serde_json::to_string(&cat).unwrap();
        assert_eq!(serialized, "\"graffiti\"");
    }

    #[test]
    fn role_parse_is_strict() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("Council".parse::<Role>().unwrap(), Role::Council);
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn update_type_serialization() {
        let t = UpdateType::BulkAction;
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"bulk_action\"");

        let t: UpdateType = serde_json::from_str("\"imported\"").unwrap();
        assert_eq!(t, UpdateType::Custom("imported".to_string()));
    }

    #[test]
    fn session_expiry_check() {
        let session = Session {
            id: 1,
            user_id: "usr-abc".to_string(),
            token: "tok".to_string(),
            expires_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            created_at: Utc.timestamp_opt(1_699_000_000, 0).unwrap(),
        };
        assert!(!session.is_expired_at(Utc.timestamp_opt(1_699_999_999, 0).unwrap()));
        assert!(session.is_expired_at(Utc.timestamp_opt(1_700_000_000, 0).unwrap()));
    }

    #[test]
    fn issue_deserialize_defaults_missing_fields() {
        let json = r#"{
            "id": "cv-123",
            "title": "Broken streetlight",
            "description": "Dark at night",
            "location": "5th and Main",
            "reporter_name": "A. Citizen",
            "reporter_email": "a@example.com",
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z"
        }"#;
        let issue: Issue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.status, Status::Open);
        assert_eq!(issue.priority, "medium");
        assert_eq!(issue.category, Category::Other);
        assert!(issue.resolved_at.is_none());
        assert!(issue.updates.is_empty());
    }
}

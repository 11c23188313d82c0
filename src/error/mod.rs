//! Error types and handling for `civitrack`.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Supports `anyhow` integration at the binary boundary
//! - Provides structured output with stable error codes so the HTTP
//!   layer can map failures without string matching

mod structured;

pub use structured::{ErrorCode, StructuredError};

use thiserror::Error;

/// Primary error type for `civitrack` operations.
#[derive(Error, Debug)]
pub enum CivicError {
    // === Storage Errors ===
    /// `SQLite` database error. Surfaced to callers as `STORE_UNAVAILABLE`.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    // === Entity Errors ===
    /// Issue with the specified ID was not found.
    #[error("Issue not found: {id}")]
    IssueNotFound { id: String },

    /// User with the specified ID was not found.
    #[error("User not found: {id}")]
    UserNotFound { id: String },

    /// Volunteer with the specified ID was not found.
    #[error("Volunteer not found: {id}")]
    VolunteerNotFound { id: String },

    /// Username or email already registered.
    #[error("Duplicate identity: {field} already exists")]
    DuplicateIdentity { field: String },

    // === Auth Errors ===
    /// Username/password/role combination did not match.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No bearer token was presented on a protected operation.
    #[error("Access token required")]
    MissingToken,

    /// Token failed structural or signature validation.
    #[error("Invalid token")]
    InvalidToken,

    /// Token decoded but the session is expired or revoked.
    #[error("Session expired or invalid")]
    SessionExpired,

    /// Caller authenticated but lacks a required role.
    #[error("Access requires one of: {required}")]
    Forbidden { required: String },

    // === Validation Errors ===
    /// Field validation failed.
    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Multiple validation errors occurred.
    #[error("Validation errors: {errors:?}")]
    ValidationErrors { errors: Vec<ValidationError> },

    /// Invalid status value.
    #[error("Invalid status: {status}")]
    InvalidStatus { status: String },

    /// Invalid role value.
    #[error("Invalid role: {role}")]
    InvalidRole { role: String },

    // === Bulk Errors ===
    /// Bulk action name is not recognized.
    #[error("Invalid bulk action: {action}")]
    InvalidAction { action: String },

    /// Bulk operation was given no issue ids.
    #[error("Bulk action requires at least one issue id")]
    EmptySelection,

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Wrapped errors ===
    /// Wrapped anyhow error for the binary boundary.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A single field validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// The reason for the validation failure.
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

impl CivicError {
    /// Can the caller fix this by changing the request?
    #[must_use]
    pub const fn is_caller_fixable(&self) -> bool {
        matches!(
            self,
            Self::IssueNotFound { .. }
                | Self::UserNotFound { .. }
                | Self::VolunteerNotFound { .. }
                | Self::DuplicateIdentity { .. }
                | Self::Validation { .. }
                | Self::ValidationErrors { .. }
                | Self::InvalidStatus { .. }
                | Self::InvalidRole { .. }
                | Self::InvalidAction { .. }
                | Self::EmptySelection
        )
    }

    /// Create a validation error for a specific field.
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create from multiple validation errors.
    #[must_use]
    pub fn from_validation_errors(errors: Vec<ValidationError>) -> Self {
        if errors.len() == 1 {
            let err = &errors[0];
            Self::Validation {
                field: err.field.clone(),
                reason: err.message.clone(),
            }
        } else {
            Self::ValidationErrors { errors }
        }
    }
}

/// Result type using `CivicError`.
pub type Result<T> = std::result::Result<T, CivicError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CivicError::IssueNotFound {
            id: "cv-abc123".to_string(),
        };
        assert_eq!(err.to_string(), "Issue not found: cv-abc123");
    }

    #[test]
    fn test_validation_error() {
        let err = CivicError::validation("title", "cannot be empty");
        assert_eq!(err.to_string(), "Validation failed: title: cannot be empty");
    }

    #[test]
    fn test_caller_fixable() {
        assert!(CivicError::EmptySelection.is_caller_fixable());
        assert!(CivicError::DuplicateIdentity {
            field: "email".to_string()
        }
        .is_caller_fixable());

        let db_err = CivicError::Database(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(1),
            None,
        ));
        assert!(!db_err.is_caller_fixable());
    }

    #[test]
    fn test_single_validation_error_collapses() {
        let err = CivicError::from_validation_errors(vec![ValidationError::new(
            "email",
            "cannot be empty",
        )]);
        assert!(matches!(err, CivicError::Validation { .. }));
    }
}

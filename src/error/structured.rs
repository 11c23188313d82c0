//! Structured error output for the transport layer.
//!
//! Every failure maps to a stable machine-readable code plus a
//! human-readable message, so the HTTP shell (and any other consumer)
//! can branch on `code` and pick a status without parsing strings.

use crate::error::CivicError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Machine-readable error codes.
///
/// These codes are stable and can be used for programmatic error handling.
/// Format: `SCREAMING_SNAKE_CASE` for easy parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // === Auth ===
    /// No bearer token presented
    MissingToken,
    /// Token failed decode or signature check
    InvalidToken,
    /// Session revoked or past expiry
    SessionExpired,
    /// Authenticated but insufficient role
    Forbidden,
    /// Login or password check failed
    InvalidCredentials,
    /// Username or email already taken
    DuplicateIdentity,

    // === Entities ===
    /// Issue, user or volunteer not found
    NotFound,

    // === Validation ===
    /// Field validation failed
    ValidationFailed,
    /// Invalid status value
    InvalidStatus,
    /// Invalid role value
    InvalidRole,
    /// Unknown bulk action
    InvalidAction,
    /// Bulk action with no ids
    EmptySelection,

    // === Infrastructure ===
    /// Underlying store failed; caller may retry
    StoreUnavailable,
    /// Unexpected internal error
    InternalError,
}

impl ErrorCode {
    /// Get the string representation for JSON output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MissingToken => "MISSING_TOKEN",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::SessionExpired => "SESSION_EXPIRED",
            Self::Forbidden => "FORBIDDEN",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::DuplicateIdentity => "DUPLICATE_IDENTITY",
            Self::NotFound => "NOT_FOUND",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::InvalidStatus => "INVALID_STATUS",
            Self::InvalidRole => "INVALID_ROLE",
            Self::InvalidAction => "INVALID_ACTION",
            Self::EmptySelection => "EMPTY_SELECTION",
            Self::StoreUnavailable => "STORE_UNAVAILABLE",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Whether retrying the same request might succeed.
    ///
    /// `StoreUnavailable` may clear on its own; the validation family
    /// succeeds once the caller fixes the input.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable
                | Self::ValidationFailed
                | Self::InvalidStatus
                | Self::InvalidRole
                | Self::InvalidAction
                | Self::EmptySelection
        )
    }

    /// HTTP status code the transport layer should use for this error.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::MissingToken | Self::InvalidToken | Self::SessionExpired
            | Self::InvalidCredentials => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::DuplicateIdentity => 409,
            Self::ValidationFailed
            | Self::InvalidStatus
            | Self::InvalidRole
            | Self::InvalidAction
            | Self::EmptySelection => 400,
            Self::StoreUnavailable => 503,
            Self::InternalError => 500,
        }
    }
}

/// Structured error for machine-parseable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Machine-readable error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional hint for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether the operation can be retried
    pub retryable: bool,
    /// Additional context data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl StructuredError {
    /// Create a new structured error from a `CivicError`.
    #[must_use]
    pub fn from_error(err: &CivicError) -> Self {
        let (code, context) = Self::extract_code_and_context(err);
        let hint = Self::generate_hint(err);

        Self {
            code,
            message: err.to_string(),
            hint,
            retryable: code.is_retryable(),
            context,
        }
    }

    /// Serialize to JSON value.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "error": {
                "code": self.code.as_str(),
                "message": self.message,
                "hint": self.hint,
                "retryable": self.retryable,
                "context": self.context,
            }
        })
    }

    fn extract_code_and_context(err: &CivicError) -> (ErrorCode, Option<Value>) {
        match err {
            CivicError::Database(_) => (ErrorCode::StoreUnavailable, None),
            CivicError::Io(_) => (ErrorCode::StoreUnavailable, None),
            CivicError::IssueNotFound { id } => {
                (ErrorCode::NotFound, Some(json!({"issue_id": id})))
            }
            CivicError::UserNotFound { id } => (ErrorCode::NotFound, Some(json!({"user_id": id}))),
            CivicError::VolunteerNotFound { id } => {
                (ErrorCode::NotFound, Some(json!({"volunteer_id": id})))
            }
            CivicError::DuplicateIdentity { field } => {
                (ErrorCode::DuplicateIdentity, Some(json!({"field": field})))
            }
            CivicError::InvalidCredentials => (ErrorCode::InvalidCredentials, None),
            CivicError::MissingToken => (ErrorCode::MissingToken, None),
            CivicError::InvalidToken => (ErrorCode::InvalidToken, None),
            CivicError::SessionExpired => (ErrorCode::SessionExpired, None),
            CivicError::Forbidden { required } => {
                (ErrorCode::Forbidden, Some(json!({"required_roles": required})))
            }
            CivicError::Validation { field, reason } => (
                ErrorCode::ValidationFailed,
                Some(json!({"field": field, "reason": reason})),
            ),
            CivicError::ValidationErrors { errors } => (
                ErrorCode::ValidationFailed,
                Some(json!({
                    "errors": errors.iter()
                        .map(|e| json!({"field": e.field, "message": e.message}))
                        .collect::<Vec<_>>()
                })),
            ),
            CivicError::InvalidStatus { status } => {
                (ErrorCode::InvalidStatus, Some(json!({"status": status})))
            }
            CivicError::InvalidRole { role } => {
                (ErrorCode::InvalidRole, Some(json!({"role": role})))
            }
            CivicError::InvalidAction { action } => {
                (ErrorCode::InvalidAction, Some(json!({"action": action})))
            }
            CivicError::EmptySelection => (ErrorCode::EmptySelection, None),
            CivicError::Json(_) | CivicError::Other(_) => (ErrorCode::InternalError, None),
        }
    }

    fn generate_hint(err: &CivicError) -> Option<String> {
        match err {
            CivicError::InvalidStatus { .. } => {
                Some("Valid statuses: open, in_progress, resolved".to_string())
            }
            CivicError::InvalidRole { .. } => {
                Some("Valid roles: admin, council, citizen".to_string())
            }
            CivicError::InvalidAction { .. } => Some(
                "Valid actions: mark_resolved, mark_in_progress, set_high_priority, delete"
                    .to_string(),
            ),
            CivicError::MissingToken => {
                Some("Send the session token as 'Authorization: Bearer <token>'".to_string())
            }
            CivicError::SessionExpired => Some("Log in again to obtain a new session".to_string()),
            CivicError::DuplicateIdentity { field } => {
                Some(format!("Choose a different {field}"))
            }
            _ => None,
        }
    }
}

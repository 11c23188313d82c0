//! Boundary validation for `civitrack`.
//!
//! These routines reject malformed input before it reaches the transition
//! engine or storage, returning structured validation errors without
//! mutating anything.

use crate::engine::{RegistrationRequest, ReportRequest, VolunteerRequest};
use crate::error::ValidationError;

/// Maximum title length in characters.
const MAX_TITLE_LEN: usize = 500;
/// Maximum description length in bytes.
const MAX_DESCRIPTION_LEN: usize = 102_400;

/// Validates citizen issue reports.
pub struct ReportValidator;

impl ReportValidator {
    /// Validate a report and return all validation errors found.
    ///
    /// # Errors
    ///
    /// Returns a `Vec<ValidationError>` if any validation rules are violated.
    pub fn validate(report: &ReportRequest) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if report.title.trim().is_empty() {
            errors.push(ValidationError::new("title", "cannot be empty"));
        }
        if report.title.len() > MAX_TITLE_LEN {
            errors.push(ValidationError::new("title", "exceeds 500 characters"));
        }

        if report.description.trim().is_empty() {
            errors.push(ValidationError::new("description", "cannot be empty"));
        }
        if report.description.len() > MAX_DESCRIPTION_LEN {
            errors.push(ValidationError::new("description", "exceeds 100KB"));
        }

        if report.category.trim().is_empty() {
            errors.push(ValidationError::new("category", "cannot be empty"));
        }

        if report.location.trim().is_empty() {
            errors.push(ValidationError::new("location", "cannot be empty"));
        }

        if report.reporter_name.trim().is_empty() {
            errors.push(ValidationError::new("reporter_name", "cannot be empty"));
        }

        if report.reporter_email.trim().is_empty() {
            errors.push(ValidationError::new("reporter_email", "cannot be empty"));
        } else if !is_plausible_email(&report.reporter_email) {
            errors.push(ValidationError::new(
                "reporter_email",
                "not a valid email address",
            ));
        }

        if let Some(lat) = report.latitude {
            if !(-90.0..=90.0).contains(&lat) {
                errors.push(ValidationError::new("latitude", "must be within -90..90"));
            }
        }
        if let Some(lon) = report.longitude {
            if !(-180.0..=180.0).contains(&lon) {
                errors.push(ValidationError::new(
                    "longitude",
                    "must be within -180..180",
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Validates volunteer registrations.
pub struct VolunteerValidator;

impl VolunteerValidator {
    /// # Errors
    ///
    /// Returns a `Vec<ValidationError>` if any validation rules are violated.
    pub fn validate(req: &VolunteerRequest) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if req.name.trim().is_empty() {
            errors.push(ValidationError::new("name", "cannot be empty"));
        }

        if req.email.trim().is_empty() {
            errors.push(ValidationError::new("email", "cannot be empty"));
        } else if !is_plausible_email(&req.email) {
            errors.push(ValidationError::new("email", "not a valid email address"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Validates account registrations.
pub struct RegistrationValidator;

impl RegistrationValidator {
    /// # Errors
    ///
    /// Returns a `Vec<ValidationError>` if any validation rules are violated.
    pub fn validate(req: &RegistrationRequest) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if req.username.trim().is_empty() {
            errors.push(ValidationError::new("username", "cannot be empty"));
        }

        if req.email.trim().is_empty() {
            errors.push(ValidationError::new("email", "cannot be empty"));
        } else if !is_plausible_email(&req.email) {
            errors.push(ValidationError::new("email", "not a valid email address"));
        }

        if req.password.is_empty() {
            errors.push(ValidationError::new("password", "cannot be empty"));
        } else if req.password.len() < 8 {
            errors.push(ValidationError::new(
                "password",
                "must be at least 8 characters",
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Cheap structural email check: one '@' with non-empty local part and a
/// dotted domain. Deliverability is the mail system's problem.
fn is_plausible_email(s: &str) -> bool {
    let s = s.trim();
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

//! Shared fixtures for integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use civitrack::config::Config;
use civitrack::engine::{Engine, RegistrationRequest, ReportRequest, VolunteerRequest};
use civitrack::model::{Category, Issue, Status};
use civitrack::storage::SqliteStorage;

pub const TEST_SECRET: &str = "integration-test-secret";

pub fn test_config() -> Config {
    Config {
        token_secret: TEST_SECRET.to_string(),
        ..Config::default()
    }
}

pub fn memory_engine() -> Engine {
    Engine::open_memory(&test_config()).expect("in-memory engine")
}

pub fn memory_storage() -> SqliteStorage {
    SqliteStorage::open_memory().expect("in-memory storage")
}

/// A valid citizen report; tweak fields per test.
pub fn report(title: &str) -> ReportRequest {
    ReportRequest {
        title: title.to_string(),
        description: format!("{title} needs attention"),
        category: "pothole".to_string(),
        location: "Main St & 5th Ave".to_string(),
        reporter_name: "A. Citizen".to_string(),
        reporter_email: "citizen@example.com".to_string(),
        ..ReportRequest::default()
    }
}

pub fn registration(username: &str, role: &str) -> RegistrationRequest {
    RegistrationRequest {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password: "correct horse".to_string(),
        role: Some(role.to_string()),
        ..RegistrationRequest::default()
    }
}

pub fn volunteer(name: &str) -> VolunteerRequest {
    VolunteerRequest {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        skills: Some("general repair".to_string()),
        ..VolunteerRequest::default()
    }
}

/// Register an admin and return a live session token.
pub fn admin_token(engine: &mut Engine) -> String {
    engine
        .register_user(registration("admin", "admin"))
        .expect("register admin");
    engine
        .login("admin", "correct horse", Some("admin"))
        .expect("login admin")
        .token
}

/// A raw issue row for storage-level tests, with a controllable creation
/// time so ordering is deterministic.
pub fn raw_issue(id: &str, title: &str, created_at: DateTime<Utc>) -> Issue {
    Issue {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("{title} description"),
        category: Category::Pothole,
        location: "Main St".to_string(),
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

/// Evenly spaced creation times, oldest first.
pub fn spaced_times(count: usize) -> Vec<DateTime<Utc>> {
    let base = Utc::now() - Duration::hours(count as i64);
    (0..count)
        .map(|i| base + Duration::minutes(i as i64))
        .collect()
}

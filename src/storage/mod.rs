//! Storage layer.

pub mod schema;
pub mod sqlite;

pub use sqlite::{BulkChange, IssueChange, SqliteStorage, VolunteerFilter, SUBMISSION_NOTE};

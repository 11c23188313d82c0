//! civitrack: a civic issue reporting and moderation engine.
//!
//! Citizens submit reports of civic problems (potholes, broken
//! streetlights, garbage); administrators and council members move them
//! through an open / in-progress / resolved lifecycle, singly or in bulk,
//! with every observable change recorded in an append-only audit log that
//! lives and dies with its issue.
//!
//! The crate is organized as:
//! - [`model`]: core entities (issues, audit entries, users, sessions,
//!   volunteers)
//! - [`storage`]: `SQLite` persistence; all writes are transactional and
//!   carry their audit entries
//! - [`query`]: filter and pagination construction for listings
//! - [`auth`]: argon2id credentials plus a JWT-signed, ledger-backed
//!   session gate
//! - [`engine`]: the operations a front end calls
//! - [`validation`]: boundary checks on incoming requests
//!
//! # Example
//!
//! ```no_run
//! use civitrack::config::Config;
//! use civitrack::engine::{Engine, ReportRequest};
//!
//! # fn main() -> civitrack::Result<()> {
//! let config = Config::from_env();
//! let mut engine = Engine::open(&config)?;
//! let issue = engine.submit_report(ReportRequest {
//!     title: "Pothole on Main St".into(),
//!     description: "Large pothole near the intersection".into(),
//!     category: "pothole".into(),
//!     location: "Main St & 5th Ave".into(),
//!     reporter_name: "A. Citizen".into(),
//!     reporter_email: "citizen@example.com".into(),
//!     ..ReportRequest::default()
//! })?;
//! println!("accepted {}", issue.id);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod model;
pub mod query;
pub mod storage;
pub mod util;
pub mod validation;

pub use engine::Engine;
pub use error::{CivicError, ErrorCode, Result, StructuredError};

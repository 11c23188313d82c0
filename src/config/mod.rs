//! Configuration for `civitrack`.
//!
//! Configuration sources and precedence (highest wins):
//! 1. Explicit overrides from the caller (CLI flags, test fixtures)
//! 2. Environment variables (`CIVITRACK_*`)
//! 3. Defaults
//!
//! The resulting `Config` is constructed once at process start and passed
//! by reference into the auth components; engine operations never read
//! ambient process state.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Default database filename.
const DEFAULT_DB_FILENAME: &str = "civitrack.db";
/// Default session lifetime, matching the 24h login expiry of the admin UI.
const DEFAULT_SESSION_TTL_HOURS: i64 = 24;
/// Default page size for listings.
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Path to the SQLite database.
    pub db_path: PathBuf,
    /// Secret used to sign session tokens. Must be overridden in any real
    /// deployment.
    pub token_secret: String,
    /// Session lifetime in hours.
    pub session_ttl_hours: i64,
    /// Root directory holding uploaded photos, for release-on-delete.
    pub upload_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILENAME),
            token_secret: "change-me-in-production".to_string(),
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            upload_dir: PathBuf::from("uploads"),
        }
    }
}

/// Explicit overrides, applied over environment and defaults.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub db_path: Option<PathBuf>,
    pub token_secret: Option<String>,
    pub session_ttl_hours: Option<i64>,
    pub upload_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the environment with defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::load(&ConfigOverrides::default())
    }

    /// Load configuration with explicit overrides on top of environment
    /// variables and defaults.
    #[must_use]
    pub fn load(overrides: &ConfigOverrides) -> Self {
        let mut config = Self::default();

        if let Ok(path) = env::var("CIVITRACK_DB") {
            config.db_path = PathBuf::from(path);
        }
        if let Ok(secret) = env::var("CIVITRACK_TOKEN_SECRET") {
            config.token_secret = secret;
        }
        if let Ok(ttl) = env::var("CIVITRACK_SESSION_TTL_HOURS") {
            if let Ok(hours) = ttl.parse::<i64>() {
                if hours > 0 {
                    config.session_ttl_hours = hours;
                }
            }
        }
        if let Ok(dir) = env::var("CIVITRACK_UPLOAD_DIR") {
            config.upload_dir = PathBuf::from(dir);
        }

        if let Some(ref path) = overrides.db_path {
            config.db_path = path.clone();
        }
        if let Some(ref secret) = overrides.token_secret {
            config.token_secret = secret.clone();
        }
        if let Some(hours) = overrides.session_ttl_hours {
            if hours > 0 {
                config.session_ttl_hours = hours;
            }
        }
        if let Some(ref dir) = overrides.upload_dir {
            config.upload_dir = dir.clone();
        }

        config
    }

    /// Session lifetime as a chrono duration.
    #[must_use]
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours)
    }
}

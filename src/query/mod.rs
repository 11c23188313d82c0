//! Query construction for issue listings.
//!
//! Translates a filter specification into a SQL predicate plus parameters,
//! and a pagination window with a total count independent of the window.
//! The same builder backs the citizen listing and the admin listing; the
//! only difference is whether free-text search covers the reporter name.

use crate::config::DEFAULT_PAGE_LIMIT;
use crate::model::{Category, Status};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Filter specification for issue listings.
#[derive(Debug, Clone, Default)]
pub struct IssueFilter {
    /// Exact status match (statuses are canonical lowercase in storage,
    /// parsing is case-insensitive upstream).
    pub status: Option<Status>,
    pub category: Option<Category>,
    pub priority: Option<String>,
    /// `Some(true)` = has an assigned volunteer, `Some(false)` = has none.
    pub assigned: Option<bool>,
    /// Case-insensitive substring over title, description and location.
    pub search: Option<String>,
    /// Admin search additionally covers the reporter name.
    pub include_reporter_in_search: bool,
    /// Forces an empty result set. Used when a raw status filter does not
    /// name any known status: the listing answers with an empty page
    /// instead of an error.
    pub match_none: bool,
}

impl IssueFilter {
    /// Build the WHERE-clause suffix and its parameters.
    ///
    /// The returned string starts with " AND ..." fragments appended to a
    /// `WHERE 1=1` anchor, mirroring how the listing SQL is assembled.
    #[must_use]
    pub fn where_clause(&self) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut sql = String::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if self.match_none {
            sql.push_str(" AND 0=1");
        }

        if let Some(ref status) = self.status {
            sql.push_str(" AND status = ?");
            params.push(Box::new(status.as_str().to_string()));
        }

        if let Some(ref category) = self.category {
            sql.push_str(" AND category = ?");
            params.push(Box::new(category.as_str().to_string()));
        }

        if let Some(ref priority) = self.priority {
            sql.push_str(" AND LOWER(priority) = LOWER(?)");
            params.push(Box::new(priority.clone()));
        }

        match self.assigned {
            Some(true) => sql.push_str(" AND assigned_volunteer_id IS NOT NULL"),
            Some(false) => sql.push_str(" AND assigned_volunteer_id IS NULL"),
            None => {}
        }

        if let Some(ref search) = self.search {
            let trimmed = search.trim();
            if !trimmed.is_empty() {
                let pattern = format!("%{}%", escape_like(trimmed));
                if self.include_reporter_in_search {
                    sql.push_str(
                        " AND (title LIKE ? ESCAPE '\\' OR description LIKE ? ESCAPE '\\' OR location LIKE ? ESCAPE '\\' OR reporter_name LIKE ? ESCAPE '\\')",
                    );
                    for _ in 0..4 {
                        params.push(Box::new(pattern.clone()));
                    }
                } else {
                    sql.push_str(
                        " AND (title LIKE ? ESCAPE '\\' OR description LIKE ? ESCAPE '\\' OR location LIKE ? ESCAPE '\\')",
                    );
                    for _ in 0..3 {
                        params.push(Box::new(pattern.clone()));
                    }
                }
            }
        }

        (sql, params)
    }
}

/// Escape LIKE wildcards so user search text only matches literally.
/// Pairs with the `ESCAPE '\'` clauses above.
pub(crate) fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// A pagination window. Always non-negative; construction is lenient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl Page {
    /// Coerce raw limit/offset inputs into a window.
    ///
    /// Public read endpoints are lenient by design: non-numeric or
    /// negative input falls back to the default (50, 0) rather than
    /// failing the request.
    #[must_use]
    pub fn from_raw(limit: Option<&str>, offset: Option<&str>) -> Self {
        Self {
            limit: coerce_non_negative(limit, DEFAULT_PAGE_LIMIT),
            offset: coerce_non_negative(offset, 0),
        }
    }

    /// Append `LIMIT ?/OFFSET ?` to the SQL being assembled.
    pub fn apply(&self, sql: &mut String, params: &mut Vec<Box<dyn rusqlite::ToSql>>) {
        let _ = write!(sql, " LIMIT ? OFFSET ?");
        params.push(Box::new(i64::from(self.limit)));
        params.push(Box::new(i64::from(self.offset)));
    }
}

fn coerce_non_negative(raw: Option<&str>, default: u32) -> u32 {
    match raw {
        Some(s) => s.trim().parse::<u32>().unwrap_or(default),
        None => default,
    }
}

/// Pagination metadata reported alongside a listing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageInfo {
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
    pub has_more: bool,
}

impl PageInfo {
    /// Build page metadata from a total count independent of the window.
    #[must_use]
    pub fn new(total: u64, page: Page) -> Self {
        Self {
            total,
            limit: page.limit,
            offset: page.offset,
            has_more: u64::from(page.offset) + u64::from(page.limit) < total,
        }
    }
}

/// A page of issues with its pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct IssuePage {
    pub items: Vec<crate::model::Issue>,
    pub pagination: PageInfo,
}

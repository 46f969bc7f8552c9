//! Repository implementations using SQLite.

mod connection_repository;
mod project_repository;

pub use connection_repository::SqliteConnectionRepository;
pub use project_repository::SqliteProjectRepository;

use chrono::{DateTime, Utc};

/// Parse a stored timestamp. Accepts RFC3339 and SQLite's `datetime('now')` format.
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return dt.and_utc();
    }
    Utc::now()
}

pub(crate) fn parse_optional_datetime(s: Option<String>) -> Option<DateTime<Utc>> {
    s.as_deref().map(parse_datetime)
}

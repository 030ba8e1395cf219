pub mod schema;
pub mod user_repo;
pub mod friend_repo;
pub mod contact_repo;
pub mod category_repo;
pub mod relationship_repo;
pub mod activity_repo;
pub mod share_repo;

use std::path::Path;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::Connection;

use crate::error::{KithError, KithResult};

/// Open (creating if needed) the database at `path` and bring the schema up to date.
pub fn open(path: &Path) -> KithResult<Connection> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let conn = Connection::open(path)?;
    schema::initialize(&conn)?;
    Ok(conn)
}

/// Fixed-width UTC timestamps so lexical order in SQL matches time order.
pub(crate) fn ts_to_db(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn ts_from_db(s: &str) -> KithResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| KithError::Other(format!("Invalid timestamp: {}", e)))
}

pub(crate) fn date_from_db(s: &str) -> KithResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| KithError::Other(format!("Invalid date: {}", e)))
}

/// Maps `QueryReturnedNoRows` to `None`, like `OptionalExtension` but flattening our row errors.
pub(crate) fn optional<T>(result: rusqlite::Result<KithResult<T>>) -> KithResult<Option<T>> {
    match result {
        Ok(row) => Ok(Some(row?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection};

use crate::db::{optional, ts_from_db, ts_to_db};
use crate::error::{KithError, KithResult};
use crate::model::{Activity, ActivityKind, Friend, Id, User};

const ACTIVITY_COLUMNS: &str = "id, friend_id, kind, description, location, occurred_at";

pub fn insert(conn: &Connection, owner_id: Id<User>, activity: &Activity) -> KithResult<()> {
    conn.execute(
        "INSERT INTO activities (id, owner_id, friend_id, kind, description, location, occurred_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            activity.id.to_db(),
            owner_id.to_db(),
            activity.friend_id.map(|id| id.to_db()),
            activity.kind.to_db_str(),
            activity.description,
            activity.location,
            ts_to_db(&activity.occurred_at),
        ],
    )?;

    for topic in &activity.topics {
        conn.execute(
            "INSERT OR IGNORE INTO activity_topics (activity_id, topic) VALUES (?1, ?2)",
            params![activity.id.to_db(), topic],
        )?;
    }

    Ok(())
}

pub fn delete(conn: &Connection, activity_id: Id<Activity>) -> KithResult<()> {
    conn.execute(
        "DELETE FROM activities WHERE id = ?1",
        params![activity_id.to_db()],
    )?;
    Ok(())
}

pub fn find_owned(
    conn: &Connection,
    owner_id: Id<User>,
    activity_id: Id<Activity>,
) -> KithResult<Option<Activity>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ACTIVITY_COLUMNS} FROM activities WHERE id = ?1 AND owner_id = ?2"
    ))?;
    let found = optional(stmt.query_row(params![activity_id.to_db(), owner_id.to_db()], |row| {
        Ok(row_to_activity(row))
    }))?;
    found.map(|a| with_topics(conn, a)).transpose()
}

/// Newest first.
pub fn find_by_friend(conn: &Connection, friend_id: Id<Friend>) -> KithResult<Vec<Activity>> {
    query_activities(
        conn,
        "WHERE friend_id = ?1 ORDER BY occurred_at DESC",
        &[friend_id.to_db()],
    )
}

/// Activities with `from <= occurred_at <= to`, newest first.
pub fn find_in_range(
    conn: &Connection,
    owner_id: Id<User>,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> KithResult<Vec<Activity>> {
    query_activities(
        conn,
        "WHERE owner_id = ?1 AND occurred_at >= ?2 AND occurred_at <= ?3 ORDER BY occurred_at DESC",
        &[owner_id.to_db(), ts_to_db(&from), ts_to_db(&to)],
    )
}

pub fn find_recent(conn: &Connection, owner_id: Id<User>, limit: usize) -> KithResult<Vec<Activity>> {
    query_activities(
        conn,
        &format!("WHERE owner_id = ?1 ORDER BY occurred_at DESC LIMIT {limit}"),
        &[owner_id.to_db()],
    )
}

/// Time of the most recent contact-kind activity with the friend.
pub fn find_last_contact_at(
    conn: &Connection,
    friend_id: Id<Friend>,
) -> KithResult<Option<DateTime<Utc>>> {
    let kinds = contact_kinds_sql();
    let last: Option<String> = conn.query_row(
        &format!(
            "SELECT MAX(occurred_at) FROM activities WHERE friend_id = ?1 AND kind IN ({kinds})"
        ),
        params![friend_id.to_db()],
        |row| row.get(0),
    )?;
    last.as_deref().map(ts_from_db).transpose()
}

pub fn count_by_owner(conn: &Connection, owner_id: Id<User>) -> KithResult<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM activities WHERE owner_id = ?1",
        params![owner_id.to_db()],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn count_since(conn: &Connection, owner_id: Id<User>, since: DateTime<Utc>) -> KithResult<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM activities WHERE owner_id = ?1 AND occurred_at >= ?2",
        params![owner_id.to_db(), ts_to_db(&since)],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn contact_kinds_sql() -> String {
    ActivityKind::CONTACT
        .iter()
        .map(|k| format!("'{}'", k.to_db_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn query_activities(conn: &Connection, clause: &str, args: &[String]) -> KithResult<Vec<Activity>> {
    let mut stmt = conn.prepare(&format!("SELECT {ACTIVITY_COLUMNS} FROM activities {clause}"))?;
    let activities = stmt
        .query_map(params_from_iter(args.iter()), |row| Ok(row_to_activity(row)))?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    activities
        .into_iter()
        .map(|a| with_topics(conn, a))
        .collect()
}

fn with_topics(conn: &Connection, mut activity: Activity) -> KithResult<Activity> {
    let mut stmt =
        conn.prepare("SELECT topic FROM activity_topics WHERE activity_id = ?1 ORDER BY topic")?;
    activity.topics = stmt
        .query_map(params![activity.id.to_db()], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(activity)
}

fn row_to_activity(row: &rusqlite::Row) -> KithResult<Activity> {
    let id_str: String = row.get(0)?;
    let friend_id: Option<String> = row.get(1)?;
    let kind: String = row.get(2)?;
    let occurred_at: String = row.get(5)?;
    Ok(Activity {
        id: Id::from_db(&id_str)?,
        friend_id: friend_id.as_deref().map(Id::from_db).transpose()?,
        kind: ActivityKind::from_db_str(&kind)
            .ok_or_else(|| KithError::Other(format!("Unknown activity kind: {}", kind)))?,
        description: row.get(3)?,
        location: row.get(4)?,
        topics: Vec::new(),
        occurred_at: ts_from_db(&occurred_at)?,
    })
}

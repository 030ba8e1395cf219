use rusqlite::{params, Connection};

use crate::db::{date_from_db, optional, ts_from_db, ts_to_db};
use crate::error::{KithError, KithResult};
use crate::model::{Friend, Id, RelationshipLevel, User};

const FRIEND_COLUMNS: &str = "id, name, nickname, birthday, how_we_met, notes, location, interests,
     level, photo_url, instagram, reminder_days, archived, created_at, updated_at";

pub fn insert(conn: &Connection, owner_id: Id<User>, friend: &Friend) -> KithResult<()> {
    conn.execute(
        "INSERT INTO friends (id, owner_id, name, nickname, birthday, how_we_met, notes, location,
         interests, level, photo_url, instagram, reminder_days, archived, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            friend.id.to_db(),
            owner_id.to_db(),
            friend.name,
            friend.nickname,
            friend.birthday.map(|d| d.to_string()),
            friend.how_we_met,
            friend.notes,
            friend.location,
            serde_json::to_string(&friend.interests)?,
            friend.level.to_db_str(),
            friend.photo_url,
            friend.instagram,
            friend.reminder_days,
            friend.archived as i32,
            ts_to_db(&friend.created_at),
            ts_to_db(&friend.updated_at),
        ],
    )?;
    Ok(())
}

pub fn update(conn: &Connection, friend: &Friend) -> KithResult<()> {
    conn.execute(
        "UPDATE friends SET name = ?1, nickname = ?2, birthday = ?3, how_we_met = ?4, notes = ?5,
         location = ?6, interests = ?7, level = ?8, photo_url = ?9, instagram = ?10,
         reminder_days = ?11, archived = ?12, updated_at = ?13
         WHERE id = ?14",
        params![
            friend.name,
            friend.nickname,
            friend.birthday.map(|d| d.to_string()),
            friend.how_we_met,
            friend.notes,
            friend.location,
            serde_json::to_string(&friend.interests)?,
            friend.level.to_db_str(),
            friend.photo_url,
            friend.instagram,
            friend.reminder_days,
            friend.archived as i32,
            ts_to_db(&friend.updated_at),
            friend.id.to_db(),
        ],
    )?;
    Ok(())
}

/// Deletes the friend; contacts, category assignments, relationships and
/// activities about them go with it through `ON DELETE CASCADE`.
pub fn delete(conn: &Connection, friend_id: Id<Friend>) -> KithResult<()> {
    conn.execute("DELETE FROM friends WHERE id = ?1", params![friend_id.to_db()])?;
    Ok(())
}

/// Looks a friend up only within the owner's network.
pub fn find_owned(
    conn: &Connection,
    owner_id: Id<User>,
    friend_id: Id<Friend>,
) -> KithResult<Option<Friend>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {FRIEND_COLUMNS} FROM friends WHERE id = ?1 AND owner_id = ?2"
    ))?;
    optional(stmt.query_row(params![friend_id.to_db(), owner_id.to_db()], |row| {
        Ok(row_to_friend(row))
    }))
}

pub fn find_by_owner(conn: &Connection, owner_id: Id<User>) -> KithResult<Vec<Friend>> {
    query_friends(
        conn,
        "WHERE owner_id = ?1 ORDER BY name COLLATE NOCASE",
        owner_id,
    )
}

pub fn find_active_by_owner(conn: &Connection, owner_id: Id<User>) -> KithResult<Vec<Friend>> {
    query_friends(
        conn,
        "WHERE owner_id = ?1 AND archived = 0 ORDER BY name COLLATE NOCASE",
        owner_id,
    )
}

pub fn find_archived_by_owner(conn: &Connection, owner_id: Id<User>) -> KithResult<Vec<Friend>> {
    query_friends(
        conn,
        "WHERE owner_id = ?1 AND archived = 1 ORDER BY name COLLATE NOCASE",
        owner_id,
    )
}

fn query_friends(conn: &Connection, clause: &str, owner_id: Id<User>) -> KithResult<Vec<Friend>> {
    let mut stmt = conn.prepare(&format!("SELECT {FRIEND_COLUMNS} FROM friends {clause}"))?;
    let friends = stmt
        .query_map(params![owner_id.to_db()], |row| Ok(row_to_friend(row)))?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(friends)
}

fn row_to_friend(row: &rusqlite::Row) -> KithResult<Friend> {
    let id_str: String = row.get(0)?;
    let birthday: Option<String> = row.get(3)?;
    let interests: String = row.get(7)?;
    let level: String = row.get(8)?;
    let created_at: String = row.get(13)?;
    let updated_at: String = row.get(14)?;

    Ok(Friend {
        id: Id::from_db(&id_str)?,
        name: row.get(1)?,
        nickname: row.get(2)?,
        birthday: birthday.as_deref().map(date_from_db).transpose()?,
        how_we_met: row.get(4)?,
        notes: row.get(5)?,
        location: row.get(6)?,
        interests: serde_json::from_str(&interests)?,
        level: RelationshipLevel::from_db_str(&level)
            .ok_or_else(|| KithError::Other(format!("Unknown relationship level: {}", level)))?,
        photo_url: row.get(9)?,
        instagram: row.get(10)?,
        reminder_days: row.get(11)?,
        archived: row.get::<_, i32>(12)? != 0,
        created_at: ts_from_db(&created_at)?,
        updated_at: ts_from_db(&updated_at)?,
    })
}

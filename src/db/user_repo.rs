use rusqlite::{params, Connection};

use crate::db::{optional, ts_from_db, ts_to_db};
use crate::error::KithResult;
use crate::model::{Id, User};

const USER_COLUMNS: &str = "id, name, email, password_hash, bio, location, avatar_url, created_at";

pub fn insert(conn: &Connection, user: &User) -> KithResult<()> {
    conn.execute(
        "INSERT INTO users (id, name, email, password_hash, bio, location, avatar_url, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            user.id.to_db(),
            user.name,
            user.email,
            user.password_hash,
            user.bio,
            user.location,
            user.avatar_url,
            ts_to_db(&user.created_at),
        ],
    )?;
    Ok(())
}

pub fn update_profile(conn: &Connection, user: &User) -> KithResult<()> {
    conn.execute(
        "UPDATE users SET name = ?1, bio = ?2, location = ?3, avatar_url = ?4 WHERE id = ?5",
        params![user.name, user.bio, user.location, user.avatar_url, user.id.to_db()],
    )?;
    Ok(())
}

pub fn update_password(conn: &Connection, user_id: Id<User>, password_hash: &str) -> KithResult<()> {
    conn.execute(
        "UPDATE users SET password_hash = ?1 WHERE id = ?2",
        params![password_hash, user_id.to_db()],
    )?;
    Ok(())
}

pub fn find_by_id(conn: &Connection, user_id: Id<User>) -> KithResult<Option<User>> {
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))?;
    optional(stmt.query_row(params![user_id.to_db()], |row| Ok(row_to_user(row))))
}

/// Email lookup is case-insensitive.
pub fn find_by_email(conn: &Connection, email: &str) -> KithResult<Option<User>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = ?1 COLLATE NOCASE"
    ))?;
    optional(stmt.query_row(params![email.trim()], |row| Ok(row_to_user(row))))
}

fn row_to_user(row: &rusqlite::Row) -> KithResult<User> {
    let id_str: String = row.get(0)?;
    let created_at: String = row.get(7)?;
    Ok(User {
        id: Id::from_db(&id_str)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        bio: row.get(4)?,
        location: row.get(5)?,
        avatar_url: row.get(6)?,
        created_at: ts_from_db(&created_at)?,
    })
}

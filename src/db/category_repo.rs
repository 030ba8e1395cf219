use rusqlite::{params, Connection};

use crate::db::optional;
use crate::error::KithResult;
use crate::model::{Category, Friend, Id, User};

pub fn insert(conn: &Connection, owner_id: Id<User>, category: &Category) -> KithResult<()> {
    conn.execute(
        "INSERT INTO categories (id, owner_id, name, archived) VALUES (?1, ?2, ?3, ?4)",
        params![
            category.id.to_db(),
            owner_id.to_db(),
            category.name,
            category.archived as i32,
        ],
    )?;
    Ok(())
}

pub fn update(conn: &Connection, category: &Category) -> KithResult<()> {
    conn.execute(
        "UPDATE categories SET name = ?1, archived = ?2 WHERE id = ?3",
        params![category.name, category.archived as i32, category.id.to_db()],
    )?;
    Ok(())
}

pub fn delete(conn: &Connection, category_id: Id<Category>) -> KithResult<()> {
    conn.execute(
        "DELETE FROM categories WHERE id = ?1",
        params![category_id.to_db()],
    )?;
    Ok(())
}

pub fn find_owned(
    conn: &Connection,
    owner_id: Id<User>,
    category_id: Id<Category>,
) -> KithResult<Option<Category>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, archived FROM categories WHERE id = ?1 AND owner_id = ?2",
    )?;
    optional(stmt.query_row(params![category_id.to_db(), owner_id.to_db()], |row| {
        Ok(row_to_category(row))
    }))
}

pub fn find_active(conn: &Connection, owner_id: Id<User>) -> KithResult<Vec<Category>> {
    query_categories(conn, "WHERE owner_id = ?1 AND archived = 0", owner_id)
}

pub fn find_archived(conn: &Connection, owner_id: Id<User>) -> KithResult<Vec<Category>> {
    query_categories(conn, "WHERE owner_id = ?1 AND archived = 1", owner_id)
}

pub fn find_by_name(
    conn: &Connection,
    owner_id: Id<User>,
    name: &str,
) -> KithResult<Option<Category>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, archived FROM categories
         WHERE owner_id = ?1 AND name = ?2 COLLATE NOCASE",
    )?;
    optional(stmt.query_row(params![owner_id.to_db(), name], |row| {
        Ok(row_to_category(row))
    }))
}

// --- Friend assignments ---

/// Replaces the friend's category set.
pub fn set_for_friend(
    conn: &Connection,
    friend_id: Id<Friend>,
    category_ids: &[Id<Category>],
) -> KithResult<()> {
    conn.execute(
        "DELETE FROM friend_categories WHERE friend_id = ?1",
        params![friend_id.to_db()],
    )?;
    for category_id in category_ids {
        conn.execute(
            "INSERT OR IGNORE INTO friend_categories (friend_id, category_id) VALUES (?1, ?2)",
            params![friend_id.to_db(), category_id.to_db()],
        )?;
    }
    Ok(())
}

pub fn find_for_friend(conn: &Connection, friend_id: Id<Friend>) -> KithResult<Vec<Category>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.name, c.archived
         FROM categories c JOIN friend_categories fc ON fc.category_id = c.id
         WHERE fc.friend_id = ?1 ORDER BY c.name COLLATE NOCASE",
    )?;
    let categories = stmt
        .query_map(params![friend_id.to_db()], |row| Ok(row_to_category(row)))?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(categories)
}

pub fn find_friend_ids(conn: &Connection, category_id: Id<Category>) -> KithResult<Vec<Id<Friend>>> {
    let mut stmt =
        conn.prepare("SELECT friend_id FROM friend_categories WHERE category_id = ?1")?;
    let ids = stmt
        .query_map(params![category_id.to_db()], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?
        .iter()
        .map(|s| Id::from_db(s))
        .collect::<KithResult<Vec<_>>>()?;
    Ok(ids)
}

fn query_categories(
    conn: &Connection,
    clause: &str,
    owner_id: Id<User>,
) -> KithResult<Vec<Category>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, name, archived FROM categories {clause} ORDER BY name COLLATE NOCASE"
    ))?;
    let categories = stmt
        .query_map(params![owner_id.to_db()], |row| Ok(row_to_category(row)))?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(categories)
}

fn row_to_category(row: &rusqlite::Row) -> KithResult<Category> {
    let id_str: String = row.get(0)?;
    Ok(Category {
        id: Id::from_db(&id_str)?,
        name: row.get(1)?,
        archived: row.get::<_, i32>(2)? != 0,
    })
}

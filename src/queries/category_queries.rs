use rusqlite::Connection;

use crate::db::{category_repo, friend_repo};
use crate::error::{KithError, KithResult};
use crate::model::{Category, Friend, Id, User};

pub fn active_categories(conn: &Connection, owner_id: Id<User>) -> KithResult<Vec<Category>> {
    category_repo::find_active(conn, owner_id)
}

pub fn archived_categories(conn: &Connection, owner_id: Id<User>) -> KithResult<Vec<Category>> {
    category_repo::find_archived(conn, owner_id)
}

/// Active friends in the category, by name.
pub fn friends_in_category(
    conn: &Connection,
    owner_id: Id<User>,
    category_id: Id<Category>,
) -> KithResult<Vec<Friend>> {
    category_repo::find_owned(conn, owner_id, category_id)?
        .ok_or_else(|| KithError::not_found("Category", category_id))?;
    let members = category_repo::find_friend_ids(conn, category_id)?;
    Ok(friend_repo::find_active_by_owner(conn, owner_id)?
        .into_iter()
        .filter(|f| members.contains(&f.id))
        .collect())
}

use rusqlite::Connection;

use crate::db::category_repo;
use crate::error::{KithError, KithResult};
use crate::model::{Category, Friend, Id, User};
use crate::ops::friend_ops::require_friend;
use crate::validation;

pub fn add_category(conn: &Connection, owner_id: Id<User>, name: &str) -> KithResult<Category> {
    let valid_name = validation::non_blank(name, "name")?;

    if category_repo::find_by_name(conn, owner_id, &valid_name)?.is_some() {
        return Err(KithError::AlreadyExists {
            entity_type: "Category".into(),
            identifier: valid_name,
        });
    }

    let category = Category::create(valid_name);
    category_repo::insert(conn, owner_id, &category)?;
    Ok(category)
}

pub fn rename_category(
    conn: &Connection,
    owner_id: Id<User>,
    category_id: Id<Category>,
    name: &str,
) -> KithResult<Category> {
    let mut category = require_category(conn, owner_id, category_id)?;
    let valid_name = validation::non_blank(name, "name")?;

    // Check for duplicate (excluding self)
    if let Some(existing) = category_repo::find_by_name(conn, owner_id, &valid_name)? {
        if existing.id != category_id {
            return Err(KithError::AlreadyExists {
                entity_type: "Category".into(),
                identifier: valid_name,
            });
        }
    }

    category.name = valid_name;
    category_repo::update(conn, &category)?;
    Ok(category)
}

pub fn archive_category(conn: &Connection, owner_id: Id<User>, category_id: Id<Category>) -> KithResult<Category> {
    let mut category = require_category(conn, owner_id, category_id)?;
    category.archived = true;
    category_repo::update(conn, &category)?;
    Ok(category)
}

pub fn unarchive_category(conn: &Connection, owner_id: Id<User>, category_id: Id<Category>) -> KithResult<Category> {
    let mut category = require_category(conn, owner_id, category_id)?;
    category.archived = false;
    category_repo::update(conn, &category)?;
    Ok(category)
}

/// Deleting a category unassigns it from every friend.
pub fn delete_category(conn: &Connection, owner_id: Id<User>, category_id: Id<Category>) -> KithResult<()> {
    require_category(conn, owner_id, category_id)?;
    category_repo::delete(conn, category_id)
}

pub fn set_categories(
    conn: &Connection,
    owner_id: Id<User>,
    friend_id: Id<Friend>,
    category_ids: Vec<Id<Category>>,
) -> KithResult<Vec<Category>> {
    require_friend(conn, owner_id, friend_id)?;
    let ids = require_categories(conn, owner_id, &category_ids)?;
    category_repo::set_for_friend(conn, friend_id, &ids)?;
    category_repo::find_for_friend(conn, friend_id)
}

pub fn add_categories(
    conn: &Connection,
    owner_id: Id<User>,
    friend_id: Id<Friend>,
    category_ids: Vec<Id<Category>>,
) -> KithResult<Vec<Category>> {
    require_friend(conn, owner_id, friend_id)?;
    let mut ids: Vec<Id<Category>> = category_repo::find_for_friend(conn, friend_id)?
        .into_iter()
        .map(|c| c.id)
        .collect();
    for id in require_categories(conn, owner_id, &category_ids)? {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    category_repo::set_for_friend(conn, friend_id, &ids)?;
    category_repo::find_for_friend(conn, friend_id)
}

pub fn remove_categories(
    conn: &Connection,
    owner_id: Id<User>,
    friend_id: Id<Friend>,
    category_ids: Vec<Id<Category>>,
) -> KithResult<Vec<Category>> {
    require_friend(conn, owner_id, friend_id)?;
    let ids: Vec<Id<Category>> = category_repo::find_for_friend(conn, friend_id)?
        .into_iter()
        .map(|c| c.id)
        .filter(|id| !category_ids.contains(id))
        .collect();
    category_repo::set_for_friend(conn, friend_id, &ids)?;
    category_repo::find_for_friend(conn, friend_id)
}

/// Checks every id belongs to the owner and returns them de-duplicated.
pub(crate) fn require_categories(
    conn: &Connection,
    owner_id: Id<User>,
    category_ids: &[Id<Category>],
) -> KithResult<Vec<Id<Category>>> {
    let mut ids = Vec::new();
    for id in category_ids {
        require_category(conn, owner_id, *id)?;
        if !ids.contains(id) {
            ids.push(*id);
        }
    }
    Ok(ids)
}

fn require_category(conn: &Connection, owner_id: Id<User>, category_id: Id<Category>) -> KithResult<Category> {
    category_repo::find_owned(conn, owner_id, category_id)?
        .ok_or_else(|| KithError::not_found("Category", category_id))
}

use rusqlite::Connection;

use crate::db::relationship_repo;
use crate::error::{KithError, KithResult};
use crate::model::{Friend, Id, Relationship, RelationshipKind, User};
use crate::ops::friend_ops::require_friend;
use crate::validation::trim_optional;

/// Records that `from` relates to `to` (e.g., `from` was introduced by `to`).
pub fn add_relationship(
    conn: &Connection,
    owner_id: Id<User>,
    from: Id<Friend>,
    to: Id<Friend>,
    kind: RelationshipKind,
    note: Option<&str>,
) -> KithResult<Relationship> {
    if from == to {
        return Err(KithError::invalid(
            "toFriendId",
            "a friend cannot be related to themselves",
        ));
    }
    require_friend(conn, owner_id, from)?;
    require_friend(conn, owner_id, to)?;

    if relationship_repo::exists(conn, from, to, kind)? {
        return Err(KithError::AlreadyExists {
            entity_type: "Relationship".into(),
            identifier: format!("{} {} {}", from, kind.display_name(), to),
        });
    }

    let rel = Relationship::create(from, to, kind, trim_optional(note));
    relationship_repo::insert(conn, owner_id, &rel)?;
    Ok(rel)
}

pub fn remove_relationship(
    conn: &Connection,
    owner_id: Id<User>,
    rel_id: Id<Relationship>,
) -> KithResult<()> {
    relationship_repo::find_owned(conn, owner_id, rel_id)?
        .ok_or_else(|| KithError::not_found("Relationship", rel_id))?;
    relationship_repo::delete(conn, rel_id)
}

use rusqlite::Connection;
use serde::Serialize;

use crate::db::{friend_repo, relationship_repo};
use crate::error::KithResult;
use crate::model::{Friend, Id, Relationship, RelationshipKind, User};
use crate::ops::friend_ops::require_friend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    /// The friend is the `from` end.
    Outgoing,
    Incoming,
}

/// A relationship seen from one friend, with the friend at the other end.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedFriend {
    pub relationship: Relationship,
    pub direction: Direction,
    pub other: Friend,
}

/// Relationships touching `friend_id` in either direction.
pub fn relationships_for(
    conn: &Connection,
    owner_id: Id<User>,
    friend_id: Id<Friend>,
) -> KithResult<Vec<RelatedFriend>> {
    require_friend(conn, owner_id, friend_id)?;
    let mut related = Vec::new();
    for rel in relationship_repo::find_for_friend(conn, friend_id)? {
        let direction = if rel.from_friend_id == friend_id {
            Direction::Outgoing
        } else {
            Direction::Incoming
        };
        if let Some(other) = friend_repo::find_owned(conn, owner_id, rel.other_end(friend_id))? {
            related.push(RelatedFriend {
                relationship: rel,
                direction,
                other,
            });
        }
    }
    Ok(related)
}

pub fn all_relationships(conn: &Connection, owner_id: Id<User>) -> KithResult<Vec<Relationship>> {
    relationship_repo::find_by_owner(conn, owner_id)
}

/// Friends who introduced `friend_id` to you.
pub fn introduced_by(conn: &Connection, owner_id: Id<User>, friend_id: Id<Friend>) -> KithResult<Vec<Friend>> {
    introductions(conn, owner_id, friend_id, Direction::Outgoing)
}

/// Friends that `friend_id` introduced you to.
pub fn introductions_by(conn: &Connection, owner_id: Id<User>, friend_id: Id<Friend>) -> KithResult<Vec<Friend>> {
    introductions(conn, owner_id, friend_id, Direction::Incoming)
}

fn introductions(
    conn: &Connection,
    owner_id: Id<User>,
    friend_id: Id<Friend>,
    direction: Direction,
) -> KithResult<Vec<Friend>> {
    Ok(relationships_for(conn, owner_id, friend_id)?
        .into_iter()
        .filter(|r| r.relationship.kind == RelationshipKind::IntroducedBy && r.direction == direction)
        .map(|r| r.other)
        .collect())
}

use rusqlite::{params, Connection};

use crate::db::{optional, ts_from_db, ts_to_db};
use crate::error::{KithError, KithResult};
use crate::model::{Friend, Id, Relationship, RelationshipKind, User};

const RELATIONSHIP_COLUMNS: &str = "id, from_friend_id, to_friend_id, kind, note, created_at";

pub fn insert(conn: &Connection, owner_id: Id<User>, rel: &Relationship) -> KithResult<()> {
    conn.execute(
        "INSERT INTO relationships (id, owner_id, from_friend_id, to_friend_id, kind, note, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            rel.id.to_db(),
            owner_id.to_db(),
            rel.from_friend_id.to_db(),
            rel.to_friend_id.to_db(),
            rel.kind.to_db_str(),
            rel.note,
            ts_to_db(&rel.created_at),
        ],
    )?;
    Ok(())
}

pub fn delete(conn: &Connection, rel_id: Id<Relationship>) -> KithResult<()> {
    conn.execute(
        "DELETE FROM relationships WHERE id = ?1",
        params![rel_id.to_db()],
    )?;
    Ok(())
}

pub fn find_owned(
    conn: &Connection,
    owner_id: Id<User>,
    rel_id: Id<Relationship>,
) -> KithResult<Option<Relationship>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RELATIONSHIP_COLUMNS} FROM relationships WHERE id = ?1 AND owner_id = ?2"
    ))?;
    optional(stmt.query_row(params![rel_id.to_db(), owner_id.to_db()], |row| {
        Ok(row_to_relationship(row))
    }))
}

pub fn exists(
    conn: &Connection,
    from: Id<Friend>,
    to: Id<Friend>,
    kind: RelationshipKind,
) -> KithResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM relationships
         WHERE from_friend_id = ?1 AND to_friend_id = ?2 AND kind = ?3",
        params![from.to_db(), to.to_db(), kind.to_db_str()],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn find_by_owner(conn: &Connection, owner_id: Id<User>) -> KithResult<Vec<Relationship>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RELATIONSHIP_COLUMNS} FROM relationships WHERE owner_id = ?1 ORDER BY created_at"
    ))?;
    let rels = stmt
        .query_map(params![owner_id.to_db()], |row| Ok(row_to_relationship(row)))?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rels)
}

/// Edges touching the friend in either direction.
pub fn find_for_friend(conn: &Connection, friend_id: Id<Friend>) -> KithResult<Vec<Relationship>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RELATIONSHIP_COLUMNS} FROM relationships
         WHERE from_friend_id = ?1 OR to_friend_id = ?1 ORDER BY created_at"
    ))?;
    let rels = stmt
        .query_map(params![friend_id.to_db()], |row| Ok(row_to_relationship(row)))?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rels)
}

fn row_to_relationship(row: &rusqlite::Row) -> KithResult<Relationship> {
    let id_str: String = row.get(0)?;
    let from: String = row.get(1)?;
    let to: String = row.get(2)?;
    let kind: String = row.get(3)?;
    let created_at: String = row.get(5)?;
    Ok(Relationship {
        id: Id::from_db(&id_str)?,
        from_friend_id: Id::from_db(&from)?,
        to_friend_id: Id::from_db(&to)?,
        kind: RelationshipKind::from_db_str(&kind)
            .ok_or_else(|| KithError::Other(format!("Unknown relationship kind: {}", kind)))?,
        note: row.get(4)?,
        created_at: ts_from_db(&created_at)?,
    })
}

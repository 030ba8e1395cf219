use rusqlite::{params, Connection};

use crate::db::{optional, ts_from_db, ts_to_db};
use crate::error::{KithError, KithResult};
use crate::model::{ContactShare, Id, ShareStatus, User};

const SHARE_COLUMNS: &str =
    "id, sender_id, recipient_id, card, message, status, created_at, responded_at";

pub fn insert(conn: &Connection, share: &ContactShare) -> KithResult<()> {
    conn.execute(
        "INSERT INTO contact_shares (id, sender_id, recipient_id, card, message, status, created_at, responded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            share.id.to_db(),
            share.sender_id.to_db(),
            share.recipient_id.to_db(),
            serde_json::to_string(&share.card)?,
            share.message,
            share.status.to_db_str(),
            ts_to_db(&share.created_at),
            share.responded_at.as_ref().map(ts_to_db),
        ],
    )?;
    Ok(())
}

pub fn update_status(conn: &Connection, share: &ContactShare) -> KithResult<()> {
    conn.execute(
        "UPDATE contact_shares SET status = ?1, responded_at = ?2 WHERE id = ?3",
        params![
            share.status.to_db_str(),
            share.responded_at.as_ref().map(ts_to_db),
            share.id.to_db(),
        ],
    )?;
    Ok(())
}

pub fn find_by_id(conn: &Connection, share_id: Id<ContactShare>) -> KithResult<Option<ContactShare>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SHARE_COLUMNS} FROM contact_shares WHERE id = ?1"
    ))?;
    optional(stmt.query_row(params![share_id.to_db()], |row| Ok(row_to_share(row))))
}

/// Pending shares addressed to the user, newest first.
pub fn find_pending_incoming(conn: &Connection, recipient_id: Id<User>) -> KithResult<Vec<ContactShare>> {
    query_shares(
        conn,
        "WHERE recipient_id = ?1 AND status = 'Pending' ORDER BY created_at DESC",
        recipient_id,
    )
}

/// Every share the user sent, newest first.
pub fn find_outgoing(conn: &Connection, sender_id: Id<User>) -> KithResult<Vec<ContactShare>> {
    query_shares(
        conn,
        "WHERE sender_id = ?1 ORDER BY created_at DESC",
        sender_id,
    )
}

pub fn count_pending_incoming(conn: &Connection, recipient_id: Id<User>) -> KithResult<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM contact_shares WHERE recipient_id = ?1 AND status = 'Pending'",
        params![recipient_id.to_db()],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn query_shares(conn: &Connection, clause: &str, user_id: Id<User>) -> KithResult<Vec<ContactShare>> {
    let mut stmt = conn.prepare(&format!("SELECT {SHARE_COLUMNS} FROM contact_shares {clause}"))?;
    let shares = stmt
        .query_map(params![user_id.to_db()], |row| Ok(row_to_share(row)))?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(shares)
}

fn row_to_share(row: &rusqlite::Row) -> KithResult<ContactShare> {
    let id_str: String = row.get(0)?;
    let sender: String = row.get(1)?;
    let recipient: String = row.get(2)?;
    let card: String = row.get(3)?;
    let status: String = row.get(5)?;
    let created_at: String = row.get(6)?;
    let responded_at: Option<String> = row.get(7)?;
    Ok(ContactShare {
        id: Id::from_db(&id_str)?,
        sender_id: Id::from_db(&sender)?,
        recipient_id: Id::from_db(&recipient)?,
        card: serde_json::from_str(&card)?,
        message: row.get(4)?,
        status: ShareStatus::from_db_str(&status)
            .ok_or_else(|| KithError::Other(format!("Unknown share status: {}", status)))?,
        created_at: ts_from_db(&created_at)?,
        responded_at: responded_at.as_deref().map(ts_from_db).transpose()?,
    })
}

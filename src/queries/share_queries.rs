use rusqlite::Connection;
use serde::Serialize;

use crate::db::{share_repo, user_repo};
use crate::error::KithResult;
use crate::model::{ContactShare, Id, User};

/// A share with the display name of the other party.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareView {
    #[serde(flatten)]
    pub share: ContactShare,
    pub counterpart_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareInbox {
    pub incoming: Vec<ShareView>,
    pub outgoing: Vec<ShareView>,
}

pub fn incoming_shares(conn: &Connection, user_id: Id<User>) -> KithResult<Vec<ShareView>> {
    share_repo::find_pending_incoming(conn, user_id)?
        .into_iter()
        .map(|share| view(conn, share.sender_id, share))
        .collect()
}

pub fn outgoing_shares(conn: &Connection, user_id: Id<User>) -> KithResult<Vec<ShareView>> {
    share_repo::find_outgoing(conn, user_id)?
        .into_iter()
        .map(|share| view(conn, share.recipient_id, share))
        .collect()
}

pub fn inbox(conn: &Connection, user_id: Id<User>) -> KithResult<ShareInbox> {
    Ok(ShareInbox {
        incoming: incoming_shares(conn, user_id)?,
        outgoing: outgoing_shares(conn, user_id)?,
    })
}

fn view(conn: &Connection, counterpart: Id<User>, share: ContactShare) -> KithResult<ShareView> {
    Ok(ShareView {
        counterpart_name: user_repo::find_by_id(conn, counterpart)?.map(|u| u.name),
        share,
    })
}

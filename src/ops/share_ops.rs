use chrono::Utc;
use rusqlite::Connection;
use tracing::info;

use crate::db::{contact_repo, friend_repo, share_repo, user_repo};
use crate::error::{KithError, KithResult};
use crate::model::{
    ActivityKind, ContactEntry, ContactShare, Friend, Id, SharedCard, ShareStatus, User,
};
use crate::ops::activity_ops;
use crate::ops::friend_ops::require_friend;
use crate::validation::{self, trim_optional};

/// Offers a snapshot of one of the sender's friends to another user.
pub fn share_friend(
    conn: &Connection,
    sender_id: Id<User>,
    friend_id: Id<Friend>,
    recipient_email: &str,
    message: Option<&str>,
) -> KithResult<ContactShare> {
    let friend = require_friend(conn, sender_id, friend_id)?;
    let email = validation::email(recipient_email, "recipientEmail")?;
    let recipient = user_repo::find_by_email(conn, &email)?
        .ok_or_else(|| KithError::not_found("User", &email))?;
    if recipient.id == sender_id {
        return Err(KithError::invalid("recipientEmail", "cannot share with yourself"));
    }

    let contacts = contact_repo::find_by_friend(conn, friend_id)?;
    let share = ContactShare::create(
        sender_id,
        recipient.id,
        SharedCard::snapshot(&friend, contacts),
        trim_optional(message),
    );
    share_repo::insert(conn, &share)?;
    info!(sender_id = %sender_id, recipient_id = %recipient.id, share_id = %share.id, "friend shared");
    Ok(share)
}

/// Copies the shared card into the recipient's friends and closes the share.
pub fn accept_share(
    conn: &Connection,
    recipient_id: Id<User>,
    share_id: Id<ContactShare>,
) -> KithResult<Friend> {
    let mut share = require_share(conn, recipient_id, share_id)?;
    if share.recipient_id != recipient_id {
        return Err(KithError::Forbidden("only the recipient can accept a share".into()));
    }
    require_pending(&share)?;

    let tx = conn.unchecked_transaction()?;

    let card = &share.card;
    let mut friend = Friend::create(card.name.clone());
    friend.nickname = card.nickname.clone();
    friend.birthday = card.birthday;
    friend.location = card.location.clone();
    friend.interests = card.interests.clone();
    friend.instagram = card.instagram.clone();
    friend.photo_url = card.photo_url.clone();
    friend_repo::insert(&tx, recipient_id, &friend)?;

    for entry in &card.contacts {
        let copy = ContactEntry {
            id: Id::generate(),
            ..entry.clone()
        };
        contact_repo::insert(&tx, friend.id, &copy)?;
    }

    let sender_name = user_repo::find_by_id(&tx, share.sender_id)?
        .map(|u| u.name)
        .unwrap_or_else(|| "another user".to_string());
    activity_ops::record(
        &tx,
        recipient_id,
        friend.id,
        ActivityKind::ShareAccepted,
        format!("Shared by {}", sender_name),
    )?;

    share.status = ShareStatus::Accepted;
    share.responded_at = Some(Utc::now());
    share_repo::update_status(&tx, &share)?;

    tx.commit()?;
    info!(recipient_id = %recipient_id, share_id = %share_id, friend_id = %friend.id, "share accepted");
    Ok(friend)
}

pub fn decline_share(
    conn: &Connection,
    recipient_id: Id<User>,
    share_id: Id<ContactShare>,
) -> KithResult<ContactShare> {
    let share = require_share(conn, recipient_id, share_id)?;
    if share.recipient_id != recipient_id {
        return Err(KithError::Forbidden("only the recipient can decline a share".into()));
    }
    close(conn, share, ShareStatus::Declined)
}

pub fn cancel_share(
    conn: &Connection,
    sender_id: Id<User>,
    share_id: Id<ContactShare>,
) -> KithResult<ContactShare> {
    let share = require_share(conn, sender_id, share_id)?;
    if share.sender_id != sender_id {
        return Err(KithError::Forbidden("only the sender can cancel a share".into()));
    }
    close(conn, share, ShareStatus::Cancelled)
}

fn close(conn: &Connection, mut share: ContactShare, status: ShareStatus) -> KithResult<ContactShare> {
    require_pending(&share)?;
    share.status = status;
    share.responded_at = Some(Utc::now());
    share_repo::update_status(conn, &share)?;
    Ok(share)
}

/// Shares are visible only to their two parties.
fn require_share(
    conn: &Connection,
    user_id: Id<User>,
    share_id: Id<ContactShare>,
) -> KithResult<ContactShare> {
    share_repo::find_by_id(conn, share_id)?
        .filter(|s| s.sender_id == user_id || s.recipient_id == user_id)
        .ok_or_else(|| KithError::not_found("ContactShare", share_id))
}

fn require_pending(share: &ContactShare) -> KithResult<()> {
    if share.status != ShareStatus::Pending {
        return Err(KithError::InvalidState(format!(
            "share is already {}",
            share.status.to_db_str().to_lowercase()
        )));
    }
    Ok(())
}

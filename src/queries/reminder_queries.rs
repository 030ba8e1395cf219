use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;

use crate::db::{activity_repo, friend_repo};
use crate::error::KithResult;
use crate::model::{Friend, Id, User};
use crate::ops::friend_ops::require_friend;

/// Whether someone is overdue for contact and by how much.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "days", rename_all = "camelCase")]
pub enum OverdueStatus {
    /// Positive if overdue, zero or negative if not yet due.
    DaysOverdue(i64),
    NeverContacted,
}

impl OverdueStatus {
    pub fn is_due(&self) -> bool {
        match self {
            OverdueStatus::NeverContacted => true,
            OverdueStatus::DaysOverdue(days) => *days > 0,
        }
    }

    /// Never-contacted first, then most overdue.
    fn sort_key(&self) -> i64 {
        match self {
            OverdueStatus::NeverContacted => i64::MIN,
            OverdueStatus::DaysOverdue(d) => -d,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderStatus {
    pub friend: Friend,
    pub reminder_days: i32,
    pub days_since_contact: Option<i64>,
    pub overdue: OverdueStatus,
}

/// `None` when the friend has no reminder interval.
pub fn reminder_status(
    conn: &Connection,
    owner_id: Id<User>,
    friend_id: Id<Friend>,
    as_of: DateTime<Utc>,
) -> KithResult<Option<ReminderStatus>> {
    let friend = require_friend(conn, owner_id, friend_id)?;
    status_of(conn, friend, as_of)
}

/// Active friends whose reminder is due.
pub fn due_reminders(conn: &Connection, owner_id: Id<User>, as_of: DateTime<Utc>) -> KithResult<Vec<ReminderStatus>> {
    let mut due: Vec<ReminderStatus> = all_reminders(conn, owner_id, as_of)?
        .into_iter()
        .filter(|s| s.overdue.is_due())
        .collect();
    due.sort_by_key(|s| s.overdue.sort_key());
    Ok(due)
}

/// Every active friend with a reminder interval, due or not.
pub fn all_reminders(conn: &Connection, owner_id: Id<User>, as_of: DateTime<Utc>) -> KithResult<Vec<ReminderStatus>> {
    let mut results = Vec::new();
    for friend in friend_repo::find_active_by_owner(conn, owner_id)? {
        if let Some(status) = status_of(conn, friend, as_of)? {
            results.push(status);
        }
    }
    results.sort_by_key(|s| s.overdue.sort_key());
    Ok(results)
}

fn status_of(conn: &Connection, friend: Friend, as_of: DateTime<Utc>) -> KithResult<Option<ReminderStatus>> {
    let Some(reminder_days) = friend.reminder_days else {
        return Ok(None);
    };
    let days_since = activity_repo::find_last_contact_at(conn, friend.id)?
        .map(|at| (as_of - at).num_days());
    let overdue = match days_since {
        Some(d) => OverdueStatus::DaysOverdue(d - reminder_days as i64),
        None => OverdueStatus::NeverContacted,
    };
    Ok(Some(ReminderStatus {
        friend,
        reminder_days,
        days_since_contact: days_since,
        overdue,
    }))
}

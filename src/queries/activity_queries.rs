use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;

use crate::db::{activity_repo, friend_repo};
use crate::error::{KithError, KithResult};
use crate::model::{Activity, Friend, Id, User};
use crate::ops::friend_ops::require_friend;

/// An activity with the name of the friend it concerns, for timelines.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    #[serde(flatten)]
    pub activity: Activity,
    pub friend_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactGap {
    pub friend: Friend,
    /// `None` when never contacted.
    pub days_since_contact: Option<i64>,
}

pub fn activities_for(conn: &Connection, owner_id: Id<User>, friend_id: Id<Friend>) -> KithResult<Vec<Activity>> {
    require_friend(conn, owner_id, friend_id)?;
    activity_repo::find_by_friend(conn, friend_id)
}

pub fn in_range(
    conn: &Connection,
    owner_id: Id<User>,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> KithResult<Vec<ActivityEntry>> {
    if from > to {
        return Err(KithError::invalid("from", "must not be after `to`"));
    }
    let activities = activity_repo::find_in_range(conn, owner_id, from, to)?;
    with_friend_names(conn, owner_id, activities)
}

pub fn recent(conn: &Connection, owner_id: Id<User>, limit: usize) -> KithResult<Vec<ActivityEntry>> {
    let activities = activity_repo::find_recent(conn, owner_id, limit)?;
    with_friend_names(conn, owner_id, activities)
}

pub fn last_contact_at(
    conn: &Connection,
    owner_id: Id<User>,
    friend_id: Id<Friend>,
) -> KithResult<Option<DateTime<Utc>>> {
    require_friend(conn, owner_id, friend_id)?;
    activity_repo::find_last_contact_at(conn, friend_id)
}

/// Whole days since the last contact-kind activity.
pub fn days_since_contact(
    conn: &Connection,
    owner_id: Id<User>,
    friend_id: Id<Friend>,
    as_of: DateTime<Utc>,
) -> KithResult<Option<i64>> {
    Ok(last_contact_at(conn, owner_id, friend_id)?.map(|at| (as_of - at).num_days()))
}

/// Active friends not contacted in at least `days` days, never-contacted
/// first, then longest gap first.
pub fn not_contacted_in(
    conn: &Connection,
    owner_id: Id<User>,
    days: i64,
    as_of: DateTime<Utc>,
) -> KithResult<Vec<ContactGap>> {
    let mut gaps = Vec::new();
    for friend in friend_repo::find_active_by_owner(conn, owner_id)? {
        let since = activity_repo::find_last_contact_at(conn, friend.id)?
            .map(|at| (as_of - at).num_days());
        if since.map_or(true, |d| d >= days) {
            gaps.push(ContactGap {
                friend,
                days_since_contact: since,
            });
        }
    }

    gaps.sort_by(|a, b| {
        let a_val = a.days_since_contact.unwrap_or(i64::MAX);
        let b_val = b.days_since_contact.unwrap_or(i64::MAX);
        b_val.cmp(&a_val)
    });
    Ok(gaps)
}

fn with_friend_names(
    conn: &Connection,
    owner_id: Id<User>,
    activities: Vec<Activity>,
) -> KithResult<Vec<ActivityEntry>> {
    let names: HashMap<Id<Friend>, String> = friend_repo::find_by_owner(conn, owner_id)?
        .into_iter()
        .map(|f| (f.id, f.name))
        .collect();
    Ok(activities
        .into_iter()
        .map(|activity| ActivityEntry {
            friend_name: activity.friend_id.and_then(|id| names.get(&id).cloned()),
            activity,
        })
        .collect())
}

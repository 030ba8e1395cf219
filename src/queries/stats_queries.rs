use chrono::{DateTime, Duration, Utc};
use rusqlite::Connection;
use serde::Serialize;

use crate::db::{activity_repo, category_repo, friend_repo, relationship_repo, share_repo};
use crate::error::KithResult;
use crate::model::{Id, RelationshipLevel, User};
use crate::queries::{friend_queries, reminder_queries};

const BIRTHDAY_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelCount {
    pub level: RelationshipLevel,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LongestGap {
    pub name: String,
    pub days: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStats {
    pub total_friends: usize,
    pub active_friends: usize,
    pub archived_friends: usize,
    /// Active friends per level, every level listed.
    pub by_level: Vec<LevelCount>,
    pub categories: usize,
    pub relationships: usize,
    pub total_activities: i64,
    pub activities_last_7_days: i64,
    pub activities_last_30_days: i64,
    pub reminders_due: usize,
    /// Active friends with no contact-kind activity.
    pub never_contacted: usize,
    pub longest_gap: Option<LongestGap>,
    pub upcoming_birthdays: usize,
    pub pending_shares: i64,
}

pub fn stats(conn: &Connection, owner_id: Id<User>, as_of: DateTime<Utc>) -> KithResult<NetworkStats> {
    let all_friends = friend_repo::find_by_owner(conn, owner_id)?;
    let active: Vec<_> = all_friends.iter().filter(|f| !f.archived).collect();

    let by_level = RelationshipLevel::ALL
        .iter()
        .map(|level| LevelCount {
            level: *level,
            count: active.iter().filter(|f| f.level == *level).count(),
        })
        .collect();

    let mut never_contacted = 0usize;
    let mut longest_gap: Option<LongestGap> = None;
    for friend in &active {
        match activity_repo::find_last_contact_at(conn, friend.id)? {
            None => never_contacted += 1,
            Some(at) => {
                let days = (as_of - at).num_days();
                if days > 0 && longest_gap.as_ref().map_or(true, |g| days > g.days) {
                    longest_gap = Some(LongestGap {
                        name: friend.name.clone(),
                        days,
                    });
                }
            }
        }
    }

    Ok(NetworkStats {
        total_friends: all_friends.len(),
        active_friends: active.len(),
        archived_friends: all_friends.len() - active.len(),
        by_level,
        categories: category_repo::find_active(conn, owner_id)?.len(),
        relationships: relationship_repo::find_by_owner(conn, owner_id)?.len(),
        total_activities: activity_repo::count_by_owner(conn, owner_id)?,
        activities_last_7_days: activity_repo::count_since(conn, owner_id, as_of - Duration::days(7))?,
        activities_last_30_days: activity_repo::count_since(conn, owner_id, as_of - Duration::days(30))?,
        reminders_due: reminder_queries::due_reminders(conn, owner_id, as_of)?.len(),
        never_contacted,
        longest_gap,
        upcoming_birthdays: friend_queries::upcoming_birthdays(
            conn,
            owner_id,
            BIRTHDAY_WINDOW_DAYS,
            as_of.date_naive(),
        )?
        .len(),
        pending_shares: share_repo::count_pending_incoming(conn, owner_id)?,
    })
}

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::db::{activity_repo, category_repo, contact_repo, friend_repo};
use crate::error::KithResult;
use crate::model::{Activity, Category, ContactEntry, Friend, Id, RelationshipLevel, User};
use crate::ops::friend_ops::require_friend;
use crate::queries::relationship_queries::{self, RelatedFriend};

const DETAIL_ACTIVITY_LIMIT: usize = 20;

/// List filters; every field is optional. Archived friends are hidden
/// unless `archived` is `true`, in which case only they are returned.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendFilter {
    pub q: Option<String>,
    pub level: Option<RelationshipLevel>,
    pub category: Option<Id<Category>>,
    pub archived: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendDetail {
    pub friend: Friend,
    pub contacts: Vec<ContactEntry>,
    pub categories: Vec<Category>,
    pub relationships: Vec<RelatedFriend>,
    pub recent_activities: Vec<Activity>,
    pub last_contact_at: Option<DateTime<Utc>>,
    pub days_since_contact: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingBirthday {
    pub friend_id: Id<Friend>,
    pub name: String,
    pub birthday: NaiveDate,
    pub next_date: NaiveDate,
    pub days_until: i64,
    pub turning: i32,
}

pub fn list_friends(conn: &Connection, owner_id: Id<User>, filter: &FriendFilter) -> KithResult<Vec<Friend>> {
    let mut friends = if filter.archived.unwrap_or(false) {
        friend_repo::find_archived_by_owner(conn, owner_id)?
    } else {
        friend_repo::find_active_by_owner(conn, owner_id)?
    };

    if let Some(q) = filter.q.as_deref() {
        friends.retain(|f| f.matches(q));
    }
    if let Some(level) = filter.level {
        friends.retain(|f| f.level == level);
    }
    if let Some(category_id) = filter.category {
        let members = category_repo::find_friend_ids(conn, category_id)?;
        friends.retain(|f| members.contains(&f.id));
    }
    Ok(friends)
}

pub fn friend_detail(
    conn: &Connection,
    owner_id: Id<User>,
    friend_id: Id<Friend>,
    as_of: DateTime<Utc>,
) -> KithResult<FriendDetail> {
    let friend = require_friend(conn, owner_id, friend_id)?;
    let mut recent_activities = activity_repo::find_by_friend(conn, friend_id)?;
    recent_activities.truncate(DETAIL_ACTIVITY_LIMIT);
    let last_contact_at = activity_repo::find_last_contact_at(conn, friend_id)?;

    Ok(FriendDetail {
        contacts: contact_repo::find_by_friend(conn, friend_id)?,
        categories: category_repo::find_for_friend(conn, friend_id)?,
        relationships: relationship_queries::relationships_for(conn, owner_id, friend_id)?,
        recent_activities,
        last_contact_at,
        days_since_contact: last_contact_at.map(|at| (as_of - at).num_days()),
        friend,
    })
}

/// Active friends with an interest matching `interest` case-insensitively.
pub fn friends_with_interest(conn: &Connection, owner_id: Id<User>, interest: &str) -> KithResult<Vec<Friend>> {
    let needle = interest.trim().to_lowercase();
    Ok(friend_repo::find_active_by_owner(conn, owner_id)?
        .into_iter()
        .filter(|f| f.interests.iter().any(|i| i.to_lowercase() == needle))
        .collect())
}

/// Birthdays of active friends falling within `days` of `as_of` (inclusive),
/// soonest first. Feb 29 birthdays fall on Feb 28 in common years.
pub fn upcoming_birthdays(
    conn: &Connection,
    owner_id: Id<User>,
    days: i64,
    as_of: NaiveDate,
) -> KithResult<Vec<UpcomingBirthday>> {
    let mut upcoming: Vec<UpcomingBirthday> = friend_repo::find_active_by_owner(conn, owner_id)?
        .into_iter()
        .filter_map(|friend| {
            let birthday = friend.birthday?;
            let next_date = next_occurrence(birthday, as_of)?;
            let days_until = (next_date - as_of).num_days();
            (days_until <= days).then(|| UpcomingBirthday {
                friend_id: friend.id,
                name: friend.name,
                birthday,
                next_date,
                days_until,
                turning: next_date.year() - birthday.year(),
            })
        })
        .collect();
    upcoming.sort_by(|a, b| a.days_until.cmp(&b.days_until).then_with(|| a.name.cmp(&b.name)));
    Ok(upcoming)
}

/// The first anniversary of `birthday` on or after `as_of`.
pub fn next_occurrence(birthday: NaiveDate, as_of: NaiveDate) -> Option<NaiveDate> {
    let in_year = |year: i32| {
        NaiveDate::from_ymd_opt(year, birthday.month(), birthday.day())
            .or_else(|| NaiveDate::from_ymd_opt(year, birthday.month(), birthday.day() - 1))
    };
    let this_year = in_year(as_of.year())?;
    if this_year >= as_of {
        Some(this_year)
    } else {
        in_year(as_of.year() + 1)
    }
}

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Deserialize;

use crate::db::activity_repo;
use crate::error::{KithError, KithResult};
use crate::model::{Activity, ActivityKind, Friend, Id, User};
use crate::ops::friend_ops::require_friend;
use crate::validation::{self, trim_optional};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActivity {
    pub friend_id: Option<Id<Friend>>,
    pub kind: ActivityKind,
    pub description: String,
    pub location: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    /// Defaults to now.
    pub occurred_at: Option<DateTime<Utc>>,
}

/// Logs a user-entered activity. Contact kinds must name a friend; system
/// kinds are reserved for entries the service writes itself.
pub fn log_activity(
    conn: &Connection,
    owner_id: Id<User>,
    input: NewActivity,
    now: DateTime<Utc>,
) -> KithResult<Activity> {
    match input.kind {
        ActivityKind::FriendAdded | ActivityKind::ContactImported | ActivityKind::ShareAccepted => {
            return Err(KithError::invalid("kind", "is recorded automatically"));
        }
        kind if kind.is_contact() && input.friend_id.is_none() => {
            return Err(KithError::invalid("friendId", "is required for this kind"));
        }
        _ => {}
    }
    if let Some(friend_id) = input.friend_id {
        require_friend(conn, owner_id, friend_id)?;
    }

    let occurred_at = input.occurred_at.unwrap_or(now);
    if occurred_at > now {
        return Err(KithError::invalid("occurredAt", "cannot be in the future"));
    }

    let mut activity = Activity::create(
        input.friend_id,
        input.kind,
        validation::non_blank(&input.description, "description")?,
        occurred_at,
    );
    activity.location = trim_optional(input.location.as_deref());
    activity.topics = input
        .topics
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    activity_repo::insert(conn, owner_id, &activity)?;
    Ok(activity)
}

pub fn delete_activity(conn: &Connection, owner_id: Id<User>, activity_id: Id<Activity>) -> KithResult<()> {
    activity_repo::find_owned(conn, owner_id, activity_id)?
        .ok_or_else(|| KithError::not_found("Activity", activity_id))?;
    activity_repo::delete(conn, activity_id)
}

/// Writes a service-generated entry such as `ShareAccepted`.
pub(crate) fn record(
    conn: &Connection,
    owner_id: Id<User>,
    friend_id: Id<Friend>,
    kind: ActivityKind,
    description: String,
) -> KithResult<Activity> {
    let activity = Activity::create(Some(friend_id), kind, description, Utc::now());
    activity_repo::insert(conn, owner_id, &activity)?;
    Ok(activity)
}

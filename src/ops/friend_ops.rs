use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Deserializer};
use tracing::info;

use crate::db::{activity_repo, category_repo, friend_repo};
use crate::error::{KithError, KithResult};
use crate::model::{Activity, ActivityKind, Category, Friend, Id, RelationshipLevel, User};
use crate::ops::category_ops;
use crate::validation::{self, trim_optional};

/// Fields accepted when adding a friend.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFriend {
    pub name: String,
    pub nickname: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub how_we_met: Option<String>,
    pub notes: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    pub level: Option<RelationshipLevel>,
    pub photo_url: Option<String>,
    pub instagram: Option<String>,
    pub reminder_days: Option<i32>,
    #[serde(default)]
    pub category_ids: Vec<Id<Category>>,
}

impl NewFriend {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

/// Partial update. The outer `Option` means "leave unchanged"; an inner
/// `None` (JSON `null`) clears the field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub nickname: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub birthday: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub how_we_met: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub location: Option<Option<String>>,
    pub interests: Option<Vec<String>>,
    pub level: Option<RelationshipLevel>,
    #[serde(default, deserialize_with = "double_option")]
    pub photo_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub instagram: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub reminder_days: Option<Option<i32>>,
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub fn add_friend(conn: &Connection, owner_id: Id<User>, input: NewFriend) -> KithResult<Friend> {
    let friend = insert_friend(conn, owner_id, input)?;

    let added = Activity::create(
        Some(friend.id),
        ActivityKind::FriendAdded,
        format!("Added {}", friend.name),
        friend.created_at,
    );
    activity_repo::insert(conn, owner_id, &added)?;

    info!(owner_id = %owner_id, friend_id = %friend.id, "friend added");
    Ok(friend)
}

/// Validates and stores a friend with its categories, without logging an activity.
pub(crate) fn insert_friend(conn: &Connection, owner_id: Id<User>, input: NewFriend) -> KithResult<Friend> {
    let mut friend = Friend::create(validation::non_blank(&input.name, "name")?);
    friend.nickname = trim_optional(input.nickname.as_deref());
    friend.birthday = input.birthday;
    friend.how_we_met = trim_optional(input.how_we_met.as_deref());
    friend.notes = trim_optional(input.notes.as_deref());
    friend.location = trim_optional(input.location.as_deref());
    friend.interests = validation::normalize_interests(&input.interests);
    friend.level = input.level.unwrap_or_default();
    friend.photo_url = optional_image_url(input.photo_url.as_deref())?;
    friend.instagram = optional_instagram(input.instagram.as_deref())?;
    friend.reminder_days = validation::optional_positive(input.reminder_days, "reminderDays")?;

    let categories = category_ops::require_categories(conn, owner_id, &input.category_ids)?;

    friend_repo::insert(conn, owner_id, &friend)?;
    category_repo::set_for_friend(conn, friend.id, &categories)?;
    Ok(friend)
}

pub fn update_friend(
    conn: &Connection,
    owner_id: Id<User>,
    friend_id: Id<Friend>,
    patch: FriendPatch,
) -> KithResult<Friend> {
    let mut friend = require_friend(conn, owner_id, friend_id)?;

    if let Some(name) = patch.name {
        friend.name = validation::non_blank(&name, "name")?;
    }
    if let Some(nickname) = patch.nickname {
        friend.nickname = trim_optional(nickname.as_deref());
    }
    if let Some(birthday) = patch.birthday {
        friend.birthday = birthday;
    }
    if let Some(how_we_met) = patch.how_we_met {
        friend.how_we_met = trim_optional(how_we_met.as_deref());
    }
    if let Some(notes) = patch.notes {
        friend.notes = trim_optional(notes.as_deref());
    }
    if let Some(location) = patch.location {
        friend.location = trim_optional(location.as_deref());
    }
    if let Some(interests) = patch.interests {
        friend.interests = validation::normalize_interests(&interests);
    }
    if let Some(level) = patch.level {
        friend.level = level;
    }
    if let Some(photo_url) = patch.photo_url {
        friend.photo_url = optional_image_url(photo_url.as_deref())?;
    }
    if let Some(instagram) = patch.instagram {
        friend.instagram = optional_instagram(instagram.as_deref())?;
    }
    if let Some(days) = patch.reminder_days {
        friend.reminder_days = validation::optional_positive(days, "reminderDays")?;
    }

    friend.updated_at = Utc::now();
    friend_repo::update(conn, &friend)?;
    Ok(friend)
}

pub fn set_reminder(
    conn: &Connection,
    owner_id: Id<User>,
    friend_id: Id<Friend>,
    days: Option<i32>,
) -> KithResult<Friend> {
    update_friend(
        conn,
        owner_id,
        friend_id,
        FriendPatch {
            reminder_days: Some(days),
            ..FriendPatch::default()
        },
    )
}

pub fn archive_friend(conn: &Connection, owner_id: Id<User>, friend_id: Id<Friend>) -> KithResult<Friend> {
    set_archived(conn, owner_id, friend_id, true)
}

pub fn unarchive_friend(conn: &Connection, owner_id: Id<User>, friend_id: Id<Friend>) -> KithResult<Friend> {
    set_archived(conn, owner_id, friend_id, false)
}

pub fn delete_friend(conn: &Connection, owner_id: Id<User>, friend_id: Id<Friend>) -> KithResult<()> {
    require_friend(conn, owner_id, friend_id)?;
    friend_repo::delete(conn, friend_id)?;
    info!(owner_id = %owner_id, friend_id = %friend_id, "friend deleted");
    Ok(())
}

/// Loads a friend, treating other users' friends as missing.
pub fn require_friend(conn: &Connection, owner_id: Id<User>, friend_id: Id<Friend>) -> KithResult<Friend> {
    friend_repo::find_owned(conn, owner_id, friend_id)?
        .ok_or_else(|| KithError::not_found("Friend", friend_id))
}

fn set_archived(
    conn: &Connection,
    owner_id: Id<User>,
    friend_id: Id<Friend>,
    archived: bool,
) -> KithResult<Friend> {
    let mut friend = require_friend(conn, owner_id, friend_id)?;
    friend.archived = archived;
    friend.updated_at = Utc::now();
    friend_repo::update(conn, &friend)?;
    Ok(friend)
}

fn optional_image_url(value: Option<&str>) -> KithResult<Option<String>> {
    trim_optional(value)
        .map(|url| validation::image_url(&url, "photoUrl"))
        .transpose()
}

fn optional_instagram(value: Option<&str>) -> KithResult<Option<String>> {
    trim_optional(value)
        .map(|handle| validation::instagram_handle(&handle, "instagram"))
        .transpose()
}

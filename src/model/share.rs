use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::friend::{ContactEntry, Friend};
use super::ids::Id;
use super::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShareStatus {
    Pending,
    Accepted,
    Declined,
    Cancelled,
}

impl ShareStatus {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(ShareStatus::Pending),
            "Accepted" => Some(ShareStatus::Accepted),
            "Declined" => Some(ShareStatus::Declined),
            "Cancelled" => Some(ShareStatus::Cancelled),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            ShareStatus::Pending => "Pending",
            ShareStatus::Accepted => "Accepted",
            ShareStatus::Declined => "Declined",
            ShareStatus::Cancelled => "Cancelled",
        }
    }
}

/// The portion of a friend record that travels with a share. Private fields
/// (notes, how we met, level, reminders) stay with the sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedCard {
    pub name: String,
    pub nickname: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub location: Option<String>,
    pub interests: Vec<String>,
    pub instagram: Option<String>,
    pub photo_url: Option<String>,
    pub contacts: Vec<ContactEntry>,
}

impl SharedCard {
    pub fn snapshot(friend: &Friend, contacts: Vec<ContactEntry>) -> Self {
        Self {
            name: friend.name.clone(),
            nickname: friend.nickname.clone(),
            birthday: friend.birthday,
            location: friend.location.clone(),
            interests: friend.interests.clone(),
            instagram: friend.instagram.clone(),
            photo_url: friend.photo_url.clone(),
            contacts,
        }
    }
}

/// A friend card offered by one user to another.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactShare {
    pub id: Id<ContactShare>,
    pub sender_id: Id<User>,
    pub recipient_id: Id<User>,
    pub card: SharedCard,
    pub message: Option<String>,
    pub status: ShareStatus,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl ContactShare {
    pub fn create(
        sender_id: Id<User>,
        recipient_id: Id<User>,
        card: SharedCard,
        message: Option<String>,
    ) -> Self {
        Self {
            id: Id::generate(),
            sender_id,
            recipient_id,
            card,
            message,
            status: ShareStatus::Pending,
            created_at: Utc::now(),
            responded_at: None,
        }
    }
}

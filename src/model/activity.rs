use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::friend::Friend;
use super::ids::Id;

/// What kind of event an activity records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityKind {
    InPerson,
    Text,
    PhoneCall,
    VideoCall,
    SocialMedia,
    Note,
    FriendAdded,
    ContactImported,
    ShareAccepted,
}

impl ActivityKind {
    pub const ALL: &'static [ActivityKind] = &[
        ActivityKind::InPerson,
        ActivityKind::Text,
        ActivityKind::PhoneCall,
        ActivityKind::VideoCall,
        ActivityKind::SocialMedia,
        ActivityKind::Note,
        ActivityKind::FriendAdded,
        ActivityKind::ContactImported,
        ActivityKind::ShareAccepted,
    ];

    /// Kinds that count as actually being in touch with someone.
    pub const CONTACT: &'static [ActivityKind] = &[
        ActivityKind::InPerson,
        ActivityKind::Text,
        ActivityKind::PhoneCall,
        ActivityKind::VideoCall,
        ActivityKind::SocialMedia,
    ];

    pub fn is_contact(&self) -> bool {
        Self::CONTACT.contains(self)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ActivityKind::InPerson => "In Person",
            ActivityKind::Text => "Text",
            ActivityKind::PhoneCall => "Phone Call",
            ActivityKind::VideoCall => "Video Call",
            ActivityKind::SocialMedia => "Social Media",
            ActivityKind::Note => "Note",
            ActivityKind::FriendAdded => "Friend Added",
            ActivityKind::ContactImported => "Contact Imported",
            ActivityKind::ShareAccepted => "Share Accepted",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.to_db_str() == s)
    }

    /// Convert to database string representation.
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ActivityKind::InPerson => "InPerson",
            ActivityKind::Text => "Text",
            ActivityKind::PhoneCall => "PhoneCall",
            ActivityKind::VideoCall => "VideoCall",
            ActivityKind::SocialMedia => "SocialMedia",
            ActivityKind::Note => "Note",
            ActivityKind::FriendAdded => "FriendAdded",
            ActivityKind::ContactImported => "ContactImported",
            ActivityKind::ShareAccepted => "ShareAccepted",
        }
    }
}

/// A timestamped entry in a user's activity log, optionally about one friend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: Id<Activity>,
    pub friend_id: Option<Id<Friend>>,
    pub kind: ActivityKind,
    pub description: String,
    pub location: Option<String>,
    pub topics: Vec<String>,
    pub occurred_at: DateTime<Utc>,
}

impl Activity {
    pub fn create(
        friend_id: Option<Id<Friend>>,
        kind: ActivityKind,
        description: String,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Id::generate(),
            friend_id,
            kind,
            description,
            location: None,
            topics: Vec::new(),
            occurred_at,
        }
    }
}

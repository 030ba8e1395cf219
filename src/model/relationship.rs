use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::friend::Friend;
use super::ids::Id;

/// How one friend relates to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationshipKind {
    /// `from` was introduced to you by `to`.
    IntroducedBy,
    Partner,
    Family,
    Colleague,
    Friend,
    Other,
}

impl RelationshipKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            RelationshipKind::IntroducedBy => "Introduced by",
            RelationshipKind::Partner => "Partner",
            RelationshipKind::Family => "Family",
            RelationshipKind::Colleague => "Colleague",
            RelationshipKind::Friend => "Friend",
            RelationshipKind::Other => "Other",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "IntroducedBy" => Some(RelationshipKind::IntroducedBy),
            "Partner" => Some(RelationshipKind::Partner),
            "Family" => Some(RelationshipKind::Family),
            "Colleague" => Some(RelationshipKind::Colleague),
            "Friend" => Some(RelationshipKind::Friend),
            "Other" => Some(RelationshipKind::Other),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            RelationshipKind::IntroducedBy => "IntroducedBy",
            RelationshipKind::Partner => "Partner",
            RelationshipKind::Family => "Family",
            RelationshipKind::Colleague => "Colleague",
            RelationshipKind::Friend => "Friend",
            RelationshipKind::Other => "Other",
        }
    }
}

/// A directed edge between two friends of the same user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub id: Id<Relationship>,
    pub from_friend_id: Id<Friend>,
    pub to_friend_id: Id<Friend>,
    pub kind: RelationshipKind,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Relationship {
    pub fn create(
        from_friend_id: Id<Friend>,
        to_friend_id: Id<Friend>,
        kind: RelationshipKind,
        note: Option<String>,
    ) -> Self {
        Self {
            id: Id::generate(),
            from_friend_id,
            to_friend_id,
            kind,
            note,
            created_at: Utc::now(),
        }
    }

    /// The friend on the other end, seen from `friend_id`.
    pub fn other_end(&self, friend_id: Id<Friend>) -> Id<Friend> {
        if self.from_friend_id == friend_id {
            self.to_friend_id
        } else {
            self.from_friend_id
        }
    }
}

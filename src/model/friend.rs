use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ids::Id;

/// How close you are to a friend, from least to most close.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum RelationshipLevel {
    Acquaintance,
    Casual,
    #[default]
    Friend,
    CloseFriend,
    BestFriend,
    Family,
}

impl RelationshipLevel {
    pub const ALL: &'static [RelationshipLevel] = &[
        RelationshipLevel::Acquaintance,
        RelationshipLevel::Casual,
        RelationshipLevel::Friend,
        RelationshipLevel::CloseFriend,
        RelationshipLevel::BestFriend,
        RelationshipLevel::Family,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            RelationshipLevel::Acquaintance => "Acquaintance",
            RelationshipLevel::Casual => "Casual",
            RelationshipLevel::Friend => "Friend",
            RelationshipLevel::CloseFriend => "Close Friend",
            RelationshipLevel::BestFriend => "Best Friend",
            RelationshipLevel::Family => "Family",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "Acquaintance" => Some(RelationshipLevel::Acquaintance),
            "Casual" => Some(RelationshipLevel::Casual),
            "Friend" => Some(RelationshipLevel::Friend),
            "CloseFriend" => Some(RelationshipLevel::CloseFriend),
            "BestFriend" => Some(RelationshipLevel::BestFriend),
            "Family" => Some(RelationshipLevel::Family),
            _ => None,
        }
    }

    /// Convert to database string representation.
    pub fn to_db_str(&self) -> &'static str {
        match self {
            RelationshipLevel::Acquaintance => "Acquaintance",
            RelationshipLevel::Casual => "Casual",
            RelationshipLevel::Friend => "Friend",
            RelationshipLevel::CloseFriend => "CloseFriend",
            RelationshipLevel::BestFriend => "BestFriend",
            RelationshipLevel::Family => "Family",
        }
    }
}

/// A structured physical address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

impl Address {
    /// Single-line rendering that skips empty components.
    pub fn one_line(&self) -> String {
        [&self.street, &self.city, &self.state, &self.zip, &self.country]
            .iter()
            .filter(|part| !part.is_empty())
            .map(|part| part.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// The type of contact information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactType {
    Phone,
    Email,
    PhysicalAddress,
    Website,
}

impl ContactType {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "Phone" => Some(ContactType::Phone),
            "Email" => Some(ContactType::Email),
            "PhysicalAddress" => Some(ContactType::PhysicalAddress),
            "Website" => Some(ContactType::Website),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            ContactType::Phone => "Phone",
            ContactType::Email => "Email",
            ContactType::PhysicalAddress => "PhysicalAddress",
            ContactType::Website => "Website",
        }
    }
}

/// The value of a contact entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum ContactValue {
    Text(String),
    Address(Address),
}

impl ContactValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContactValue::Text(value) => Some(value),
            ContactValue::Address(_) => None,
        }
    }
}

/// A single contact entry for a friend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactEntry {
    pub id: Id<ContactEntry>,
    pub contact_type: ContactType,
    pub value: ContactValue,
    pub label: Option<String>,
}

impl ContactEntry {
    pub fn phone(number: String, label: Option<String>) -> Self {
        Self::text(ContactType::Phone, number, label)
    }

    pub fn email(address: String, label: Option<String>) -> Self {
        Self::text(ContactType::Email, address, label)
    }

    pub fn website(url: String, label: Option<String>) -> Self {
        Self::text(ContactType::Website, url, label)
    }

    pub fn address(address: Address, label: Option<String>) -> Self {
        Self {
            id: Id::generate(),
            contact_type: ContactType::PhysicalAddress,
            value: ContactValue::Address(address),
            label,
        }
    }

    fn text(contact_type: ContactType, value: String, label: Option<String>) -> Self {
        Self {
            id: Id::generate(),
            contact_type,
            value: ContactValue::Text(value),
            label,
        }
    }
}

/// A person in a user's network.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Friend {
    pub id: Id<Friend>,
    pub name: String,
    pub nickname: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub how_we_met: Option<String>,
    pub notes: Option<String>,
    pub location: Option<String>,
    pub interests: Vec<String>,
    pub level: RelationshipLevel,
    pub photo_url: Option<String>,
    pub instagram: Option<String>,
    pub reminder_days: Option<i32>,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Friend {
    pub fn create(name: String) -> Self {
        let now = Utc::now();
        Self {
            id: Id::generate(),
            name,
            nickname: None,
            birthday: None,
            how_we_met: None,
            notes: None,
            location: None,
            interests: Vec::new(),
            level: RelationshipLevel::default(),
            photo_url: None,
            instagram: None,
            reminder_days: None,
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Case-insensitive match on name, nickname, location or any interest.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let contains = |s: &str| s.to_lowercase().contains(&needle);
        contains(&self.name)
            || self.nickname.as_deref().is_some_and(contains)
            || self.location.as_deref().is_some_and(contains)
            || self.interests.iter().any(|i| contains(i))
    }
}

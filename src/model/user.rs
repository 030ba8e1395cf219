use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::Id;

/// An account holder. Every friend, category and activity is owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Id<User>,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn create(name: String, email: String, password_hash: String) -> Self {
        Self {
            id: Id::generate(),
            name,
            email,
            password_hash,
            bio: None,
            location: None,
            avatar_url: None,
            created_at: Utc::now(),
        }
    }
}

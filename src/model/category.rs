use serde::{Deserialize, Serialize};

use super::ids::Id;

/// A user-defined grouping for friends (e.g., "coworker", "climbing").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Id<Category>,
    pub name: String,
    pub archived: bool,
}

impl Category {
    pub fn create(name: String) -> Self {
        Self {
            id: Id::generate(),
            name,
            archived: false,
        }
    }

    /// Categories every new account starts with.
    pub fn defaults() -> Vec<Category> {
        ["friend", "family", "coworker", "classmate", "neighbor", "mentor"]
            .iter()
            .map(|name| Category::create(name.to_string()))
            .collect()
    }
}

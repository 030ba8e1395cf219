pub mod ids;
pub mod user;
pub mod friend;
pub mod category;
pub mod relationship;
pub mod activity;
pub mod share;

// Re-exports for convenience
pub use ids::Id;
pub use user::User;
pub use friend::{Address, ContactEntry, ContactType, ContactValue, Friend, RelationshipLevel};
pub use category::Category;
pub use relationship::{Relationship, RelationshipKind};
pub use activity::{Activity, ActivityKind};
pub use share::{ContactShare, ShareStatus, SharedCard};
